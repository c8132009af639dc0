//! Plaintext telegram line extraction
//!
//! Turns a decrypted telegram into its ordered text lines and, when
//! enabled, appends synthesized tariff totals:
//!
//! ```text
//! 1-0:1.8.1 + 1-0:1.8.2 -> 1-0:1.8.3   (energy consumed)
//! 1-0:2.8.1 + 1-0:2.8.2 -> 1-0:2.8.3   (energy returned)
//! ```

use once_cell::sync::Lazy;
use p1_core::ObisCode;
use regex::Regex;

/// Energy register lines in the DSMR fixed decimal form, e.g.
/// `1-0:1.8.1(016230.132*kWh)`. Group 1 is the direction (1 consumed,
/// 2 returned), group 2 the tariff, group 3 the value.
static ENERGY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^1-0:([12])\.8\.([123])\((\d{6}\.\d{3})\*kWh\)$")
        .expect("energy line pattern is valid")
});

/// Splits decrypted telegram plaintext into lines
///
/// Decoding is best effort: byte sequences that are not valid UTF-8 are
/// replaced, never treated as an error. The extractor performs no I/O;
/// the caller hands the returned lines to its sink.
#[derive(Debug, Clone, Default)]
pub struct TelegramExtractor {
    aggregate_totals: bool,
}

impl TelegramExtractor {
    /// Create an extractor; aggregation is off by default
    pub fn new(aggregate_totals: bool) -> Self {
        Self { aggregate_totals }
    }

    /// Extract the ordered line sequence from decrypted plaintext
    pub fn extract(&self, plaintext: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(plaintext);
        let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();

        if self.aggregate_totals {
            Self::append_totals(&mut lines);
        }
        lines
    }

    /// Append the synthesized `1-0:1.8.3` / `1-0:2.8.3` total lines
    ///
    /// Idempotent: a telegram that already carries a total line for a
    /// direction keeps it, and no second total is appended for it.
    fn append_totals(lines: &mut Vec<String>) {
        let mut consumed = 0.0f64;
        let mut returned = 0.0f64;
        let mut has_consumed_total = false;
        let mut has_returned_total = false;

        for line in lines.iter() {
            let Some(captures) = ENERGY_LINE.captures(line) else {
                continue;
            };
            let direction = &captures[1];
            let tariff = &captures[2];
            if tariff == "3" {
                match direction {
                    "1" => has_consumed_total = true,
                    _ => has_returned_total = true,
                }
                continue;
            }
            // The pattern guarantees a parseable fixed-point value.
            let value: f64 = captures[3].parse().unwrap_or(0.0);
            match direction {
                "1" => consumed += value,
                _ => returned += value,
            }
        }

        if !has_consumed_total {
            lines.push(Self::total_line(ObisCode::new(1, 0, 1, 8, 3), consumed));
        }
        if !has_returned_total {
            lines.push(Self::total_line(ObisCode::new(1, 0, 2, 8, 3), returned));
        }
    }

    fn total_line(code: ObisCode, value: f64) -> String {
        format!("{}({:010.3}*kWh)", code, value)
    }
}
