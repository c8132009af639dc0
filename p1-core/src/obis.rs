use crate::error::{P1Error, P1Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OBIS (Object Identification System) code in the reduced DSMR form
///
/// DSMR telegrams identify every metered quantity with a five-part code
/// in the form `A-B:C.D.E`, e.g. `1-0:1.8.1` for energy consumed under
/// tariff 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObisCode {
    values: [u8; 5],
}

impl ObisCode {
    /// Create a new OBIS code from its five value groups
    pub fn new(a: u8, b: u8, c: u8, d: u8, e: u8) -> Self {
        Self {
            values: [a, b, c, d, e],
        }
    }

    /// Parse an OBIS code from the DSMR string form `A-B:C.D.E`
    ///
    /// # Arguments
    ///
    /// * `s` - String representation, e.g. `"1-0:1.8.1"`
    ///
    /// # Returns
    ///
    /// Returns `Ok(ObisCode)` if parsing succeeds, `Err(P1Error)` otherwise
    pub fn parse(s: &str) -> P1Result<Self> {
        let invalid = || P1Error::InvalidData(format!("Invalid OBIS code format: {}", s));

        let (medium, rest) = s.split_once('-').ok_or_else(invalid)?;
        let (channel, quantity) = rest.split_once(':').ok_or_else(invalid)?;
        let parts: Vec<&str> = quantity.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut values = [0u8; 5];
        for (i, part) in [medium, channel, parts[0], parts[1], parts[2]]
            .iter()
            .enumerate()
        {
            values[i] = part.parse::<u8>().map_err(|_| invalid())?;
        }

        Ok(Self { values })
    }

    /// Get the A value (medium, first group)
    pub fn a(&self) -> u8 {
        self.values[0]
    }

    /// Get the B value (channel)
    pub fn b(&self) -> u8 {
        self.values[1]
    }

    /// Get the C value (physical quantity)
    pub fn c(&self) -> u8 {
        self.values[2]
    }

    /// Get the D value (processing)
    pub fn d(&self) -> u8 {
        self.values[3]
    }

    /// Get the E value (tariff)
    pub fn e(&self) -> u8 {
        self.values[4]
    }
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}.{}.{}",
            self.values[0], self.values[1], self.values[2], self.values[3], self.values[4]
        )
    }
}
