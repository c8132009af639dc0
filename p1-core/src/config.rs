//! Reader and decryption configuration

use crate::error::{P1Error, P1Result};
use serde::{Deserialize, Serialize};

/// Immutable cryptographic configuration for frame decryption
///
/// The key and AAD are supplied by the meter operator out of band; they are
/// passed explicitly into the cipher constructor instead of being read from
/// ambient global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionConfig {
    key: [u8; 16],
    aad: Vec<u8>,
}

impl DecryptionConfig {
    /// Create a new decryption configuration
    pub fn new(key: [u8; 16], aad: Vec<u8>) -> Self {
        Self { key, aad }
    }

    /// Build a decryption configuration from hex strings
    ///
    /// Operator-facing configuration stores the key and the additional
    /// authenticated data as hex, e.g. `"00112233445566778899AABBCCDDEEFF"`.
    pub fn from_hex(key_hex: &str, aad_hex: &str) -> P1Result<Self> {
        let key_bytes = parse_hex(key_hex)?;
        let key: [u8; 16] = key_bytes.as_slice().try_into().map_err(|_| {
            P1Error::Security(format!(
                "Invalid AES-128 key length: expected 16 bytes, got {}",
                key_bytes.len()
            ))
        })?;
        let aad = parse_hex(aad_hex)?;
        Ok(Self { key, aad })
    }

    /// Get the 16-byte AES-128 key
    pub fn key(&self) -> &[u8; 16] {
        &self.key
    }

    /// Get the additional authenticated data
    pub fn aad(&self) -> &[u8] {
        &self.aad
    }
}

/// Top-level reader configuration
///
/// Mirrors what a deployment config file carries: where to read bytes from,
/// how to decrypt them, and whether to synthesize tariff totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Serial port device, e.g. `/dev/ttyUSB0`
    pub port: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// AES-128 decryption key as hex
    pub decrypt_key: String,
    /// Additional authenticated data as hex
    pub decrypt_aad: String,
    /// Append synthesized tariff-total lines to each telegram
    #[serde(default)]
    pub aggregate_totals: bool,
    /// Replay a capture file instead of opening the serial port
    #[serde(default)]
    pub capture_file: Option<String>,
}

impl ReaderConfig {
    /// Build the decryption configuration from the hex-encoded fields
    pub fn decryption(&self) -> P1Result<DecryptionConfig> {
        DecryptionConfig::from_hex(&self.decrypt_key, &self.decrypt_aad)
    }
}

/// Decode a hex string into bytes
pub fn parse_hex(s: &str) -> P1Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(P1Error::InvalidData(format!(
            "Hex string has odd length: {}",
            s.len()
        )));
    }

    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| P1Error::InvalidData(format!("Invalid hex string: {}", s)))
        })
        .collect()
}
