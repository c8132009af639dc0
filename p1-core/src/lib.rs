//! Core types and utilities for the P1 telegram reader
//!
//! This crate provides fundamental types, error handling, and configuration
//! used throughout the P1 reader implementation.

pub mod config;
pub mod error;
pub mod obis;

pub use config::{DecryptionConfig, ReaderConfig};
pub use error::{P1Error, P1Result};
pub use obis::ObisCode;
