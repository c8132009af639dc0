//! Reader task for encrypted P1 telegrams
//!
//! Wires the byte source, frame assembler, frame cipher and line extractor
//! into the single worker that a supervising layer runs and restarts.

pub mod reader;

pub use reader::{TelegramBuffer, TelegramReader};
