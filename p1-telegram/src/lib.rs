//! Telegram line extraction for decrypted P1 plaintext

pub mod extractor;

pub use extractor::TelegramExtractor;
