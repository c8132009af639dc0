//! Byte source trait for the P1 link

use async_trait::async_trait;
use p1_core::error::P1Result;

/// Byte source interface over the physical or simulated P1 link
///
/// The P1 link paces delivery itself, so reads block without a timeout; the
/// reader task pulls one byte at a time and drives the frame assembler with
/// it.
#[async_trait]
pub trait ByteSource: Send {
    /// Read the next byte from the link
    ///
    /// # Returns
    ///
    /// * `Ok(Some(byte))` - the next byte
    /// * `Ok(None)` - the source is exhausted (EOF)
    /// * `Err(_)` - the link failed; fatal to the reader task
    async fn read_byte(&mut self) -> P1Result<Option<u8>>;
}
