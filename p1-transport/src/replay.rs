//! Capture replay byte source
//!
//! Replays a recorded P1 byte stream from memory or from a capture file.
//! This stands in for the live serial port in simulation runs and tests.

use crate::stream::ByteSource;
use async_trait::async_trait;
use p1_core::error::P1Result;
use std::path::Path;

/// Byte source replaying a recorded stream
#[derive(Debug, Clone)]
pub struct ReplaySource {
    data: Vec<u8>,
    pos: usize,
}

impl ReplaySource {
    /// Create a replay source from an owned byte buffer
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// Load a replay source from a capture file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> P1Result<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(data))
    }

    /// Number of bytes left to replay
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[async_trait]
impl ByteSource for ReplaySource {
    async fn read_byte(&mut self) -> P1Result<Option<u8>> {
        match self.data.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_source_yields_bytes_then_eof() {
        let mut source = ReplaySource::new(vec![0xDB, 0x08, 0xFF]);
        assert_eq!(source.remaining(), 3);
        assert_eq!(source.read_byte().await.unwrap(), Some(0xDB));
        assert_eq!(source.read_byte().await.unwrap(), Some(0x08));
        assert_eq!(source.read_byte().await.unwrap(), Some(0xFF));
        assert_eq!(source.read_byte().await.unwrap(), None);
        assert_eq!(source.read_byte().await.unwrap(), None);
    }
}
