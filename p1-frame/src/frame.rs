//! Raw frame structure and wire constants

use bytes::Bytes;
use p1_core::error::{P1Error, P1Result};

/// Start marker opening every frame
pub const START_BYTE: u8 = 0xDB;

/// Fixed separator expected immediately after the system title
pub const TITLE_SEPARATOR: u8 = 0x82;

/// Length of the frame counter field
pub const FRAME_COUNTER_LENGTH: usize = 4;

/// Length of the GCM authentication tag carried by P1 frames
pub const GCM_TAG_LENGTH: usize = 12;

/// Bytes the declared data length covers besides the ciphertext:
/// 1 separator + 4 frame counter + 12 tag
pub const DATA_LENGTH_OVERHEAD: usize = 1 + FRAME_COUNTER_LENGTH + GCM_TAG_LENGTH;

/// A fully assembled, still-encrypted P1 frame
///
/// Wire layout:
///
/// ```text
/// 0xDB                      start marker
/// len(1B)                   system-title length N
/// title(N bytes)
/// 0x82                      fixed separator
/// dataLength(2B, big-endian)
/// sep(1B)                   unvalidated
/// frameCounter(4B)
/// ciphertext(dataLength-17 bytes)
/// tag(12B)                  GCM authentication tag
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub system_title: Bytes,
    pub frame_counter: [u8; FRAME_COUNTER_LENGTH],
    pub ciphertext: Bytes,
    pub tag: [u8; GCM_TAG_LENGTH],
}

impl RawFrame {
    /// Build the 12-byte GCM initialization vector: system title ‖ frame counter
    ///
    /// The counter acts as the nonce component; the title identifies the
    /// device. Together they must be exactly 12 bytes or the frame cannot
    /// be decrypted.
    pub fn iv(&self) -> P1Result<[u8; 12]> {
        let total = self.system_title.len() + FRAME_COUNTER_LENGTH;
        if total != 12 {
            return Err(P1Error::Security(format!(
                "Invalid IV length: system title ({} bytes) + frame counter must total 12, got {}",
                self.system_title.len(),
                total
            )));
        }

        let mut iv = [0u8; 12];
        iv[..self.system_title.len()].copy_from_slice(&self.system_title);
        iv[self.system_title.len()..].copy_from_slice(&self.frame_counter);
        Ok(iv)
    }

    /// Declared data length for this frame: separator + counter + ciphertext + tag
    pub fn data_length(&self) -> usize {
        DATA_LENGTH_OVERHEAD + self.ciphertext.len()
    }

    /// Encode the frame into its wire representation
    ///
    /// The inverse of assembly; used by simulators and tests to produce
    /// byte streams a meter would emit.
    pub fn encode(&self) -> P1Result<Vec<u8>> {
        if self.system_title.len() > u8::MAX as usize {
            return Err(P1Error::MalformedFrame(format!(
                "System title too long: {} bytes",
                self.system_title.len()
            )));
        }
        let data_length = self.data_length();
        if data_length > u16::MAX as usize {
            return Err(P1Error::MalformedFrame(format!(
                "Declared data length out of range: {}",
                data_length
            )));
        }

        let mut wire = Vec::with_capacity(3 + self.system_title.len() + 3 + data_length);
        wire.push(START_BYTE);
        wire.push(self.system_title.len() as u8);
        wire.extend_from_slice(&self.system_title);
        wire.push(TITLE_SEPARATOR);
        wire.extend_from_slice(&(data_length as u16).to_be_bytes());
        wire.push(0x30); // separator, not validated by receivers
        wire.extend_from_slice(&self.frame_counter);
        wire.extend_from_slice(&self.ciphertext);
        wire.extend_from_slice(&self.tag);
        Ok(wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> RawFrame {
        RawFrame {
            system_title: Bytes::from_static(&[0x4B, 0x46, 0x4D, 0x10, 0x01, 0x02, 0x03, 0x04]),
            frame_counter: [0x00, 0x00, 0x00, 0x01],
            ciphertext: Bytes::from_static(&[0xAA, 0xBB, 0xCC]),
            tag: [0x10; 12],
        }
    }

    #[test]
    fn test_iv_concatenates_title_and_counter() {
        let frame = sample_frame();
        let iv = frame.iv().unwrap();
        assert_eq!(&iv[..8], &frame.system_title[..]);
        assert_eq!(&iv[8..], &frame.frame_counter);
    }

    #[test]
    fn test_iv_rejects_wrong_title_length() {
        let mut frame = sample_frame();
        frame.system_title = Bytes::from_static(&[0x01, 0x02, 0x03, 0x04]);
        assert!(matches!(frame.iv(), Err(P1Error::Security(_))));
    }

    #[test]
    fn test_encode_rejects_oversized_data_length() {
        let mut frame = sample_frame();
        // One ciphertext byte past what a 2-byte data length can declare.
        let oversized = u16::MAX as usize - DATA_LENGTH_OVERHEAD + 1;
        frame.ciphertext = Bytes::from(vec![0u8; oversized]);
        assert!(matches!(frame.encode(), Err(P1Error::MalformedFrame(_))));

        frame.ciphertext = Bytes::from(vec![0u8; oversized - 1]);
        assert!(frame.encode().is_ok());
    }

    #[test]
    fn test_encode_layout() {
        let frame = sample_frame();
        let wire = frame.encode().unwrap();
        assert_eq!(wire[0], START_BYTE);
        assert_eq!(wire[1], 8);
        assert_eq!(wire[10], TITLE_SEPARATOR);
        // data length = 17 + 3 ciphertext bytes
        assert_eq!(u16::from_be_bytes([wire[11], wire[12]]), 20);
        assert_eq!(wire.len(), 2 + 8 + 1 + 2 + 20);
        assert_eq!(&wire[wire.len() - 12..], &frame.tag);
    }
}
