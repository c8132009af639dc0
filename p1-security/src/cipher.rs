//! AES-128-GCM frame encryption and decryption

use aes::Aes128;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{AesGcm, Key, Nonce};
use bytes::Bytes;
use p1_core::config::DecryptionConfig;
use p1_core::error::{P1Error, P1Result};
use p1_frame::{RawFrame, FRAME_COUNTER_LENGTH, GCM_TAG_LENGTH};

/// AES-128-GCM with the 12-byte tag P1 frames carry (the default is 16)
type Aes128Gcm12 = AesGcm<Aes128, U12, U12>;

/// AES-GCM cipher context for P1 frames
///
/// Holds the pre-shared key and the additional authenticated data for one
/// meter. Decryption verifies the authentication tag; a mismatch is a hard
/// failure and no plaintext is released.
pub struct FrameCipher {
    cipher: Aes128Gcm12,
    aad: Vec<u8>,
}

impl FrameCipher {
    /// Create a new cipher context from the meter's decryption configuration
    pub fn new(config: &DecryptionConfig) -> Self {
        let key = Key::<Aes128Gcm12>::from_slice(config.key());
        Self {
            cipher: Aes128Gcm12::new(key),
            aad: config.aad().to_vec(),
        }
    }

    /// Decrypt an assembled frame and verify its authentication tag
    ///
    /// The IV is the frame's system title concatenated with its frame
    /// counter. Tag verification covers the ciphertext and the AAD; any
    /// mismatch returns [`P1Error::AuthenticationFailure`].
    pub fn decrypt(&self, frame: &RawFrame) -> P1Result<Vec<u8>> {
        let iv = frame.iv()?;
        let nonce = Nonce::from_slice(&iv);

        // The aead API expects the tag appended to the ciphertext.
        let mut msg = Vec::with_capacity(frame.ciphertext.len() + GCM_TAG_LENGTH);
        msg.extend_from_slice(&frame.ciphertext);
        msg.extend_from_slice(&frame.tag);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: &msg,
                    aad: &self.aad,
                },
            )
            .map_err(|_| P1Error::AuthenticationFailure)
    }

    /// Encrypt a plaintext telegram into a frame
    ///
    /// The inverse of [`decrypt`](Self::decrypt), used to generate meter
    /// traffic for simulators and tests. The system title plus the 4-byte
    /// frame counter must total 12 bytes.
    pub fn encrypt(
        &self,
        system_title: &[u8],
        frame_counter: [u8; FRAME_COUNTER_LENGTH],
        plaintext: &[u8],
    ) -> P1Result<RawFrame> {
        if system_title.len() + FRAME_COUNTER_LENGTH != 12 {
            return Err(P1Error::Security(format!(
                "Invalid IV length: system title ({} bytes) + frame counter must total 12",
                system_title.len()
            )));
        }

        let mut iv = [0u8; 12];
        iv[..system_title.len()].copy_from_slice(system_title);
        iv[system_title.len()..].copy_from_slice(&frame_counter);
        let nonce = Nonce::from_slice(&iv);

        let mut msg = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: &self.aad,
                },
            )
            .map_err(|e| P1Error::Security(format!("Encryption failed: {}", e)))?;

        let tag_offset = msg.len() - GCM_TAG_LENGTH;
        let mut tag = [0u8; GCM_TAG_LENGTH];
        tag.copy_from_slice(&msg[tag_offset..]);
        msg.truncate(tag_offset);

        Ok(RawFrame {
            system_title: Bytes::copy_from_slice(system_title),
            frame_counter,
            ciphertext: Bytes::from(msg),
            tag,
        })
    }
}
