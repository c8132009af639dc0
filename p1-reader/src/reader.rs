//! The telegram reader worker
//!
//! One task owns the whole pipeline: it pulls bytes from the link, drives
//! the frame assembler, decrypts completed frames and publishes the
//! extracted lines. Frames are processed strictly one at a time; there is
//! no pipelining and the assembler state is confined to this task.

use p1_core::config::DecryptionConfig;
use p1_core::error::{P1Error, P1Result};
use p1_frame::{FeedOutcome, FrameAssembler};
use p1_security::FrameCipher;
use p1_telegram::TelegramExtractor;
use p1_transport::ByteSource;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};

/// Shared buffer holding the lines of the most recent telegram
///
/// The reader clears and refills it per telegram; a consumer that misses a
/// notification simply observes the newest content.
pub type TelegramBuffer = Arc<Mutex<Vec<String>>>;

/// Worker task decoding encrypted P1 telegrams from a byte source
///
/// Collaborators, all passed in explicitly:
/// * the blocking byte source (the link paces delivery, so reads have no
///   timeout),
/// * a stop signal, honored between frames only - an in-progress frame is
///   always completed or discarded first,
/// * the shared telegram buffer plus a trigger fired once per decoded
///   telegram (fire-and-forget, no backpressure).
pub struct TelegramReader<S: ByteSource> {
    source: S,
    assembler: FrameAssembler,
    cipher: FrameCipher,
    extractor: TelegramExtractor,
    telegram: TelegramBuffer,
    trigger: Arc<Notify>,
    stop: watch::Receiver<bool>,
}

impl<S: ByteSource> TelegramReader<S> {
    /// Create a reader over `source` with the given decryption configuration
    pub fn new(
        source: S,
        config: &DecryptionConfig,
        extractor: TelegramExtractor,
        telegram: TelegramBuffer,
        trigger: Arc<Notify>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            assembler: FrameAssembler::new(),
            cipher: FrameCipher::new(config),
            extractor,
            telegram,
            trigger,
            stop,
        }
    }

    /// Run the read loop until EOF, a stop request, or a fatal error
    ///
    /// Malformed frames are logged and skipped, as are assembled frames
    /// whose system title cannot form a valid IV. A source read failure or
    /// a GCM authentication failure terminates the loop with an error; the
    /// supervising layer decides whether to restart the reader. Unverified
    /// plaintext is never published.
    pub async fn run(mut self) -> P1Result<()> {
        loop {
            if *self.stop.borrow() && self.assembler.is_idle() {
                log::debug!("Stop requested, reader exiting between frames");
                return Ok(());
            }

            let Some(byte) = self.source.read_byte().await? else {
                log::debug!("Byte source exhausted, reader exiting");
                return Ok(());
            };

            match self.assembler.feed(byte) {
                FeedOutcome::Continue => {}
                FeedOutcome::FrameDiscarded(reason) => {
                    // Already logged by the assembler; local and non-fatal.
                    log::debug!("Resuming scan after discard: {}", reason.as_str());
                }
                FeedOutcome::FrameReady(frame) => {
                    let plaintext = match self.cipher.decrypt(&frame) {
                        Ok(plaintext) => plaintext,
                        Err(P1Error::Security(reason)) => {
                            // A garbled stream can assemble a wire-valid
                            // frame whose title cannot form the 12-byte IV.
                            // Skip it like any other malformed frame.
                            log::warn!("Skipping undecryptable frame: {}", reason);
                            continue;
                        }
                        Err(e) => return Err(e),
                    };
                    let lines = self.extractor.extract(&plaintext);
                    log::debug!("Decoded telegram with {} lines", lines.len());

                    let mut telegram = self.telegram.lock().await;
                    telegram.clear();
                    telegram.extend(lines);
                    drop(telegram);

                    self.trigger.notify_one();
                }
            }
        }
    }
}
