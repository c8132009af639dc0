//! Per-byte frame assembler
//!
//! Reconstructs encrypted P1 frames from a byte stream. Field boundaries
//! depend on earlier fields (the title length byte and the 2-byte data
//! length), so the assembler tracks a remaining-byte countdown for the
//! field currently being accumulated instead of absolute stream offsets.

use crate::frame::{
    RawFrame, DATA_LENGTH_OVERHEAD, FRAME_COUNTER_LENGTH, GCM_TAG_LENGTH, START_BYTE,
    TITLE_SEPARATOR,
};
use crate::state::AssemblerState;
use bytes::{BufMut, BytesMut};

/// Why an in-progress frame was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The byte after the system title was not 0x82
    BadTitleSeparator,
    /// The declared data length cannot cover separator + counter + tag
    DataLengthTooShort,
}

impl DiscardReason {
    /// Get human-readable reason
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscardReason::BadTitleSeparator => "bad title separator",
            DiscardReason::DataLengthTooShort => "declared data length too short",
        }
    }
}

/// Result of feeding one byte to the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Byte consumed; the frame is still incomplete
    Continue,
    /// The byte completed a frame
    FrameReady(RawFrame),
    /// The byte invalidated the frame in progress; assembler is idle again
    FrameDiscarded(DiscardReason),
}

/// Incremental assembler for encrypted P1 frames
///
/// Feed bytes one at a time; each call consumes exactly one byte and
/// advances at most one state transition. The assembler owns all partial
/// buffers and resets itself after every completed or discarded frame, so
/// a single instance can run for the lifetime of the link. Not safe for
/// concurrent use; confine it to the one reader task.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    state: AssemblerState,
    /// Bytes still required by the field being accumulated
    remaining: usize,
    system_title: BytesMut,
    data_length_bytes: [u8; 2],
    data_length: usize,
    frame_counter: [u8; FRAME_COUNTER_LENGTH],
    ciphertext: BytesMut,
    tag: [u8; GCM_TAG_LENGTH],
}

impl FrameAssembler {
    /// Create a new assembler in the idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state machine phase
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Check whether the assembler is between frames
    pub fn is_idle(&self) -> bool {
        self.state == AssemblerState::Idle
    }

    /// Consume one byte from the stream
    pub fn feed(&mut self, byte: u8) -> FeedOutcome {
        match self.state {
            AssemblerState::Idle => {
                if byte == START_BYTE {
                    self.reset_accumulators();
                    self.state = AssemblerState::Started;
                }
                FeedOutcome::Continue
            }

            AssemblerState::Started => {
                // System titles of length 0 are legal on the wire; the
                // separator check is then the very next byte.
                self.remaining = byte as usize;
                self.state = if self.remaining == 0 {
                    AssemblerState::Title
                } else {
                    AssemblerState::TitleLength
                };
                FeedOutcome::Continue
            }

            AssemblerState::TitleLength => {
                self.system_title.put_u8(byte);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = AssemblerState::Title;
                }
                FeedOutcome::Continue
            }

            AssemblerState::Title => {
                if byte != TITLE_SEPARATOR {
                    return self.discard(DiscardReason::BadTitleSeparator);
                }
                self.remaining = 2;
                self.state = AssemblerState::TitleSeparator;
                FeedOutcome::Continue
            }

            AssemblerState::TitleSeparator => {
                self.data_length_bytes[2 - self.remaining] = byte;
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.data_length = u16::from_be_bytes(self.data_length_bytes) as usize;
                    if self.data_length < DATA_LENGTH_OVERHEAD {
                        return self.discard(DiscardReason::DataLengthTooShort);
                    }
                    self.state = AssemblerState::DataLength;
                }
                FeedOutcome::Continue
            }

            AssemblerState::DataLength => {
                // Separator byte, not validated.
                self.remaining = FRAME_COUNTER_LENGTH;
                self.state = AssemblerState::FrameCounter;
                FeedOutcome::Continue
            }

            AssemblerState::FrameCounter => {
                self.frame_counter[FRAME_COUNTER_LENGTH - self.remaining] = byte;
                self.remaining -= 1;
                if self.remaining == 0 {
                    let payload_length = self.data_length - DATA_LENGTH_OVERHEAD;
                    if payload_length == 0 {
                        self.remaining = GCM_TAG_LENGTH;
                        self.state = AssemblerState::Tag;
                    } else {
                        self.remaining = payload_length;
                        self.state = AssemblerState::Payload;
                    }
                }
                FeedOutcome::Continue
            }

            AssemblerState::Payload => {
                self.ciphertext.put_u8(byte);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.remaining = GCM_TAG_LENGTH;
                    self.state = AssemblerState::Tag;
                }
                FeedOutcome::Continue
            }

            AssemblerState::Tag => {
                self.tag[GCM_TAG_LENGTH - self.remaining] = byte;
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = AssemblerState::Idle;
                    return FeedOutcome::FrameReady(self.take_frame());
                }
                FeedOutcome::Continue
            }
        }
    }

    fn discard(&mut self, reason: DiscardReason) -> FeedOutcome {
        log::warn!(
            "Dropping frame in state {}: {}",
            self.state.as_str(),
            reason.as_str()
        );
        self.state = AssemblerState::Idle;
        FeedOutcome::FrameDiscarded(reason)
    }

    fn take_frame(&mut self) -> RawFrame {
        RawFrame {
            system_title: std::mem::take(&mut self.system_title).freeze(),
            frame_counter: self.frame_counter,
            ciphertext: std::mem::take(&mut self.ciphertext).freeze(),
            tag: self.tag,
        }
    }

    fn reset_accumulators(&mut self) {
        self.remaining = 0;
        self.system_title.clear();
        self.data_length_bytes = [0; 2];
        self.data_length = 0;
        self.frame_counter = [0; FRAME_COUNTER_LENGTH];
        self.ciphertext.clear();
        self.tag = [0; GCM_TAG_LENGTH];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn frame_with_title(title: &[u8]) -> RawFrame {
        RawFrame {
            system_title: Bytes::copy_from_slice(title),
            frame_counter: [0x00, 0x00, 0x10, 0x01],
            ciphertext: Bytes::from_static(b"\x11\x22\x33\x44\x55"),
            tag: [0xAB; 12],
        }
    }

    /// Feed a byte slice, collecting every completed frame.
    fn feed_all(assembler: &mut FrameAssembler, bytes: &[u8]) -> Vec<RawFrame> {
        let mut frames = Vec::new();
        for &b in bytes {
            if let FeedOutcome::FrameReady(frame) = assembler.feed(b) {
                frames.push(frame);
            }
        }
        frames
    }

    #[test]
    fn test_assembles_single_frame() {
        let frame = frame_with_title(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let wire = frame.encode().unwrap();

        let mut assembler = FrameAssembler::new();
        let frames = feed_all(&mut assembler, &wire);
        assert_eq!(frames, vec![frame]);
        assert!(assembler.is_idle());
    }

    #[test]
    fn test_state_advances_one_field_at_a_time() {
        let mut assembler = FrameAssembler::new();
        assert_eq!(assembler.state(), AssemblerState::Idle);

        assembler.feed(START_BYTE);
        assert_eq!(assembler.state(), AssemblerState::Started);
        assembler.feed(2);
        assert_eq!(assembler.state(), AssemblerState::TitleLength);
        assembler.feed(0x4B);
        assert_eq!(assembler.state(), AssemblerState::TitleLength);
        assembler.feed(0x46);
        assert_eq!(assembler.state(), AssemblerState::Title);
        assembler.feed(TITLE_SEPARATOR);
        assert_eq!(assembler.state(), AssemblerState::TitleSeparator);
        assembler.feed(0x00);
        assembler.feed(17);
        assert_eq!(assembler.state(), AssemblerState::DataLength);
        assembler.feed(0x30);
        assert_eq!(assembler.state().as_str(), "FrameCounter");
    }

    #[test]
    fn test_ignores_noise_before_start_byte() {
        let frame = frame_with_title(&[9; 8]);
        let mut wire = vec![0x00, 0x7E, 0x41, 0xFF];
        wire.extend(frame.encode().unwrap());

        let mut assembler = FrameAssembler::new();
        let frames = feed_all(&mut assembler, &wire);
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn test_variable_title_lengths() {
        for len in [4usize, 8, 255] {
            let title: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let frame = frame_with_title(&title);
            let wire = frame.encode().unwrap();

            let mut assembler = FrameAssembler::new();
            let frames = feed_all(&mut assembler, &wire);
            assert_eq!(frames.len(), 1, "title length {}", len);
            assert_eq!(frames[0].system_title.len(), len);
            assert_eq!(frames[0], frame);
        }
    }

    #[test]
    fn test_empty_title_reaches_separator_check() {
        let frame = frame_with_title(&[]);
        let wire = frame.encode().unwrap();

        let mut assembler = FrameAssembler::new();
        let frames = feed_all(&mut assembler, &wire);
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn test_empty_ciphertext_skips_payload_phase() {
        let mut frame = frame_with_title(&[7; 8]);
        frame.ciphertext = Bytes::new();
        let wire = frame.encode().unwrap();

        let mut assembler = FrameAssembler::new();
        let frames = feed_all(&mut assembler, &wire);
        assert_eq!(frames, vec![frame]);
    }

    #[test]
    fn test_bad_separator_discards_frame() {
        let frame = frame_with_title(&[1; 4]);
        let mut wire = frame.encode().unwrap();
        wire[6] = 0x83; // corrupt the separator after the 4-byte title

        let mut assembler = FrameAssembler::new();
        let mut discarded = None;
        for &b in &wire {
            match assembler.feed(b) {
                FeedOutcome::FrameReady(_) => panic!("corrupt frame must not complete"),
                FeedOutcome::FrameDiscarded(reason) => discarded = Some(reason),
                FeedOutcome::Continue => {}
            }
        }
        assert_eq!(discarded, Some(DiscardReason::BadTitleSeparator));
        assert!(assembler.is_idle());
    }

    #[test]
    fn test_discard_does_not_eat_the_next_frame() {
        // A frame with a broken separator, immediately followed by a good one.
        let good = frame_with_title(&[2; 8]);
        let mut wire = frame_with_title(&[1; 8]).encode().unwrap();
        wire[10] = 0x00;
        wire.extend(good.encode().unwrap());

        let mut assembler = FrameAssembler::new();
        let frames = feed_all(&mut assembler, &wire);
        assert_eq!(frames, vec![good]);
    }

    #[test]
    fn test_data_length_below_overhead_discards() {
        let mut wire = vec![START_BYTE, 2, 0x41, 0x42, TITLE_SEPARATOR];
        wire.extend_from_slice(&16u16.to_be_bytes()); // 17 is the minimum

        let mut assembler = FrameAssembler::new();
        let mut outcome = FeedOutcome::Continue;
        for &b in &wire {
            outcome = assembler.feed(b);
        }
        assert_eq!(
            outcome,
            FeedOutcome::FrameDiscarded(DiscardReason::DataLengthTooShort)
        );
        assert!(assembler.is_idle());
    }

    #[test]
    fn test_back_to_back_frames() {
        let first = frame_with_title(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let mut second = frame_with_title(&[8, 7, 6, 5, 4, 3, 2, 1]);
        second.frame_counter = [0x00, 0x00, 0x10, 0x02];
        second.ciphertext = Bytes::from_static(b"\x99\x88");

        let mut wire = first.encode().unwrap();
        wire.extend(second.encode().unwrap());

        let mut assembler = FrameAssembler::new();
        let frames = feed_all(&mut assembler, &wire);
        assert_eq!(frames, vec![first, second]);
        assert!(assembler.is_idle());
    }

    #[test]
    fn test_start_byte_inside_fields_is_data() {
        // 0xDB may legitimately appear inside the title, counter, payload
        // and tag; only an idle assembler treats it as a start marker.
        let mut frame = frame_with_title(&[START_BYTE; 8]);
        frame.frame_counter = [START_BYTE; 4];
        frame.ciphertext = Bytes::from_static(&[START_BYTE; 5]);
        frame.tag = [START_BYTE; 12];
        let wire = frame.encode().unwrap();

        let mut assembler = FrameAssembler::new();
        let frames = feed_all(&mut assembler, &wire);
        assert_eq!(frames, vec![frame]);
    }
}
