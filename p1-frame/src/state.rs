//! Frame assembler state machine phases

/// Assembly phase of the frame state machine
///
/// Each variant names the field that has most recently been completed;
/// the assembler is accumulating the next field of the grammar.
///
/// # State Transitions
/// ```text
/// Idle -> Started                 (start byte 0xDB seen)
/// Started -> TitleLength          (title length byte read)
/// TitleLength -> Title            (N title bytes collected)
/// Title -> TitleSeparator         (0x82 verified; else discard -> Idle)
/// TitleSeparator -> DataLength    (2-byte big-endian length parsed)
/// DataLength -> FrameCounter      (unvalidated separator byte skipped)
/// FrameCounter -> Payload         (4 counter bytes collected)
/// Payload -> Tag                  (dataLength-17 ciphertext bytes collected)
/// Tag -> Idle                     (12 tag bytes collected, frame emitted)
/// ```
///
/// A discard at any phase returns to `Idle` without consuming the byte
/// stream beyond the offending byte, so the next `0xDB` starts a new frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Waiting for the start byte; all other input is ignored
    Idle,
    /// Start byte seen; next byte is the system-title length
    Started,
    /// Title length known; accumulating the system title
    TitleLength,
    /// System title complete; next byte must be the 0x82 separator
    Title,
    /// Separator verified; accumulating the 2-byte data length
    TitleSeparator,
    /// Data length parsed; next byte is an unvalidated separator
    DataLength,
    /// Accumulating the 4-byte frame counter
    FrameCounter,
    /// Accumulating the ciphertext
    Payload,
    /// Accumulating the 12-byte GCM tag
    Tag,
}

impl AssemblerState {
    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblerState::Idle => "Idle",
            AssemblerState::Started => "Started",
            AssemblerState::TitleLength => "TitleLength",
            AssemblerState::Title => "Title",
            AssemblerState::TitleSeparator => "TitleSeparator",
            AssemblerState::DataLength => "DataLength",
            AssemblerState::FrameCounter => "FrameCounter",
            AssemblerState::Payload => "Payload",
            AssemblerState::Tag => "Tag",
        }
    }
}

impl Default for AssemblerState {
    fn default() -> Self {
        AssemblerState::Idle
    }
}
