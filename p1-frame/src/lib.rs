//! Incremental frame assembly for encrypted P1 telegrams
//!
//! Smart meters on the P1 interface deliver encrypted DLMS "general glo
//! ciphering" frames as a raw byte stream. This crate reconstructs those
//! frames one byte at a time: [`FrameAssembler`] drives the state machine,
//! [`RawFrame`] is the completed result handed to the security layer.

pub mod assembler;
pub mod frame;
pub mod state;

pub use assembler::{DiscardReason, FeedOutcome, FrameAssembler};
pub use frame::{
    RawFrame, DATA_LENGTH_OVERHEAD, FRAME_COUNTER_LENGTH, GCM_TAG_LENGTH, START_BYTE,
    TITLE_SEPARATOR,
};
pub use state::AssemblerState;
