//! Byte sources for the P1 reader
//!
//! This crate provides the [`ByteSource`] trait consumed by the reader task,
//! plus the two concrete sources: a live P1 serial port and a capture-file
//! replay used for simulation and testing.

pub mod replay;
pub mod serial;
pub mod stream;

pub use replay::ReplaySource;
pub use serial::{SerialByteSource, SerialSettings};
pub use stream::ByteSource;
