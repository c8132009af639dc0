//! Security layer for the P1 reader
//!
//! Authenticated encryption and decryption of assembled P1 frames with
//! AES-128-GCM.

pub mod cipher;

pub use cipher::FrameCipher;
