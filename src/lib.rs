//! Watermarking tool for images.
//!
//! Hides a binary watermark image inside a carrier image by scrambling pixel
//! positions with Arnold's cat map and flipping low bits with XOR. The
//! scrambling key is the shared secret needed to recover the watermark.
pub mod catmap;
pub mod cli;
pub mod grid;
pub mod key;
pub mod watermark;
