//! Configuration constants for the codec.

pub mod constants;

pub use constants::*;
