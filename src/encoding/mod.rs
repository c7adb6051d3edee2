//! Low-level encoding primitives shared by the field decoder and encoder.

pub mod ascii;
pub mod bits;
