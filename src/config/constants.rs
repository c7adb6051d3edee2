//! # Codec Constants
//!
//! This module centralizes the byte codes and sentinel values of the table
//! format. Import constants from here rather than defining them locally.
//!
//! ## Relationships
//!
//! ```text
//! LOGICAL_TRUE / LOGICAL_FALSE
//!       Stored byte codes for boolean columns. The decoder maps
//!       LOGICAL_TRUE to true and every other byte to false; the encoder
//!       only ever writes these two codes.
//!
//! HEAP_DESCRIPTOR_WIDTH (8 bytes)
//!       Each variable-length column cell stores a (count, byte_offset)
//!       pair of big-endian i32s in the fixed row region. Must equal
//!       size_of::<HeapDescriptor>().
//!
//! TEXT_NULL_INT / TEXT_NULL_FLOAT
//!       The numeric value substituted when a text-table cell matches the
//!       column's declared null sentinel. Both spellings exist so integer
//!       and float columns stay in their natural logical representation.
//!
//! EXPONENT_MARKER / DOUBLE_EXPONENT_MARKER
//!       Text tables write double-precision exponents with a 'D' marker.
//!       The decoder normalizes 'D'/'d' to 'E' before parsing; the encoder
//!       restores 'D' for double-precision columns.
//! ```

/// Stored byte code for boolean `true`.
pub const LOGICAL_TRUE: u8 = b'T';

/// Stored byte code for boolean `false`.
pub const LOGICAL_FALSE: u8 = b'F';

/// Byte width of a variable-length column's in-row `(count, offset)` descriptor.
pub const HEAP_DESCRIPTOR_WIDTH: usize = 8;

/// Null substitute for integer text-table columns.
pub const TEXT_NULL_INT: i64 = 0;

/// Null substitute for floating-point text-table columns.
pub const TEXT_NULL_FLOAT: f64 = 0.0;

/// Canonical exponent marker used while parsing numeric text.
pub const EXPONENT_MARKER: char = 'E';

/// Exponent marker written for double-precision text columns.
pub const DOUBLE_EXPONENT_MARKER: char = 'D';
