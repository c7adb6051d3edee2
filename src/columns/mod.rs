//! # Column Descriptors
//!
//! This module defines the column model consumed by the record codec: the
//! per-column [`ColumnDescriptor`] (format tag, storage width, scaling
//! factors, null sentinel, declared start offset) and the ordered,
//! name-indexed [`ColumnSet`] that fixes the byte layout of a table row.
//!
//! The codec itself never interprets format codes from a file header; it
//! expects the header layer to have already resolved them into these types.

pub mod descriptor;
pub mod set;

pub use descriptor::{ColumnDescriptor, ElementKind, FormatTag, TableKind};
pub use set::ColumnSet;
