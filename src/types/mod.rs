//! Logical (application-facing) value representations.
//!
//! Raw column storage decodes into a [`LogicalColumn`], one per cached
//! column; individual cells move in and out as [`Value`]s.

pub mod logical;
pub mod value;

pub use logical::{LogicalColumn, VarSeq};
pub use value::Value;
