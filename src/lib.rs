//! # astrotab - Record Codec for Tabular Scientific Binaries
//!
//! astrotab translates between the raw storage of table columns in a
//! scientific binary file format (fixed-width binary or ASCII text rows,
//! possibly bit-packed, possibly pointing into a variable-length heap) and
//! their logical, application-facing representation (scaled physical
//! quantities, booleans, variable-length sequences, strings).
//!
//! ## Quick Start
//!
//! ```ignore
//! use astrotab::{ColumnDescriptor, ColumnSet, FormatTag, ElementKind, TableKind};
//! use astrotab::TableRecordArray;
//!
//! let columns = ColumnSet::new(TableKind::Binary, vec![
//!     ColumnDescriptor::new("counts", FormatTag::BinaryScaled(ElementKind::Int16), 2)
//!         .with_scaling(0.01, 0.0),
//!     ColumnDescriptor::new("valid", FormatTag::BinaryBoolean, 1),
//! ])?;
//!
//! let table = TableRecordArray::new(raw_rows, columns)?;
//! let physical = table.field("counts")?;       // decoded + scaled, cached
//! table.get_row(0)?.set("valid", true.into())?;
//! table.scale_back()?;                         // regenerate raw storage
//! let bytes = table.raw_bytes();               // ready to persist
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │    Callers (header / persistence layer)  │
//! ├─────────────────────────────────────────┤
//! │  TableRecordArray │ RecordView (windows) │
//! ├───────────────────┴─────────────────────┤
//! │   Conversion Cache (one slot / column)   │
//! ├─────────────────────────────────────────┤
//! │   Field Decoder  │  Field Encoder        │
//! ├──────────────────┴──────────────────────┤
//! │  bit packing │ ASCII formats │ heap I/O  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Scope
//!
//! The crate is the per-row/per-column conversion engine over an
//! already-allocated buffer. File-header parsing, extension management,
//! table construction, and I/O scheduling belong to the calling layer; it
//! is expected to call [`TableRecordArray::scale_back`] exactly once
//! before serializing the raw buffer.
//!
//! ## Concurrency
//!
//! Execution is single-threaded and synchronous. Cache slots are
//! individually locked so first population is race-free, but the backing
//! heap source assumes exclusive access for the duration of a `field()` or
//! `scale_back()` call, and no cancellation semantics apply.
//!
//! ## Module Overview
//!
//! - [`columns`]: column descriptors and the row-layout column set
//! - [`records`]: the record array, record views, decoder, encoder
//! - [`types`]: logical column arrays and cell values
//! - [`storage`]: heap sources for variable-length payloads
//! - [`encoding`]: bit packing and fixed-width ASCII primitives
//! - [`config`]: format byte codes and sentinel values

pub mod columns;
pub mod config;
pub mod encoding;
pub mod records;
pub mod storage;
pub mod types;

pub use columns::{ColumnDescriptor, ColumnSet, ElementKind, FormatTag, TableKind};
pub use records::{CodecError, FieldKey, RecordView, RowSource, TableRecordArray};
pub use storage::{FileHeap, HeapSource, MemoryHeap, MmapHeap};
pub use types::{LogicalColumn, Value, VarSeq};
