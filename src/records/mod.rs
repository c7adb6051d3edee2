//! # Record Codec
//!
//! The record/array codec: lazy per-column decoding into a conversion
//! cache, windowed per-row record accessors, and the inverse scale-back
//! pass that regenerates raw storage before persistence.
//!
//! ## Data flow
//!
//! ```text
//! TableRecordArray ──field()──> decode ──> conversion cache
//!        │                                      │
//!        ├── get_row() ──> RecordView ──get/set─┘
//!        │
//!        └── scale_back() ──> encode ──> raw buffer (+ heap layout)
//! ```
//!
//! ## Module Structure
//!
//! - `error`: the [`CodecError`] taxonomy
//! - `array`: [`TableRecordArray`] and the conversion cache
//! - `view`: [`RecordView`], the windowed row lens
//! - `decode`: raw storage -> logical array, one policy per format tag
//! - `encode`: logical array -> raw storage, the exact inverse

pub mod array;
pub mod decode;
pub mod encode;
pub mod error;
pub mod view;


pub use array::{FieldKey, RowSource, TableRecordArray};
pub use error::CodecError;
pub use view::RecordView;
