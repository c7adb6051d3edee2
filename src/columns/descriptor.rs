//! # Column Descriptor
//!
//! A `ColumnDescriptor` carries everything the codec needs to convert one
//! column between raw storage and its logical representation:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `format` | Closed [`FormatTag`] selecting the conversion policy |
//! | `storage_width` | Byte width of the column in the fixed row region |
//! | `scale` / `zero` | Linear transform: `physical = raw * scale + zero` |
//! | `null_sentinel` | Text whose trimmed form marks a null cell (text tables) |
//! | `ascii_start` | Declared byte start of the value within a text-table row |
//!
//! ## Effective scaling
//!
//! A declared scale of exactly 1.0 (or zero of exactly 0.0) is treated the
//! same as an absent factor: no scaling step runs and the column keeps its
//! raw element type. `effective_scale`/`effective_zero` encode that rule in
//! one place so the decoder and encoder cannot disagree.

/// Element type of binary numeric storage and variable-length payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// One-byte logical value, stored as the `'T'`/`'F'` byte codes.
    Logical,
    Byte,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Raw character data, one byte per element.
    Char,
}

impl ElementKind {
    /// Storage width of one element in bytes.
    pub fn width(&self) -> usize {
        match self {
            ElementKind::Logical | ElementKind::Byte | ElementKind::Char => 1,
            ElementKind::Int16 => 2,
            ElementKind::Int32 | ElementKind::Float32 => 4,
            ElementKind::Int64 | ElementKind::Float64 => 8,
        }
    }

    /// Whether raw storage for this kind is an integer type. Integral
    /// storage rounds to nearest before narrowing during encode.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ElementKind::Byte | ElementKind::Int16 | ElementKind::Int32 | ElementKind::Int64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ElementKind::Float32 | ElementKind::Float64)
    }
}

/// Closed set of column storage formats. The decoder and encoder match on
/// this exhaustively, so adding a format forces both sites to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    /// Bit-packed boolean array of `n` bits per row.
    Bit(usize),
    /// Variable-length sequence; the fixed row holds a heap descriptor.
    VarLen(ElementKind),
    /// Fixed-width text in a text table, returned unconverted.
    AsciiText,
    /// Fixed-width numeric text in a text table.
    AsciiNumeric(ElementKind),
    /// Binary numeric storage, optionally scaled.
    BinaryScaled(ElementKind),
    /// One-byte logical stored as `'T'`/`'F'`.
    BinaryBoolean,
    /// Fixed-width byte string in a binary table.
    BinaryString,
    /// Opaque fixed-width bytes, passed through unconverted.
    BinaryPlain,
}

/// Whether a table stores rows as packed binary or as ASCII text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Binary,
    Text,
}

#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub format: FormatTag,
    pub storage_width: usize,
    pub scale: Option<f64>,
    pub zero: Option<f64>,
    pub null_sentinel: Option<String>,
    pub ascii_start: Option<usize>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, format: FormatTag, storage_width: usize) -> Self {
        Self {
            name: name.into(),
            format,
            storage_width,
            scale: None,
            zero: None,
            null_sentinel: None,
            ascii_start: None,
        }
    }

    pub fn with_scaling(mut self, scale: f64, zero: f64) -> Self {
        self.scale = Some(scale);
        self.zero = Some(zero);
        self
    }

    pub fn with_null_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.null_sentinel = Some(sentinel.into());
        self
    }

    pub fn with_ascii_start(mut self, start: usize) -> Self {
        self.ascii_start = Some(start);
        self
    }

    /// Scale factor with identity (1.0) collapsed to "not scaled".
    pub fn effective_scale(&self) -> Option<f64> {
        match self.scale {
            Some(s) if s != 1.0 => Some(s),
            _ => None,
        }
    }

    /// Zero offset with identity (0.0) collapsed to "not offset".
    pub fn effective_zero(&self) -> Option<f64> {
        match self.zero {
            Some(z) if z != 0.0 => Some(z),
            _ => None,
        }
    }

    /// Whether any scaling step applies to this column.
    pub fn is_scaled(&self) -> bool {
        self.effective_scale().is_some() || self.effective_zero().is_some()
    }
}
