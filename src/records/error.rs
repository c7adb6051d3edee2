//! # Codec Error Taxonomy
//!
//! All programmer/data errors the record codec can raise. Every variant is
//! surfaced synchronously through `eyre::Report`; callers that need to
//! branch on the category downcast with `report.downcast_ref::<CodecError>()`.
//! I/O failures from heap sources are not part of this taxonomy and
//! propagate as plain reports.

#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Unknown column name.
    NameNotFound { name: String },
    /// Known column name resolving outside a record view's window.
    NameOutOfWindow {
        name: String,
        start: usize,
        end: usize,
    },
    /// Row or column index out of bounds.
    IndexOutOfRange { index: usize, len: usize },
    /// Window-relative column position past the end of the window.
    PositionOutOfWindow { position: usize, window: usize },
    /// Whole-row assignment with the wrong number of values.
    ArityMismatch { expected: usize, got: usize },
    /// Assignment from a value kind the column cannot hold.
    UnsupportedAssignment {
        expected: &'static str,
        found: &'static str,
    },
    /// ASCII column layout gap computed negative.
    OverlapError { column: String },
    /// Formatted ASCII value wider than its column.
    FieldTooNarrow { value: String, width: usize },
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::NameNotFound { name } => {
                write!(f, "column '{name}' does not exist")
            }
            CodecError::NameOutOfWindow { name, start, end } => {
                write!(
                    f,
                    "column '{name}' is outside the view window [{start}, {end})"
                )
            }
            CodecError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            CodecError::PositionOutOfWindow { position, window } => {
                write!(
                    f,
                    "position {position} out of bounds for window of {window} columns"
                )
            }
            CodecError::ArityMismatch { expected, got } => {
                write!(f, "expected {expected} values, got {got}")
            }
            CodecError::UnsupportedAssignment { expected, found } => {
                write!(f, "cannot assign {found} value to {expected} column")
            }
            CodecError::OverlapError { column } => {
                write!(f, "column '{column}' overlaps an adjacent column")
            }
            CodecError::FieldTooNarrow { value, width } => {
                write!(
                    f,
                    "value '{value}' does not fit the column width of {width}"
                )
            }
        }
    }
}

impl std::error::Error for CodecError {}
