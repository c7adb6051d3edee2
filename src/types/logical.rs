//! # Logical Column Arrays
//!
//! A `LogicalColumn` is the decoded, application-facing form of one table
//! column across all rows of a record array instance. The variant is fixed
//! by the column's format tag:
//!
//! | Format | Logical variant |
//! |--------|-----------------|
//! | `Bit(n)` | `Bits` (row-major rows x n booleans) |
//! | `BinaryBoolean` | `Booleans` |
//! | `BinaryScaled`/`AsciiNumeric`, unscaled integral | `Ints` |
//! | `BinaryScaled`/`AsciiNumeric`, float or scaled | `Floats` |
//! | `AsciiText` / `BinaryString` | `Text` |
//! | `VarLen` | `VarLen` (one `VarSeq` per row) |
//! | `BinaryPlain` | `Raw` (row-major opaque bytes) |
//!
//! Columns are sliced by row when a record array is sliced, and mutated in
//! place through cell writes; the encoder later regenerates raw storage
//! from whatever the logical column holds.

use std::ops::Range;

use eyre::Result;

use crate::records::error::CodecError;
use crate::types::value::Value;

/// One row's payload in a variable-length column.
#[derive(Debug, Clone, PartialEq)]
pub enum VarSeq {
    Bytes(Vec<u8>),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Booleans(Vec<bool>),
}

impl VarSeq {
    pub fn len(&self) -> usize {
        match self {
            VarSeq::Bytes(v) => v.len(),
            VarSeq::Ints(v) => v.len(),
            VarSeq::Floats(v) => v.len(),
            VarSeq::Booleans(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalColumn {
    /// Bit-array column: `rows * width` booleans, row-major.
    Bits {
        rows: usize,
        width: usize,
        bits: Vec<bool>,
    },
    Booleans(Vec<bool>),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Text(Vec<String>),
    VarLen(Vec<VarSeq>),
    /// Opaque fixed-width bytes: `rows * width`, row-major.
    Raw { width: usize, bytes: Vec<u8> },
}

impl LogicalColumn {
    pub fn rows(&self) -> usize {
        match self {
            LogicalColumn::Bits { rows, .. } => *rows,
            LogicalColumn::Booleans(v) => v.len(),
            LogicalColumn::Ints(v) => v.len(),
            LogicalColumn::Floats(v) => v.len(),
            LogicalColumn::Text(v) => v.len(),
            LogicalColumn::VarLen(v) => v.len(),
            LogicalColumn::Raw { width, bytes } => {
                if *width == 0 {
                    0
                } else {
                    bytes.len() / width
                }
            }
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            LogicalColumn::Bits { .. } => "bit array",
            LogicalColumn::Booleans(_) => "boolean",
            LogicalColumn::Ints(_) => "integer",
            LogicalColumn::Floats(_) => "float",
            LogicalColumn::Text(_) => "text",
            LogicalColumn::VarLen(_) => "sequence",
            LogicalColumn::Raw { .. } => "bytes",
        }
    }

    /// Restricts the column to a row subrange, producing an owned copy.
    pub fn slice_rows(&self, range: Range<usize>) -> LogicalColumn {
        match self {
            LogicalColumn::Bits { width, bits, .. } => LogicalColumn::Bits {
                rows: range.len(),
                width: *width,
                bits: bits[range.start * width..range.end * width].to_vec(),
            },
            LogicalColumn::Booleans(v) => LogicalColumn::Booleans(v[range].to_vec()),
            LogicalColumn::Ints(v) => LogicalColumn::Ints(v[range].to_vec()),
            LogicalColumn::Floats(v) => LogicalColumn::Floats(v[range].to_vec()),
            LogicalColumn::Text(v) => LogicalColumn::Text(v[range].to_vec()),
            LogicalColumn::VarLen(v) => LogicalColumn::VarLen(v[range].to_vec()),
            LogicalColumn::Raw { width, bytes } => LogicalColumn::Raw {
                width: *width,
                bytes: bytes[range.start * width..range.end * width].to_vec(),
            },
        }
    }

    /// Reads one cell as an owned [`Value`]. `row` must be in bounds.
    pub fn cell(&self, row: usize) -> Value {
        match self {
            LogicalColumn::Bits { width, bits, .. } => {
                Value::Bits(bits[row * width..(row + 1) * width].to_vec())
            }
            LogicalColumn::Booleans(v) => Value::Bool(v[row]),
            LogicalColumn::Ints(v) => Value::Int(v[row]),
            LogicalColumn::Floats(v) => Value::Float(v[row]),
            LogicalColumn::Text(v) => Value::Text(v[row].clone()),
            LogicalColumn::VarLen(v) => Value::Seq(v[row].clone()),
            LogicalColumn::Raw { width, bytes } => {
                Value::Bytes(bytes[row * width..(row + 1) * width].to_vec())
            }
        }
    }

    /// Writes one cell. The value's kind must match the column's variant;
    /// integers are accepted into float columns.
    pub fn set_cell(&mut self, row: usize, value: Value) -> Result<()> {
        let mismatch = |column: &LogicalColumn, value: &Value| -> eyre::Report {
            CodecError::UnsupportedAssignment {
                expected: column.kind_name(),
                found: value.kind_name(),
            }
            .into()
        };

        match (&mut *self, value) {
            (LogicalColumn::Bits { width, bits, .. }, Value::Bits(row_bits)) => {
                if row_bits.len() != *width {
                    return Err(CodecError::ArityMismatch {
                        expected: *width,
                        got: row_bits.len(),
                    }
                    .into());
                }
                bits[row * *width..(row + 1) * *width].copy_from_slice(&row_bits);
            }
            (LogicalColumn::Booleans(v), Value::Bool(b)) => v[row] = b,
            (LogicalColumn::Ints(v), Value::Int(i)) => v[row] = i,
            (LogicalColumn::Floats(v), Value::Float(x)) => v[row] = x,
            (LogicalColumn::Floats(v), Value::Int(i)) => v[row] = i as f64,
            (LogicalColumn::Text(v), Value::Text(s)) => v[row] = s,
            (LogicalColumn::VarLen(v), Value::Seq(seq)) => v[row] = seq,
            (LogicalColumn::Raw { width, bytes }, Value::Bytes(cell)) => {
                if cell.len() != *width {
                    return Err(CodecError::ArityMismatch {
                        expected: *width,
                        got: cell.len(),
                    }
                    .into());
                }
                bytes[row * *width..(row + 1) * *width].copy_from_slice(&cell);
            }
            (column, value) => return Err(mismatch(column, &value)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_slice_keeps_row_shape() {
        let col = LogicalColumn::Bits {
            rows: 3,
            width: 2,
            bits: vec![true, false, false, true, true, true],
        };
        let sliced = col.slice_rows(1..3);
        assert_eq!(sliced.rows(), 2);
        assert_eq!(sliced.cell(0), Value::Bits(vec![false, true]));
        assert_eq!(sliced.cell(1), Value::Bits(vec![true, true]));
    }

    #[test]
    fn int_accepted_into_float_column() {
        let mut col = LogicalColumn::Floats(vec![0.0, 0.0]);
        col.set_cell(1, Value::Int(5)).unwrap();
        assert_eq!(col.cell(1), Value::Float(5.0));
    }

    #[test]
    fn kind_mismatch_is_unsupported_assignment() {
        let mut col = LogicalColumn::Booleans(vec![false]);
        let err = col.set_cell(0, Value::Text("T".into())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::UnsupportedAssignment { .. })
        ));
    }

    #[test]
    fn wrong_width_bits_rejected() {
        let mut col = LogicalColumn::Bits {
            rows: 1,
            width: 3,
            bits: vec![false; 3],
        };
        assert!(col.set_cell(0, Value::Bits(vec![true])).is_err());
    }
}
