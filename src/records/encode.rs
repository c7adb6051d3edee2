//! # Field Encoder
//!
//! The inverse of the decoder: regenerates one column's raw storage from
//! its cached logical array before the buffer is persisted. Runs once per
//! materialized column during `TableRecordArray::scale_back`.
//!
//! Variable-length columns do not write payload bytes here; they rebuild
//! the in-row `(count, offset)` descriptors against the running heap size
//! carried across the pass, and the persistence layer serializes the heap
//! from the logical sequences afterwards.
//!
//! ASCII columns validate their declared layout while encoding: a negative
//! gap to a neighbour is an `OverlapError`, a formatted value wider than
//! the column is a `FieldTooNarrow`. Both stop the pass at the offending
//! column; earlier columns keep whatever was already written (best-effort
//! single pass, not a transaction).

use eyre::{bail, ensure, Result, WrapErr};

use crate::columns::{ColumnDescriptor, ColumnSet, ElementKind, FormatTag, TableKind};
use crate::config::{LOGICAL_FALSE, LOGICAL_TRUE};
use crate::encoding::{ascii, bits};
use crate::records::error::CodecError;
use crate::storage::HeapDescriptor;
use crate::types::LogicalColumn;

/// Encodes column `idx` of `raw` (exactly `rows` rows of
/// `columns.row_stride()` bytes) from its logical array.
///
/// `heap_size` is the running total of heap bytes laid out so far in this
/// scale-back pass; variable-length columns base their offsets on it and
/// advance it.
pub(crate) fn encode_field(
    raw: &mut [u8],
    rows: usize,
    columns: &ColumnSet,
    idx: usize,
    logical: &LogicalColumn,
    heap_size: &mut u64,
) -> Result<()> {
    let col = columns.column(idx)?.clone();
    ensure!(
        logical.rows() == rows,
        "column {} cache holds {} rows but the array has {}",
        col.name,
        logical.rows(),
        rows
    );

    let stride = columns.row_stride();
    let offset = columns.offset(idx);
    let width = col.storage_width;

    match (col.format, logical) {
        (FormatTag::Bit(n), LogicalColumn::Bits { width: w, bits, .. }) => {
            ensure!(
                *w == n,
                "column {} cache is {} bits wide, storage wants {}",
                col.name,
                w,
                n
            );
            for row in 0..rows {
                let at = row * stride + offset;
                bits::pack_row(&bits[row * n..(row + 1) * n], &mut raw[at..at + width]);
            }
        }
        (FormatTag::VarLen(kind), LogicalColumn::VarLen(seqs)) => {
            let elem_width = kind.width() as u64;
            let mut running = 0u64;
            for (row, seq) in seqs.iter().enumerate() {
                let at = row * stride + offset;
                let count = i32::try_from(seq.len())
                    .wrap_err_with(|| format!("column {} row {} sequence too long", col.name, row))?;
                let byte_offset = i32::try_from(*heap_size + running)
                    .wrap_err_with(|| format!("column {} heap offset overflow", col.name))?;
                HeapDescriptor::new(count, byte_offset).store(&mut raw[at..at + width]);
                running += seq.len() as u64 * elem_width;
            }
            *heap_size += running;
        }
        (FormatTag::AsciiNumeric(kind), LogicalColumn::Floats(values)) => {
            check_ascii_gaps(columns, idx, &col)?;
            for (row, &value) in values.iter().enumerate() {
                let raw_value = invert_scaling(&col, value);
                let text = if kind.is_integral() {
                    ascii::format_int(raw_value.round() as i64, width)?
                } else {
                    ascii::format_float(raw_value, width, kind == ElementKind::Float64)?
                };
                let at = row * stride + offset;
                raw[at..at + width].copy_from_slice(text.as_bytes());
            }
        }
        (FormatTag::AsciiNumeric(kind), LogicalColumn::Ints(values)) => {
            check_ascii_gaps(columns, idx, &col)?;
            for (row, &value) in values.iter().enumerate() {
                let text = if kind.is_integral() {
                    ascii::format_int(value, width)?
                } else {
                    ascii::format_float(value as f64, width, kind == ElementKind::Float64)?
                };
                let at = row * stride + offset;
                raw[at..at + width].copy_from_slice(text.as_bytes());
            }
        }
        (FormatTag::AsciiText, LogicalColumn::Text(values)) => {
            check_ascii_gaps(columns, idx, &col)?;
            for (row, value) in values.iter().enumerate() {
                let text = ascii::format_text(value.trim_end(), width)?;
                let at = row * stride + offset;
                raw[at..at + width].copy_from_slice(text.as_bytes());
            }
        }
        (FormatTag::BinaryString, LogicalColumn::Text(values)) => {
            for (row, value) in values.iter().enumerate() {
                let text = ascii::format_text(value.trim_end(), width)?;
                let at = row * stride + offset;
                raw[at..at + width].copy_from_slice(text.as_bytes());
            }
        }
        (FormatTag::BinaryScaled(kind), LogicalColumn::Floats(values)) => {
            for (row, &value) in values.iter().enumerate() {
                let raw_value = invert_scaling(&col, value);
                let at = row * stride + offset;
                write_element(kind, raw_value, &mut raw[at..at + width]);
            }
        }
        (FormatTag::BinaryScaled(kind), LogicalColumn::Ints(values)) => {
            for (row, &value) in values.iter().enumerate() {
                let at = row * stride + offset;
                write_int_element(kind, value, &mut raw[at..at + width]);
            }
        }
        (FormatTag::BinaryBoolean, LogicalColumn::Booleans(values)) => {
            for (row, &value) in values.iter().enumerate() {
                let at = row * stride + offset;
                raw[at] = if value { LOGICAL_TRUE } else { LOGICAL_FALSE };
            }
        }
        (FormatTag::BinaryPlain, LogicalColumn::Raw { width: w, bytes }) => {
            ensure!(
                *w == width,
                "column {} cache width {} does not match storage width {}",
                col.name,
                w,
                width
            );
            for row in 0..rows {
                let at = row * stride + offset;
                raw[at..at + width].copy_from_slice(&bytes[row * width..(row + 1) * width]);
            }
        }
        (format, logical) => bail!(
            "column {} cache variant does not match format {:?}: {:?}",
            col.name,
            format,
            logical
        ),
    }
    Ok(())
}

/// Validates the declared layout of an ASCII column against its neighbours.
///
/// The leading gap is this column's start minus the previous column's end;
/// the trailing gap is the next column's start minus this column's end.
/// Either gap computing negative means the declared starts overlap.
fn check_ascii_gaps(columns: &ColumnSet, idx: usize, col: &ColumnDescriptor) -> Result<()> {
    if columns.kind() != TableKind::Text {
        return Ok(());
    }

    let start = columns.offset(idx);
    let prev_end = if idx == 0 {
        0
    } else {
        columns.offset(idx - 1) + columns.column(idx - 1)?.storage_width
    };
    if start < prev_end {
        return Err(CodecError::OverlapError {
            column: col.name.clone(),
        }
        .into());
    }

    let end = start + col.storage_width;
    let next_start = if idx + 1 < columns.column_count() {
        columns.offset(idx + 1)
    } else {
        columns.row_stride()
    };
    if next_start < end {
        return Err(CodecError::OverlapError {
            column: col.name.clone(),
        }
        .into());
    }
    Ok(())
}

/// Inverts `physical = raw * scale + zero` on a single value.
fn invert_scaling(col: &ColumnDescriptor, mut value: f64) -> f64 {
    if let Some(zero) = col.effective_zero() {
        value -= zero;
    }
    if let Some(scale) = col.effective_scale() {
        value /= scale;
    }
    value
}

/// Writes one element in big-endian storage form, rounding to nearest when
/// the storage kind is integral.
fn write_element(kind: ElementKind, value: f64, out: &mut [u8]) {
    match kind {
        ElementKind::Byte | ElementKind::Logical | ElementKind::Char => {
            out[0] = value.round() as u8;
        }
        ElementKind::Int16 => out[..2].copy_from_slice(&(value.round() as i16).to_be_bytes()),
        ElementKind::Int32 => out[..4].copy_from_slice(&(value.round() as i32).to_be_bytes()),
        ElementKind::Int64 => out[..8].copy_from_slice(&(value.round() as i64).to_be_bytes()),
        ElementKind::Float32 => out[..4].copy_from_slice(&(value as f32).to_be_bytes()),
        ElementKind::Float64 => out[..8].copy_from_slice(&value.to_be_bytes()),
    }
}

/// Writes one integer element without a round-trip through f64.
fn write_int_element(kind: ElementKind, value: i64, out: &mut [u8]) {
    match kind {
        ElementKind::Byte | ElementKind::Logical | ElementKind::Char => out[0] = value as u8,
        ElementKind::Int16 => out[..2].copy_from_slice(&(value as i16).to_be_bytes()),
        ElementKind::Int32 => out[..4].copy_from_slice(&(value as i32).to_be_bytes()),
        ElementKind::Int64 => out[..8].copy_from_slice(&value.to_be_bytes()),
        ElementKind::Float32 => out[..4].copy_from_slice(&(value as f32).to_be_bytes()),
        ElementKind::Float64 => out[..8].copy_from_slice(&(value as f64).to_be_bytes()),
    }
}
