//! # Field Decoder
//!
//! Pure conversion from one column's raw storage to its logical array.
//! `decode_field` is invoked lazily by `TableRecordArray::field` on the
//! first access to a column; the result lands in the conversion cache.
//!
//! Decoding never mutates raw storage and never recomputes heap layout: a
//! variable-length cell's stored `(count, offset)` descriptor is trusted
//! as-is, and every heap read is an explicit positioned read.

use std::sync::Arc;

use eyre::{ensure, eyre, Result, WrapErr};
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::columns::{ColumnDescriptor, ColumnSet, ElementKind, FormatTag};
use crate::config::{LOGICAL_TRUE, TEXT_NULL_FLOAT, TEXT_NULL_INT};
use crate::encoding::{ascii, bits};
use crate::storage::{HeapDescriptor, HeapSource};
use crate::types::{LogicalColumn, VarSeq};

/// Decodes column `idx` of `raw` (exactly `rows` rows of
/// `columns.row_stride()` bytes) into its logical array.
pub(crate) fn decode_field(
    raw: &[u8],
    rows: usize,
    columns: &ColumnSet,
    idx: usize,
    heap_base: u64,
    source: Option<&Arc<Mutex<dyn HeapSource>>>,
) -> Result<LogicalColumn> {
    let col = columns.column(idx)?;
    let stride = columns.row_stride();
    let offset = columns.offset(idx);
    let field = |row: usize| -> &[u8] {
        let at = row * stride + offset;
        &raw[at..at + col.storage_width]
    };

    match col.format {
        FormatTag::Bit(n) => {
            let mut all = Vec::with_capacity(rows * n);
            for row in 0..rows {
                bits::unpack_row(field(row), n, &mut all);
            }
            Ok(LogicalColumn::Bits {
                rows,
                width: n,
                bits: all,
            })
        }
        FormatTag::VarLen(kind) => {
            let source = source.ok_or_else(|| {
                eyre!("variable-length column {} has no backing heap source", col.name)
            })?;
            decode_varlen(rows, col, kind, heap_base, source, field)
        }
        FormatTag::AsciiText | FormatTag::BinaryString => {
            let mut texts = Vec::with_capacity(rows);
            for row in 0..rows {
                let text = std::str::from_utf8(field(row))
                    .map_err(|e| eyre!("invalid text in column {}: {}", col.name, e))?;
                texts.push(text.to_string());
            }
            Ok(LogicalColumn::Text(texts))
        }
        FormatTag::AsciiNumeric(kind) => decode_ascii_numeric(rows, col, kind, field),
        FormatTag::BinaryScaled(kind) => {
            if kind.is_integral() {
                let mut values = Vec::with_capacity(rows);
                for row in 0..rows {
                    values.push(read_int(kind, field(row)));
                }
                Ok(scale_ints(col, values))
            } else {
                let mut values = Vec::with_capacity(rows);
                for row in 0..rows {
                    values.push(apply_scaling(col, read_float(kind, field(row))));
                }
                Ok(LogicalColumn::Floats(values))
            }
        }
        FormatTag::BinaryBoolean => {
            let mut values = Vec::with_capacity(rows);
            for row in 0..rows {
                values.push(field(row)[0] == LOGICAL_TRUE);
            }
            Ok(LogicalColumn::Booleans(values))
        }
        FormatTag::BinaryPlain => {
            let mut bytes = Vec::with_capacity(rows * col.storage_width);
            for row in 0..rows {
                bytes.extend_from_slice(field(row));
            }
            Ok(LogicalColumn::Raw {
                width: col.storage_width,
                bytes,
            })
        }
    }
}

fn decode_varlen<'a>(
    rows: usize,
    col: &ColumnDescriptor,
    kind: ElementKind,
    heap_base: u64,
    source: &Arc<Mutex<dyn HeapSource>>,
    field: impl Fn(usize) -> &'a [u8],
) -> Result<LogicalColumn> {
    // Exclusive access to the source for the whole pass; each row still
    // gets its own positioned read.
    let mut source = source.lock();
    let elem_width = kind.width();
    let mut seqs = Vec::with_capacity(rows);

    for row in 0..rows {
        let desc = HeapDescriptor::parse(field(row))?;
        ensure!(
            desc.count() >= 0 && desc.offset() >= 0,
            "column {} row {} has a negative heap descriptor",
            col.name,
            row
        );
        let count = desc.count() as usize;

        let mut buf: SmallVec<[u8; 64]> = SmallVec::new();
        buf.resize(count * elem_width, 0);
        source
            .read_exact_at(heap_base + desc.offset() as u64, &mut buf)
            .wrap_err_with(|| format!("column {} row {} heap read", col.name, row))?;

        seqs.push(decode_sequence(col, kind, &buf, count));
    }
    Ok(LogicalColumn::VarLen(seqs))
}

fn decode_sequence(col: &ColumnDescriptor, kind: ElementKind, buf: &[u8], count: usize) -> VarSeq {
    let elem_width = kind.width();
    match kind {
        ElementKind::Char => VarSeq::Bytes(buf.to_vec()),
        ElementKind::Logical => {
            VarSeq::Booleans(buf.iter().map(|&b| b == LOGICAL_TRUE).collect())
        }
        _ if kind.is_integral() => {
            let values: Vec<i64> = (0..count)
                .map(|i| read_int(kind, &buf[i * elem_width..]))
                .collect();
            if col.is_scaled() {
                VarSeq::Floats(values.iter().map(|&v| apply_scaling(col, v as f64)).collect())
            } else {
                VarSeq::Ints(values)
            }
        }
        _ => VarSeq::Floats(
            (0..count)
                .map(|i| apply_scaling(col, read_float(kind, &buf[i * elem_width..])))
                .collect(),
        ),
    }
}

fn decode_ascii_numeric<'a>(
    rows: usize,
    col: &ColumnDescriptor,
    kind: ElementKind,
    field: impl Fn(usize) -> &'a [u8],
) -> Result<LogicalColumn> {
    let sentinel = col.null_sentinel.as_deref().map(str::trim);

    if kind.is_integral() {
        let mut values = Vec::with_capacity(rows);
        for row in 0..rows {
            let text = std::str::from_utf8(field(row))
                .map_err(|e| eyre!("invalid text in column {}: {}", col.name, e))?;
            if sentinel == Some(text.trim()) {
                values.push(TEXT_NULL_INT);
                continue;
            }
            let value = text
                .trim()
                .parse::<i64>()
                .wrap_err_with(|| format!("column {} row {}: '{}'", col.name, row, text.trim()))?;
            values.push(value);
        }
        Ok(scale_ints(col, values))
    } else {
        let mut values = Vec::with_capacity(rows);
        for row in 0..rows {
            let text = std::str::from_utf8(field(row))
                .map_err(|e| eyre!("invalid text in column {}: {}", col.name, e))?;
            if sentinel == Some(text.trim()) {
                values.push(TEXT_NULL_FLOAT);
                continue;
            }
            let normalized = ascii::normalize_exponent(text);
            let value = normalized
                .trim()
                .parse::<f64>()
                .wrap_err_with(|| format!("column {} row {}: '{}'", col.name, row, text.trim()))?;
            values.push(apply_scaling(col, value));
        }
        Ok(LogicalColumn::Floats(values))
    }
}

/// Scaled integer columns promote to double precision; unscaled ones stay
/// integral.
fn scale_ints(col: &ColumnDescriptor, values: Vec<i64>) -> LogicalColumn {
    if col.is_scaled() {
        LogicalColumn::Floats(values.iter().map(|&v| apply_scaling(col, v as f64)).collect())
    } else {
        LogicalColumn::Ints(values)
    }
}

fn apply_scaling(col: &ColumnDescriptor, mut value: f64) -> f64 {
    if let Some(scale) = col.effective_scale() {
        value *= scale;
    }
    if let Some(zero) = col.effective_zero() {
        value += zero;
    }
    value
}

fn read_int(kind: ElementKind, bytes: &[u8]) -> i64 {
    match kind {
        ElementKind::Byte | ElementKind::Logical | ElementKind::Char => bytes[0] as i64,
        ElementKind::Int16 => i16::from_be_bytes([bytes[0], bytes[1]]) as i64,
        ElementKind::Int32 => i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64,
        ElementKind::Int64 => i64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]),
        ElementKind::Float32 | ElementKind::Float64 => unreachable!("not an integer kind"),
    }
}

fn read_float(kind: ElementKind, bytes: &[u8]) -> f64 {
    match kind {
        ElementKind::Float32 => {
            f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
        }
        ElementKind::Float64 => f64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]),
        _ => unreachable!("not a float kind"),
    }
}
