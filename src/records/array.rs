//! # Table Record Array
//!
//! `TableRecordArray` is the table-wide container: it owns a view into the
//! shared raw row arena, the column set, and the conversion cache (one
//! lazily-populated logical slot per column).
//!
//! ## Cache discipline
//!
//! A cache slot starts empty, meaning raw storage is authoritative for that
//! column. The first `field()` access decodes the column and fills the
//! slot; from then on the logical array is authoritative for this instance
//! until `scale_back()` regenerates raw storage from it. Unmaterialized
//! columns are never touched by `scale_back()`.
//!
//! Each slot sits behind its own `parking_lot::RwLock`, so first
//! population is populate-once even under concurrent `field()` calls; the
//! codec's contract is still single-writer (see the crate docs).
//!
//! ## Aliasing across views
//!
//! The raw arena is reference-counted: `slice_rows` produces a new array
//! whose buffer is a row-subrange view of the same bytes, with its own
//! cache seeded from the parent's materialized slots restricted to the
//! sliced rows. Writing raw storage through one view (`scale_back`) is
//! visible through every view sharing the arena; caches are per-instance
//! and do not alias.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use eyre::{ensure, eyre, Result};
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, Mutex, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};

use crate::columns::ColumnSet;
use crate::records::decode::decode_field;
use crate::records::encode::encode_field;
use crate::records::error::CodecError;
use crate::records::view::RecordView;
use crate::storage::HeapSource;
use crate::types::{LogicalColumn, Value};

/// Column selector: by name or by position.
#[derive(Debug, Clone, Copy)]
pub enum FieldKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for FieldKey<'a> {
    fn from(name: &'a str) -> Self {
        FieldKey::Name(name)
    }
}

impl<'a> From<&'a String> for FieldKey<'a> {
    fn from(name: &'a String) -> Self {
        FieldKey::Name(name)
    }
}

impl From<usize> for FieldKey<'_> {
    fn from(idx: usize) -> Self {
        FieldKey::Index(idx)
    }
}

/// Input to whole-row assignment: another record view (matched by column
/// name) or an ordered sequence of values (must cover every column).
pub enum RowSource<'a> {
    Record(&'a RecordView<'a>),
    Values(&'a [Value]),
}

pub struct TableRecordArray {
    buf: Arc<RwLock<Vec<u8>>>,
    row_start: usize,
    rows: usize,
    columns: ColumnSet,
    cache: Vec<RwLock<Option<LogicalColumn>>>,
    heap_base: u64,
    heap_size: RwLock<u64>,
    source: Option<Arc<Mutex<dyn HeapSource>>>,
}

impl TableRecordArray {
    /// Wraps a raw row buffer. The buffer length must be an exact multiple
    /// of the column set's row stride; the row count follows from it.
    pub fn new(buf: Vec<u8>, columns: ColumnSet) -> Result<Self> {
        let stride = columns.row_stride();
        ensure!(stride > 0, "column set has zero row stride");
        ensure!(
            buf.len() % stride == 0,
            "buffer length {} is not a multiple of the {}-byte row stride",
            buf.len(),
            stride
        );
        let rows = buf.len() / stride;
        let cache = (0..columns.column_count())
            .map(|_| RwLock::new(None))
            .collect();

        Ok(Self {
            buf: Arc::new(RwLock::new(buf)),
            row_start: 0,
            rows,
            columns,
            cache,
            heap_base: 0,
            heap_size: RwLock::new(0),
            source: None,
        })
    }

    /// Attaches the backing source for variable-length heap reads, with the
    /// byte offset of the heap base within that source.
    pub fn with_heap(mut self, heap_base: u64, source: Arc<Mutex<dyn HeapSource>>) -> Self {
        self.heap_base = heap_base;
        self.source = Some(source);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.column_count()
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Total heap bytes laid out by the last `scale_back` pass.
    pub fn heap_size(&self) -> u64 {
        *self.heap_size.read()
    }

    /// Copies out this instance's raw row bytes (for persistence).
    pub fn raw_bytes(&self) -> Vec<u8> {
        let stride = self.columns.row_stride();
        let buf = self.buf.read();
        buf[self.row_start * stride..(self.row_start + self.rows) * stride].to_vec()
    }

    fn resolve<'k>(&self, key: impl Into<FieldKey<'k>>) -> Result<usize> {
        match key.into() {
            FieldKey::Name(name) => self.columns.index_of(name),
            FieldKey::Index(idx) => {
                if idx < self.columns.column_count() {
                    Ok(idx)
                } else {
                    Err(CodecError::IndexOutOfRange {
                        index: idx,
                        len: self.columns.column_count(),
                    }
                    .into())
                }
            }
        }
    }

    /// Decode-on-first-use. Double-checked so concurrent callers populate
    /// the slot exactly once.
    fn materialize(&self, idx: usize) -> Result<()> {
        if self.cache[idx].read().is_some() {
            return Ok(());
        }
        let mut slot = self.cache[idx].write();
        if slot.is_none() {
            let stride = self.columns.row_stride();
            let buf = self.buf.read();
            let raw = &buf[self.row_start * stride..(self.row_start + self.rows) * stride];
            *slot = Some(decode_field(
                raw,
                self.rows,
                &self.columns,
                idx,
                self.heap_base,
                self.source.as_ref(),
            )?);
        }
        Ok(())
    }

    /// The full-column logical array, decoding it on first access.
    ///
    /// The returned guard holds a read lock on the column's cache slot;
    /// drop it before writing cells of the same column.
    pub fn field<'k>(
        &self,
        key: impl Into<FieldKey<'k>>,
    ) -> Result<MappedRwLockReadGuard<'_, LogicalColumn>> {
        let idx = self.resolve(key)?;
        self.materialize(idx)?;
        RwLockReadGuard::try_map(self.cache[idx].read(), |slot| slot.as_ref())
            .map_err(|_| eyre!("conversion cache slot {} empty after decode", idx))
    }

    fn field_mut(&self, idx: usize) -> Result<MappedRwLockWriteGuard<'_, LogicalColumn>> {
        self.materialize(idx)?;
        RwLockWriteGuard::try_map(self.cache[idx].write(), |slot| slot.as_mut())
            .map_err(|_| eyre!("conversion cache slot {} empty after decode", idx))
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row < self.rows {
            Ok(())
        } else {
            Err(CodecError::IndexOutOfRange {
                index: row,
                len: self.rows,
            }
            .into())
        }
    }

    pub(crate) fn cell(&self, col: usize, row: usize) -> Result<Value> {
        self.check_row(row)?;
        Ok(self.field(col)?.cell(row))
    }

    pub(crate) fn set_cell(&self, col: usize, row: usize, value: Value) -> Result<()> {
        self.check_row(row)?;
        self.field_mut(col)?.set_cell(row, value)
    }

    /// A windowed accessor onto one row, covering every column.
    pub fn get_row(&self, row: usize) -> Result<RecordView<'_>> {
        self.check_row(row)?;
        Ok(RecordView::whole_row(self, row))
    }

    /// Whole-row assignment. A record source is matched by column name and
    /// sets every field in its window; a value sequence must cover every
    /// column and is applied in index order.
    pub fn set_row(&self, row: usize, source: RowSource<'_>) -> Result<()> {
        self.check_row(row)?;
        match source {
            RowSource::Record(view) => {
                for (name, value) in view.entries()? {
                    let idx = self.columns.index_of(&name)?;
                    self.set_cell(idx, row, value)?;
                }
            }
            RowSource::Values(values) => {
                if values.len() != self.columns.column_count() {
                    return Err(CodecError::ArityMismatch {
                        expected: self.columns.column_count(),
                        got: values.len(),
                    }
                    .into());
                }
                for (idx, value) in values.iter().enumerate() {
                    self.set_cell(idx, row, value.clone())?;
                }
            }
        }
        Ok(())
    }

    /// Assigns consecutive rows starting at `start`, clamped to the row
    /// count: trailing source rows that fall past the end are ignored.
    pub fn set_rows(&self, start: usize, rows: &[Vec<Value>]) -> Result<()> {
        for (k, row_values) in rows.iter().enumerate() {
            let row = start + k;
            if row >= self.rows {
                break;
            }
            self.set_row(row, RowSource::Values(row_values))?;
        }
        Ok(())
    }

    /// A row-subrange view sharing the raw arena. Materialized cache slots
    /// are sliced into the new instance; unmaterialized columns stay lazy.
    pub fn slice_rows(&self, range: Range<usize>) -> Result<TableRecordArray> {
        ensure!(
            range.start <= range.end,
            "row range start {} is past its end {}",
            range.start,
            range.end
        );
        if range.end > self.rows {
            return Err(CodecError::IndexOutOfRange {
                index: range.end,
                len: self.rows,
            }
            .into());
        }

        let cache = self
            .cache
            .iter()
            .map(|slot| {
                RwLock::new(
                    slot.read()
                        .as_ref()
                        .map(|logical| logical.slice_rows(range.clone())),
                )
            })
            .collect();

        Ok(Self {
            buf: Arc::clone(&self.buf),
            row_start: self.row_start + range.start,
            rows: range.len(),
            columns: self.columns.clone(),
            cache,
            heap_base: self.heap_base,
            heap_size: RwLock::new(*self.heap_size.read()),
            source: self.source.clone(),
        })
    }

    /// Regenerates raw storage from every materialized logical column, in
    /// column order. Variable-length columns rebuild their heap layout
    /// against a running heap size that starts at zero each pass; the
    /// final total is available from [`heap_size`](Self::heap_size).
    ///
    /// Call this exactly once before persisting the raw buffer. Stops at
    /// the first layout error; columns already written in the pass are
    /// left as written.
    pub fn scale_back(&self) -> Result<()> {
        let stride = self.columns.row_stride();
        let mut buf = self.buf.write();
        let raw = &mut buf[self.row_start * stride..(self.row_start + self.rows) * stride];

        let mut heap_size = 0u64;
        for idx in 0..self.columns.column_count() {
            let slot = self.cache[idx].read();
            if let Some(logical) = slot.as_ref() {
                encode_field(raw, self.rows, &self.columns, idx, logical, &mut heap_size)?;
            }
        }
        drop(buf);
        *self.heap_size.write() = heap_size;
        Ok(())
    }
}

impl fmt::Debug for TableRecordArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableRecordArray")
            .field("rows", &self.rows)
            .field("columns", &self.columns.column_count())
            .field("row_start", &self.row_start)
            .finish()
    }
}
