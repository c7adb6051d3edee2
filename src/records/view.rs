//! # Record View
//!
//! `RecordView` is a lightweight, column-windowed lens onto one row of a
//! [`TableRecordArray`]. It never owns data: reads and writes delegate to
//! the owning array's per-column cell accessors, so there is no separate
//! commit step and a dropped view loses nothing.
//!
//! A view can be re-windowed (`window`) without copying; window bounds
//! are relative to the current window and clamped to the column count.
//! Keys resolve in window terms: names must land inside the window,
//! positions are relative to its start.

use std::fmt;

use eyre::Result;

use crate::records::array::{FieldKey, TableRecordArray};
use crate::records::error::CodecError;
use crate::types::Value;

#[derive(Clone, Copy)]
pub struct RecordView<'a> {
    array: &'a TableRecordArray,
    row: usize,
    start: usize,
    end: usize,
}

impl<'a> RecordView<'a> {
    pub(crate) fn whole_row(array: &'a TableRecordArray, row: usize) -> Self {
        Self {
            array,
            row,
            start: 0,
            end: array.column_count(),
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Absolute column index of the window start.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute column index one past the window end.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of columns visible through the window.
    pub fn len(&self) -> usize {
        (self.end - self.start).min(self.array.column_count())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-windows the view over the same row without copying. Bounds are
    /// relative to the current window start and clamped to the column
    /// count, so `window(0, 1)` of a view starting at column 1 covers
    /// absolute column 1 only.
    pub fn window(&self, start: usize, end: usize) -> RecordView<'a> {
        let count = self.array.column_count();
        let start = (self.start + start).min(count);
        let end = (self.start + end).min(count).max(start);
        RecordView {
            array: self.array,
            row: self.row,
            start,
            end,
        }
    }

    fn resolve(&self, key: FieldKey<'_>) -> Result<usize> {
        match key {
            FieldKey::Name(name) => {
                let idx = self.array.columns().index_of(name)?;
                if idx < self.start || idx >= self.end {
                    return Err(CodecError::NameOutOfWindow {
                        name: name.to_string(),
                        start: self.start,
                        end: self.end,
                    }
                    .into());
                }
                Ok(idx)
            }
            FieldKey::Index(position) => {
                let idx = position + self.start;
                if idx >= self.end {
                    return Err(CodecError::PositionOutOfWindow {
                        position,
                        window: self.end - self.start,
                    }
                    .into());
                }
                Ok(idx)
            }
        }
    }

    /// Reads one cell. Names resolve to absolute column indices and must
    /// fall inside the window; positions are window-relative.
    pub fn get<'k>(&self, key: impl Into<FieldKey<'k>>) -> Result<Value> {
        let idx = self.resolve(key.into())?;
        self.array.cell(idx, self.row)
    }

    /// Writes one cell through to the owning array.
    pub fn set<'k>(&self, key: impl Into<FieldKey<'k>>, value: Value) -> Result<()> {
        let idx = self.resolve(key.into())?;
        self.array.set_cell(idx, self.row, value)
    }

    /// Named-field read, window-checked like [`get`](Self::get).
    pub fn field(&self, name: &str) -> Result<Value> {
        self.get(name)
    }

    /// Named-field write, window-checked like [`set`](Self::set).
    pub fn set_field(&self, name: &str, value: Value) -> Result<()> {
        self.set(name, value)
    }

    /// In-window `(column name, value)` pairs in column order. Used for
    /// name-matched whole-row assignment.
    pub fn entries(&self) -> Result<Vec<(String, Value)>> {
        let columns = self.array.columns();
        let mut entries = Vec::with_capacity(self.end.saturating_sub(self.start));
        for idx in self.start..self.end {
            let name = columns.column(idx)?.name.clone();
            entries.push((name, self.array.cell(idx, self.row)?));
        }
        Ok(entries)
    }
}

impl fmt::Display for RecordView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, idx) in (self.start..self.end).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match self.array.cell(idx, self.row) {
                Ok(value) => write!(f, "{value}")?,
                Err(_) => write!(f, "<?>")?,
            }
        }
        write!(f, ")")
    }
}

impl fmt::Debug for RecordView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordView")
            .field("row", &self.row)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}
