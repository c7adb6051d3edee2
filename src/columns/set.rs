//! # Column Set
//!
//! `ColumnSet` is the ordered, name-indexed list of column descriptors for
//! one table. Construction validates per-format storage widths and fixes the
//! byte layout of a row:
//!
//! - Binary tables lay columns out back to back; each column's offset is the
//!   running sum of the preceding storage widths.
//! - Text tables place each column at its declared `ascii_start`; the row
//!   stride is the furthest column end. Gaps between columns are padding and
//!   overlaps are caught later, during encode.

use eyre::{bail, ensure, Result};
use hashbrown::HashMap;

use crate::columns::descriptor::{ColumnDescriptor, FormatTag, TableKind};
use crate::config::HEAP_DESCRIPTOR_WIDTH;
use crate::records::error::CodecError;

#[derive(Debug, Clone)]
pub struct ColumnSet {
    kind: TableKind,
    columns: Vec<ColumnDescriptor>,
    by_name: HashMap<String, usize>,
    offsets: Vec<usize>,
    row_stride: usize,
}

impl ColumnSet {
    pub fn new(kind: TableKind, columns: Vec<ColumnDescriptor>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(columns.len());
        let mut offsets = Vec::with_capacity(columns.len());
        let mut row_stride = 0usize;

        for (idx, col) in columns.iter().enumerate() {
            ensure!(
                by_name.insert(col.name.clone(), idx).is_none(),
                "duplicate column name: {}",
                col.name
            );
            Self::check_width(col)?;

            let offset = match kind {
                TableKind::Binary => {
                    let offset = row_stride;
                    row_stride += col.storage_width;
                    offset
                }
                TableKind::Text => {
                    let Some(start) = col.ascii_start else {
                        bail!("text-table column {} has no declared start", col.name);
                    };
                    row_stride = row_stride.max(start + col.storage_width);
                    start
                }
            };
            offsets.push(offset);
        }

        Ok(Self {
            kind,
            columns,
            by_name,
            offsets,
            row_stride,
        })
    }

    fn check_width(col: &ColumnDescriptor) -> Result<()> {
        match col.format {
            FormatTag::Bit(n) => ensure!(
                col.storage_width == n.div_ceil(8),
                "bit column {} declares {} bits but {} storage bytes",
                col.name,
                n,
                col.storage_width
            ),
            FormatTag::VarLen(_) => ensure!(
                col.storage_width == HEAP_DESCRIPTOR_WIDTH,
                "variable-length column {} must store an {}-byte heap descriptor",
                col.name,
                HEAP_DESCRIPTOR_WIDTH
            ),
            FormatTag::BinaryScaled(kind) => ensure!(
                col.storage_width == kind.width(),
                "column {} storage width {} does not match its element width {}",
                col.name,
                col.storage_width,
                kind.width()
            ),
            FormatTag::BinaryBoolean => ensure!(
                col.storage_width == 1,
                "boolean column {} must be one byte wide",
                col.name
            ),
            FormatTag::AsciiText
            | FormatTag::AsciiNumeric(_)
            | FormatTag::BinaryString
            | FormatTag::BinaryPlain => {
                ensure!(
                    col.storage_width > 0,
                    "column {} has zero storage width",
                    col.name
                )
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Result<&ColumnDescriptor> {
        self.columns.get(idx).ok_or_else(|| {
            CodecError::IndexOutOfRange {
                index: idx,
                len: self.columns.len(),
            }
            .into()
        })
    }

    /// Resolves a column name to its index.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.by_name.get(name).copied().ok_or_else(|| {
            CodecError::NameNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Byte offset of a column within a row.
    pub fn offset(&self, idx: usize) -> usize {
        self.offsets[idx]
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::descriptor::ElementKind;

    #[test]
    fn binary_layout_is_cumulative() {
        let set = ColumnSet::new(
            TableKind::Binary,
            vec![
                ColumnDescriptor::new("a", FormatTag::BinaryScaled(ElementKind::Int16), 2),
                ColumnDescriptor::new("b", FormatTag::BinaryScaled(ElementKind::Float64), 8),
                ColumnDescriptor::new("c", FormatTag::BinaryBoolean, 1),
            ],
        )
        .unwrap();

        assert_eq!(set.offset(0), 0);
        assert_eq!(set.offset(1), 2);
        assert_eq!(set.offset(2), 10);
        assert_eq!(set.row_stride(), 11);
    }

    #[test]
    fn text_layout_uses_declared_starts() {
        let set = ColumnSet::new(
            TableKind::Text,
            vec![
                ColumnDescriptor::new("a", FormatTag::AsciiNumeric(ElementKind::Int32), 6)
                    .with_ascii_start(0),
                ColumnDescriptor::new("b", FormatTag::AsciiText, 8).with_ascii_start(10),
            ],
        )
        .unwrap();

        assert_eq!(set.offset(0), 0);
        assert_eq!(set.offset(1), 10);
        assert_eq!(set.row_stride(), 18);
    }

    #[test]
    fn text_column_without_start_is_rejected() {
        let result = ColumnSet::new(
            TableKind::Text,
            vec![ColumnDescriptor::new("a", FormatTag::AsciiText, 8)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = ColumnSet::new(
            TableKind::Binary,
            vec![
                ColumnDescriptor::new("x", FormatTag::BinaryBoolean, 1),
                ColumnDescriptor::new("x", FormatTag::BinaryBoolean, 1),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn unknown_name_is_name_not_found() {
        let set = ColumnSet::new(
            TableKind::Binary,
            vec![ColumnDescriptor::new("x", FormatTag::BinaryBoolean, 1)],
        )
        .unwrap();

        let err = set.index_of("y").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::NameNotFound { .. })
        ));
    }

    #[test]
    fn bit_column_width_must_match_bit_count() {
        let result = ColumnSet::new(
            TableKind::Binary,
            vec![ColumnDescriptor::new("flags", FormatTag::Bit(11), 1)],
        );
        assert!(result.is_err());

        let set = ColumnSet::new(
            TableKind::Binary,
            vec![ColumnDescriptor::new("flags", FormatTag::Bit(11), 2)],
        );
        assert!(set.is_ok());
    }
}
