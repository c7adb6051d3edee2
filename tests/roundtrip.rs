//! End-to-end decode / mutate / scale-back / redecode over the public API.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use astrotab::{
    ColumnDescriptor, ColumnSet, ElementKind, FileHeap, FormatTag, HeapSource, MemoryHeap,
    TableKind, TableRecordArray, Value, VarSeq,
};

fn survey_columns() -> ColumnSet {
    ColumnSet::new(
        TableKind::Binary,
        vec![
            ColumnDescriptor::new("id", FormatTag::BinaryScaled(ElementKind::Int32), 4),
            ColumnDescriptor::new("flux", FormatTag::BinaryScaled(ElementKind::Int16), 2)
                .with_scaling(0.25, 100.0),
            ColumnDescriptor::new("ok", FormatTag::BinaryBoolean, 1),
            ColumnDescriptor::new("flags", FormatTag::Bit(5), 1),
            ColumnDescriptor::new("trace", FormatTag::VarLen(ElementKind::Float32), 8),
            ColumnDescriptor::new("tag", FormatTag::BinaryString, 4),
        ],
    )
    .unwrap()
}

/// Three rows of raw storage plus the heap bytes they reference.
fn survey_rows() -> (Vec<u8>, Vec<u8>) {
    let traces: [&[f32]; 3] = [&[1.0, 2.0], &[], &[0.5, 0.25, 0.125]];
    let mut heap = Vec::new();
    let mut descriptors = Vec::new();
    for trace in traces {
        descriptors.push((trace.len() as i32, heap.len() as i32));
        for v in trace {
            heap.extend_from_slice(&v.to_be_bytes());
        }
    }

    let mut raw = Vec::new();
    for (row, (id, flux, ok, flags, tag)) in [
        (7i32, 8i16, b'T', 0b10110_000u8, *b"alph"),
        (8, -4, b'F', 0b00001_000, *b"beta"),
        (9, 0, b'T', 0b11111_000, *b"gamm"),
    ]
    .into_iter()
    .enumerate()
    {
        raw.extend_from_slice(&id.to_be_bytes());
        raw.extend_from_slice(&flux.to_be_bytes());
        raw.push(ok);
        raw.push(flags);
        raw.extend_from_slice(&descriptors[row].0.to_be_bytes());
        raw.extend_from_slice(&descriptors[row].1.to_be_bytes());
        raw.extend_from_slice(&tag);
    }
    (raw, heap)
}

fn open_table(raw: Vec<u8>, heap: Vec<u8>) -> TableRecordArray {
    let source: Arc<Mutex<dyn HeapSource>> = Arc::new(Mutex::new(MemoryHeap::new(heap)));
    TableRecordArray::new(raw, survey_columns())
        .unwrap()
        .with_heap(0, source)
}

#[test]
fn every_format_roundtrips_unchanged() {
    let (raw, heap) = survey_rows();
    let table = open_table(raw.clone(), heap);

    for name in ["id", "flux", "ok", "flags", "trace", "tag"] {
        table.field(name).unwrap();
    }
    table.scale_back().unwrap();

    assert_eq!(table.raw_bytes(), raw);
    // 2 + 0 + 3 float32 elements in the heap.
    assert_eq!(table.heap_size(), 20);
}

#[test]
fn decoded_values_are_physical() {
    let (raw, heap) = survey_rows();
    let table = open_table(raw, heap);

    let row = table.get_row(0).unwrap();
    assert_eq!(row.get("id").unwrap(), Value::Int(7));
    assert_eq!(row.get("flux").unwrap(), Value::Float(102.0));
    assert_eq!(row.get("ok").unwrap(), Value::Bool(true));
    assert_eq!(
        row.get("flags").unwrap(),
        Value::Bits(vec![true, false, true, true, false])
    );
    assert_eq!(
        row.get("trace").unwrap(),
        Value::Seq(VarSeq::Floats(vec![1.0, 2.0]))
    );
    assert_eq!(row.get("tag").unwrap(), Value::Text("alph".into()));
}

#[test]
fn mutations_survive_scale_back_and_redecode() {
    let (raw, heap) = survey_rows();
    let table = open_table(raw, heap.clone());

    let row = table.get_row(1).unwrap();
    row.set("flux", Value::Float(50.0)).unwrap();
    row.set("ok", Value::Bool(true)).unwrap();
    row.set("tag", Value::Text("delt".into())).unwrap();
    table.scale_back().unwrap();

    let reopened = open_table(table.raw_bytes(), heap);
    let row = reopened.get_row(1).unwrap();
    assert_eq!(row.get("flux").unwrap(), Value::Float(50.0));
    assert_eq!(row.get("ok").unwrap(), Value::Bool(true));
    assert_eq!(row.get("tag").unwrap(), Value::Text("delt".into()));
}

#[test]
fn growing_a_varlen_row_changes_the_heap_layout() {
    let (raw, heap) = survey_rows();
    let table = open_table(raw, heap);

    table
        .get_row(1)
        .unwrap()
        .set("trace", Value::Seq(VarSeq::Floats(vec![9.0; 4])))
        .unwrap();
    table.scale_back().unwrap();

    // Lengths are now [2, 4, 3]: offsets 0, 8, 24 and 36 bytes total.
    assert_eq!(table.heap_size(), 36);
    let raw = table.raw_bytes();
    let stride = table.columns().row_stride();
    let descriptor_at = |row: usize| {
        let at = row * stride + 8;
        (
            i32::from_be_bytes(raw[at..at + 4].try_into().unwrap()),
            i32::from_be_bytes(raw[at + 4..at + 8].try_into().unwrap()),
        )
    };
    assert_eq!(descriptor_at(0), (2, 0));
    assert_eq!(descriptor_at(1), (4, 8));
    assert_eq!(descriptor_at(2), (3, 24));
}

#[test]
fn slices_of_slices_stay_consistent() {
    let (raw, heap) = survey_rows();
    let table = open_table(raw, heap);
    table.field("id").unwrap();

    let tail = table.slice_rows(1..3).unwrap();
    let last = tail.slice_rows(1..2).unwrap();

    assert_eq!(last.row_count(), 1);
    assert_eq!(last.get_row(0).unwrap().get("id").unwrap(), Value::Int(9));
    assert_eq!(last.get_row(0).unwrap().get("ok").unwrap(), Value::Bool(true));
}

#[test]
fn varlen_reads_work_from_a_heap_file() {
    let (raw, heap) = survey_rows();

    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&heap).unwrap();
    tmp.flush().unwrap();

    let source: Arc<Mutex<dyn HeapSource>> =
        Arc::new(Mutex::new(FileHeap::open(tmp.path()).unwrap()));
    let table = TableRecordArray::new(raw, survey_columns())
        .unwrap()
        .with_heap(0, source);

    let trace = table.get_row(2).unwrap().get("trace").unwrap();
    assert_eq!(trace, Value::Seq(VarSeq::Floats(vec![0.5, 0.25, 0.125])));
}
