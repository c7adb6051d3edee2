//! # Heap Access
//!
//! Variable-length columns keep their payloads in a byte arena (the heap)
//! appended after the fixed-width row region. Each cell of such a column
//! stores a [`HeapDescriptor`] — a `(count, byte_offset)` pair of big-endian
//! `i32`s — and the payload itself is fetched from a [`HeapSource`].
//!
//! ## Read discipline
//!
//! Every read is an explicit positioned read (`read_exact_at`): the decoder
//! never relies on sequential stream position, so rows can be fetched in any
//! order and repeatedly. Short reads and seek failures propagate as errors
//! and are never retried.
//!
//! ## Implementations
//!
//! | Type | Backing | Use |
//! |------|---------|-----|
//! | [`MemoryHeap`] | `Vec<u8>` | tests, fully-loaded tables |
//! | [`FileHeap`] | `std::fs::File` | deferred reads from an open table file |
//! | [`MmapHeap`] | `memmap2::Mmap` | large heaps without read syscalls |

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use eyre::{ensure, eyre, Result, WrapErr};
use zerocopy::big_endian::I32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::HEAP_DESCRIPTOR_WIDTH;

/// In-row descriptor of one variable-length cell: element count and byte
/// offset of the payload relative to the heap base.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct HeapDescriptor {
    count: I32,
    offset: I32,
}

impl HeapDescriptor {
    pub fn new(count: i32, offset: i32) -> Self {
        Self {
            count: I32::new(count),
            offset: I32::new(offset),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::read_from_bytes(&bytes[..HEAP_DESCRIPTOR_WIDTH])
            .map_err(|_| eyre!("heap descriptor requires {} bytes", HEAP_DESCRIPTOR_WIDTH))
    }

    pub fn store(&self, bytes: &mut [u8]) {
        bytes[..HEAP_DESCRIPTOR_WIDTH].copy_from_slice(self.as_bytes());
    }

    pub fn count(&self) -> i32 {
        self.count.get()
    }

    pub fn offset(&self) -> i32 {
        self.offset.get()
    }
}

/// A seek-and-read-exact primitive keyed by absolute byte offset. Must
/// support repeated independent positioned reads.
pub trait HeapSource: Send {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;
}

/// Heap held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHeap {
    bytes: Vec<u8>,
}

impl MemoryHeap {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl HeapSource for MemoryHeap {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let offset = offset as usize;
        ensure!(
            offset + buf.len() <= self.bytes.len(),
            "heap read of {} bytes at offset {} past end of {}-byte heap",
            buf.len(),
            offset,
            self.bytes.len()
        );
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }
}

/// Heap read from an open file with an explicit seek per read.
#[derive(Debug)]
pub struct FileHeap {
    file: File,
}

impl FileHeap {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())
            .wrap_err_with(|| format!("opening heap file {}", path.as_ref().display()))?;
        Ok(Self { file })
    }
}

impl HeapSource for FileHeap {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .wrap_err("seeking heap file")?;
        self.file
            .read_exact(buf)
            .wrap_err_with(|| format!("reading {} heap bytes at offset {}", buf.len(), offset))
    }
}

/// Memory-mapped heap.
#[derive(Debug)]
pub struct MmapHeap {
    map: memmap2::Mmap,
}

impl MmapHeap {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())
            .wrap_err_with(|| format!("opening heap file {}", path.as_ref().display()))?;
        // Safety: the map is read-only and the codec's contract gives it
        // exclusive access for the duration of a decode pass.
        let map = unsafe { memmap2::Mmap::map(&file) }.wrap_err("mapping heap file")?;
        Ok(Self { map })
    }
}

impl HeapSource for MmapHeap {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let offset = offset as usize;
        ensure!(
            offset + buf.len() <= self.map.len(),
            "heap read of {} bytes at offset {} past end of {}-byte map",
            buf.len(),
            offset,
            self.map.len()
        );
        buf.copy_from_slice(&self.map[offset..offset + buf.len()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn descriptor_roundtrips_big_endian() {
        let desc = HeapDescriptor::new(3, 24);
        let mut bytes = [0u8; HEAP_DESCRIPTOR_WIDTH];
        desc.store(&mut bytes);
        assert_eq!(bytes, [0, 0, 0, 3, 0, 0, 0, 24]);

        let parsed = HeapDescriptor::parse(&bytes).unwrap();
        assert_eq!(parsed.count(), 3);
        assert_eq!(parsed.offset(), 24);
    }

    #[test]
    fn memory_heap_reads_are_position_independent() {
        let mut heap = MemoryHeap::new((0u8..16).collect());

        let mut late = [0u8; 4];
        heap.read_exact_at(10, &mut late).unwrap();
        assert_eq!(late, [10, 11, 12, 13]);

        // An earlier offset after a later one must still work.
        let mut early = [0u8; 2];
        heap.read_exact_at(1, &mut early).unwrap();
        assert_eq!(early, [1, 2]);
    }

    #[test]
    fn memory_heap_short_read_fails() {
        let mut heap = MemoryHeap::new(vec![0u8; 4]);
        let mut buf = [0u8; 8];
        assert!(heap.read_exact_at(0, &mut buf).is_err());
    }

    #[test]
    fn file_heap_seeks_before_every_read() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&(0u8..32).collect::<Vec<_>>()).unwrap();
        tmp.flush().unwrap();

        let mut heap = FileHeap::open(tmp.path()).unwrap();
        let mut a = [0u8; 3];
        heap.read_exact_at(20, &mut a).unwrap();
        assert_eq!(a, [20, 21, 22]);
        let mut b = [0u8; 3];
        heap.read_exact_at(0, &mut b).unwrap();
        assert_eq!(b, [0, 1, 2]);
    }

    #[test]
    fn mmap_heap_reads() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"abcdefgh").unwrap();
        tmp.flush().unwrap();

        let mut heap = MmapHeap::open(tmp.path()).unwrap();
        let mut buf = [0u8; 2];
        heap.read_exact_at(4, &mut buf).unwrap();
        assert_eq!(&buf, b"ef");
    }
}
