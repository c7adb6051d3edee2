//! Backing storage for variable-length column payloads.

pub mod heap;

pub use heap::{FileHeap, HeapDescriptor, HeapSource, MemoryHeap, MmapHeap};
