//! Sparse physical memory.
//!
//! This module implements a lazily populated backing store for page tables. It provides:
//! 1. **Storage:** 4 KiB frames allocated on first write; unwritten memory reads as zero.
//! 2. **Access:** Byte and doubleword read/write at arbitrary (unaligned) physical addresses.
//! 3. **Walker Integration:** A [`PhysMemory`] implementation for the radix walker.

use std::collections::HashMap;

use crate::soc::traits::PhysMemory;

/// Frame granularity of the sparse store.
const FRAME_SHIFT: u32 = 12;

/// Frame size in bytes.
const FRAME_SIZE: usize = 1 << FRAME_SHIFT;

/// Sparse, zero-filled physical memory.
#[derive(Debug, Clone, Default)]
pub struct SparseMemory {
    frames: HashMap<u64, Box<[u8; FRAME_SIZE]>>,
}

impl SparseMemory {
    /// Creates an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of frames that have been written at least once.
    pub fn resident_frames(&self) -> usize {
        self.frames.len()
    }

    /// Reads one byte.
    pub fn read_u8(&self, paddr: u64) -> u8 {
        self.frames
            .get(&(paddr >> FRAME_SHIFT))
            .map_or(0, |frame| frame[Self::offset(paddr)])
    }

    /// Writes one byte.
    pub fn write_u8(&mut self, paddr: u64, val: u8) {
        let frame = self
            .frames
            .entry(paddr >> FRAME_SHIFT)
            .or_insert_with(|| Box::new([0; FRAME_SIZE]));
        frame[Self::offset(paddr)] = val;
    }

    /// Writes eight bytes (little-endian).
    pub fn write_u64(&mut self, paddr: u64, val: u64) {
        for (i, byte) in val.to_le_bytes().into_iter().enumerate() {
            self.write_u8(paddr.wrapping_add(i as u64), byte);
        }
    }

    /// Reads eight bytes (little-endian) without requiring mutable access.
    pub fn peek_u64(&self, paddr: u64) -> u64 {
        let mut bytes = [0u8; 8];
        for (i, slot) in bytes.iter_mut().enumerate() {
            *slot = self.read_u8(paddr.wrapping_add(i as u64));
        }
        u64::from_le_bytes(bytes)
    }

    /// Byte offset of `paddr` inside its frame.
    #[inline]
    const fn offset(paddr: u64) -> usize {
        (paddr as usize) & (FRAME_SIZE - 1)
    }
}

impl PhysMemory for SparseMemory {
    fn read_u64(&mut self, paddr: u64) -> u64 {
        self.peek_u64(paddr)
    }
}
