//! Backing-memory access trait.
//!
//! This module defines the `PhysMemory` trait through which the radix page-table
//! walker loads descriptors. It provides:
//! 1. **Access:** A single little-endian 64-bit physical read, the only primitive a walk needs.
//! 2. **Forwarding:** A blanket implementation for `&mut T` so callers can lend their bus.
//!
//! The simulated CPUs may share backing memory, but the MMU state that walks it is
//! always private to one CPU.

/// Physical memory as seen by the page-table walker.
pub trait PhysMemory {
    /// Reads eight bytes (little-endian) at the given physical address.
    fn read_u64(&mut self, paddr: u64) -> u64;
}

impl<T: PhysMemory + ?Sized> PhysMemory for &mut T {
    #[inline]
    fn read_u64(&mut self, paddr: u64) -> u64 {
        <T as PhysMemory>::read_u64(&mut **self, paddr)
    }
}
