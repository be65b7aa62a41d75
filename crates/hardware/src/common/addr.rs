//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses so the
//! two sides of a translation cannot be mixed up. It provides the following:
//! 1. **Type Safety:** Distinguishes simulated-program addresses from backing-memory addresses.
//! 2. **Page Arithmetic:** Page number and offset extraction for an arbitrary page size.
//! 3. **Formatting:** Hexadecimal `Display` for log and fault messages.

use std::fmt;

/// A virtual address issued by the simulated program.
///
/// Virtual addresses must be translated by the active MMU design (or passed
/// through directly) before they may be used to access backing memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address in the simulated system's backing address space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the page number of this address for a page of `1 << page_shift` bytes.
    #[inline(always)]
    pub const fn page_number(self, page_shift: u32) -> u64 {
        self.0 >> page_shift
    }

    /// Returns the byte offset of this address within a page of `1 << page_shift` bytes.
    #[inline(always)]
    pub const fn page_offset(self, page_shift: u32) -> u64 {
        self.0 & ((1u64 << page_shift) - 1)
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the page number of this address for a page of `1 << page_shift` bytes.
    #[inline(always)]
    pub const fn page_number(self, page_shift: u32) -> u64 {
        self.0 >> page_shift
    }
}

impl fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
