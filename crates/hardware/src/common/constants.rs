//! Global translation constants.
//!
//! This module defines constants shared by both MMU designs and the
//! fast-path translation cache. It includes:
//! 1. **Cache Granularity:** Page size used by the fast-path cache.
//! 2. **Address Ranges:** The legacy MMU's translated window.
//! 3. **Descriptor Geometry:** Size of a radix page-table entry.

/// Page shift of the fast-path translation cache (4 KiB).
///
/// Both MMU designs map at least 4 KiB contiguously, so caching at this
/// granularity never merges two distinct mappings.
pub const CACHE_PAGE_SHIFT: u32 = 12;

/// Page size of the fast-path translation cache in bytes.
pub const CACHE_PAGE_SIZE: u64 = 1 << CACHE_PAGE_SHIFT;

/// Start of the legacy MMU's translated window (inclusive).
pub const LEGACY_MMU_VA_START: u64 = 0x0000_0000;

/// End of the legacy MMU's translated window (exclusive).
pub const LEGACY_MMU_VA_END: u64 = 0x8000_0000;

/// Size of one radix page-table entry in bytes.
pub const PTE_SIZE: u64 = 8;

/// Default number of fast-path translation cache entries.
pub const DEFAULT_TRANSLATION_CACHE_SIZE: usize = 256;

/// Default legacy MMU page size selector (log2 of the page size, 8 KiB).
pub const DEFAULT_LEGACY_PAGE_BITS: u8 = 13;
