//! Fast-path translation cache.
//!
//! A direct-mapped cache of completed translations at 4 KiB granularity. It
//! stores the mapping between a virtual page (tagged with the requesting
//! privilege) and a physical page, along with the capability mask granted
//! for that page, so repeated accesses skip both the dispatcher and the active
//! MMU design.
//!
//! The cache holds derived state only. Any event that changes the mapping
//! function is reported as a [`CacheFlush`] and must be applied before the next
//! lookup is trusted.

use crate::common::{CACHE_PAGE_SHIFT, Permissions};
use crate::core::arch::mode::Privilege;

/// Cache invalidation requested by a register write or TLB command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheFlush {
    /// The mapping function did not change.
    Nothing,
    /// Drop every cached translation.
    All,
    /// Drop cached translations for every 4 KiB page overlapping `[start, start + len)`.
    Range {
        /// First virtual address of the range.
        start: u64,
        /// Length of the range in bytes.
        len: u64,
    },
}

/// A single cached translation.
#[derive(Clone, Copy, Debug, Default)]
struct CacheEntry {
    /// Virtual page number (tag).
    vpn: u64,
    /// Physical page number.
    ppn: u64,
    /// Privilege the translation was performed under (tag).
    privilege: Privilege,
    /// Capabilities granted for the page.
    perms: Permissions,
    /// Entry validity flag.
    valid: bool,
}

/// Direct-mapped translation cache.
#[derive(Clone, Debug)]
pub struct TranslationCache {
    /// Cache entries.
    entries: Vec<CacheEntry>,
    /// Mask used for indexing (size - 1).
    mask: usize,
}

impl TranslationCache {
    /// Creates a new cache with the specified size.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of entries (rounded up to the next power of two, minimum 2).
    pub fn new(size: usize) -> Self {
        let safe_size = size.max(2).next_power_of_two();

        Self {
            entries: vec![CacheEntry::default(); safe_size],
            mask: safe_size - 1,
        }
    }

    /// Returns the number of entries.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of valid entries.
    pub fn occupancy(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    #[inline(always)]
    fn index(&self, vpn: u64, privilege: Privilege) -> usize {
        ((vpn << 1) as usize | privilege.to_u8() as usize) & self.mask
    }

    /// Looks up a virtual page for `privilege`.
    ///
    /// # Returns
    ///
    /// `Some((ppn, perms))` if cached, otherwise `None`.
    #[inline(always)]
    pub fn lookup(&self, vpn: u64, privilege: Privilege) -> Option<(u64, Permissions)> {
        let entry = self.entries.get(self.index(vpn, privilege))?;

        if entry.valid && entry.vpn == vpn && entry.privilege == privilege {
            return Some((entry.ppn, entry.perms));
        }
        None
    }

    /// Inserts a translation, replacing whatever occupied its slot.
    pub fn insert(&mut self, vpn: u64, privilege: Privilege, ppn: u64, perms: Permissions) {
        let idx = self.index(vpn, privilege);
        if let Some(slot) = self.entries.get_mut(idx) {
            *slot = CacheEntry {
                vpn,
                ppn,
                privilege,
                perms,
                valid: true,
            };
        }
    }

    /// Flushes all entries.
    pub fn flush(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }

    /// Flushes every entry for pages overlapping `[start, start + len)`, at any privilege.
    pub fn flush_range(&mut self, start: u64, len: u64) {
        let first = start >> CACHE_PAGE_SHIFT;
        let last = start.saturating_add(len.max(1) - 1) >> CACHE_PAGE_SHIFT;
        if last - first >= self.entries.len() as u64 {
            self.flush();
            return;
        }
        for e in &mut self.entries {
            if e.valid && (first..=last).contains(&e.vpn) {
                e.valid = false;
            }
        }
    }

    /// Applies a flush request.
    ///
    /// # Returns
    ///
    /// `true` if anything was requested (the caller counts flushes).
    pub fn apply(&mut self, flush: CacheFlush) -> bool {
        match flush {
            CacheFlush::Nothing => false,
            CacheFlush::All => {
                self.flush();
                true
            }
            CacheFlush::Range { start, len } => {
                self.flush_range(start, len);
                true
            }
        }
    }
}
