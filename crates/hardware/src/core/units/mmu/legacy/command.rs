//! Legacy TLB command protocol.
//!
//! Writing TLBCOMMAND acts on the TLB through the page-descriptor scratch
//! registers (TLBPD0/TLBPD1) and the index register (TLBINDEX):
//! 1. **WRITE / WRITENI:** Overwrite the slot named by TLBINDEX; flush all cached translations.
//! 2. **READ:** Copy the slot named by TLBINDEX back into TLBPD0/TLBPD1.
//! 3. **DELETE:** Invalidate every slot matching TLBPD0.
//! 4. **INSERT:** Invalidate matches, then write TLBPD0/TLBPD1 into the matched
//!    slot or the set's round-robin victim. Evicting a valid entry flushes all
//!    cached translations.
//!
//! Micro-TLBs are not modelled, so WRITENI behaves like WRITE and the
//! micro-TLB commands are logged no-ops.

use tracing::{debug, warn};

use crate::core::units::mmu::tlb::CacheFlush;

use super::entry::{PD0_V, TlbEntry};
use super::{LegacyMmu, N_ENTRIES, N_WAYS};

/// TLBINDEX: slot index field.
pub const TLBINDEX_INDEX: u32 = 0x1fff;

/// TLBINDEX: result-code field.
pub const TLBINDEX_RC: u32 = 0x7000_0000;

/// TLBINDEX: error / not-found bit.
pub const TLBINDEX_E: u32 = 0x8000_0000;

/// TLBINDEX value reported when a scan found nothing.
pub const TLBINDEX_NO_ENTRY: u32 = TLBINDEX_E;

/// Legacy TLBCOMMAND values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyCommand {
    /// Write TLBPD0/TLBPD1 to the indexed slot.
    Write = 1,
    /// Read the indexed slot into TLBPD0/TLBPD1.
    Read = 2,
    /// Look up the index of TLBPD0 (not implemented).
    GetIndex = 3,
    /// Probe for TLBPD0 (not implemented).
    Probe = 4,
    /// Write without invalidating micro-TLBs.
    WriteNi = 5,
    /// Invalidate micro-TLBs (not modelled).
    IvUtlb = 6,
    /// Insert TLBPD0/TLBPD1.
    Insert = 7,
    /// Delete entries matching TLBPD0.
    Delete = 8,
}

impl LegacyCommand {
    /// Decodes a TLBCOMMAND value.
    pub const fn from_u32(val: u32) -> Option<Self> {
        match val {
            1 => Some(Self::Write),
            2 => Some(Self::Read),
            3 => Some(Self::GetIndex),
            4 => Some(Self::Probe),
            5 => Some(Self::WriteNi),
            6 => Some(Self::IvUtlb),
            7 => Some(Self::Insert),
            8 => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Result of an INSERT/DELETE scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scan {
    /// Nothing matched; the set's victim slot.
    Miss(usize),
    /// Exactly one slot matched.
    Single(usize),
    /// Several slots matched and were invalidated; the set's victim slot.
    Multiple(usize),
}

impl LegacyMmu {
    /// Executes a TLBCOMMAND write.
    ///
    /// # Returns
    ///
    /// The cache invalidation the command requires.
    pub fn command(&mut self, val: u32) -> CacheFlush {
        self.cmd = val;
        match LegacyCommand::from_u32(val) {
            Some(LegacyCommand::Write | LegacyCommand::WriteNi) => self.cmd_write(),
            Some(LegacyCommand::Read) => {
                self.cmd_read();
                CacheFlush::Nothing
            }
            Some(LegacyCommand::Delete) => {
                let _ = self.scan_and_invalidate();
                self.page_flush()
            }
            Some(LegacyCommand::Insert) => {
                let scan = self.scan_and_invalidate();
                if self.cmd_insert(scan) {
                    CacheFlush::All
                } else {
                    self.page_flush()
                }
            }
            Some(cmd @ (LegacyCommand::GetIndex | LegacyCommand::Probe | LegacyCommand::IvUtlb)) => {
                warn!(target: "mmu", ?cmd, "legacy TLB command not implemented");
                CacheFlush::Nothing
            }
            None => {
                warn!(target: "mmu", command = val, "unknown legacy TLB command ignored");
                CacheFlush::Nothing
            }
        }
    }

    /// Resolves the slot named by TLBINDEX, flagging an out-of-range index.
    fn indexed_slot(&mut self) -> Option<usize> {
        let idx = (self.index & TLBINDEX_INDEX) as usize;
        if idx < N_ENTRIES {
            Some(idx)
        } else {
            warn!(target: "mmu", index = idx, "TLBINDEX out of range");
            self.index |= TLBINDEX_E;
            None
        }
    }

    fn cmd_write(&mut self) -> CacheFlush {
        let Some(idx) = self.indexed_slot() else {
            return CacheFlush::Nothing;
        };
        self.entries[idx] = TlbEntry::new(self.pd0, self.pd1);
        debug!(target: "mmu", index = idx, pd0 = self.pd0, pd1 = self.pd1, "TLB write");
        CacheFlush::All
    }

    fn cmd_read(&mut self) {
        let Some(idx) = self.indexed_slot() else {
            return;
        };
        let e = self.entries[idx];
        self.pd0 = e.pd0;
        self.pd1 = e.pd1;
        self.index &= !(TLBINDEX_E | TLBINDEX_RC);
        debug!(target: "mmu", index = idx, pd0 = e.pd0, pd1 = e.pd1, "TLB read");
    }

    /// Returns true if `e` matches the INSERT/DELETE key.
    ///
    /// A global entry is visible to every address space, so a global key or a
    /// global entry matches regardless of the shared bit and the ASID.
    fn command_match(&self, e: &TlbEntry, key: &TlbEntry) -> bool {
        let g = self.geom;
        if !e.is_valid()
            || g.vpn(e.pd0) != g.vpn(key.pd0)
            || e.is_super_page() != key.is_super_page()
        {
            return false;
        }
        if key.is_global() || e.is_global() {
            return true;
        }
        e.is_shared() == key.is_shared()
            && e.asid() == key.asid()
            && (!e.is_shared() || e.matches_sasid(self.sasid()))
    }

    /// Scans the set of TLBPD0 and invalidates every match.
    fn scan_and_invalidate(&mut self) -> Scan {
        let key = TlbEntry::new(self.pd0, self.pd1);
        let set = self.set_of(key.pd0);
        let matches: Vec<usize> = (set * N_WAYS..(set + 1) * N_WAYS)
            .filter(|&idx| self.command_match(&self.entries[idx], &key))
            .collect();

        for &idx in &matches {
            self.entries[idx].pd0 &= !PD0_V;
            debug!(target: "mmu", index = idx, pd0 = self.entries[idx].pd0, pd1 = self.entries[idx].pd1, "TLB delete");
        }

        match matches.as_slice() {
            [] => {
                self.index = TLBINDEX_NO_ENTRY;
                Scan::Miss(self.next_victim(set))
            }
            [idx] => {
                self.index = *idx as u32;
                Scan::Single(*idx)
            }
            [.., last] => {
                self.index = *last as u32;
                Scan::Multiple(self.next_victim(set))
            }
        }
    }

    /// Writes TLBPD0/TLBPD1 into the slot chosen by `scan`.
    ///
    /// Returns true if a valid entry for another page was evicted.
    fn cmd_insert(&mut self, scan: Scan) -> bool {
        if self.pd0 & PD0_V == 0 {
            self.index = TLBINDEX_NO_ENTRY;
            return false;
        }

        let slot = match scan {
            Scan::Miss(slot) | Scan::Single(slot) => {
                self.index |= slot as u32;
                slot
            }
            Scan::Multiple(slot) => {
                self.index = slot as u32;
                slot
            }
        };
        let evicted = self.entries[slot];
        self.entries[slot] = TlbEntry::new(self.pd0, self.pd1);
        if evicted.is_valid() {
            debug!(target: "mmu", index = slot, pd0 = evicted.pd0, pd1 = evicted.pd1, "TLB evict");
        }
        debug!(
            target: "mmu",
            index = slot,
            pid = self.pd0 & 0xff,
            vpn = self.geom.vpn(self.pd0),
            pfn = self.geom.pfn(self.pd1),
            "TLB insert"
        );
        evicted.is_valid()
    }

    /// Cached pages covering the legacy page named by TLBPD0.
    fn page_flush(&self) -> CacheFlush {
        CacheFlush::Range {
            start: u64::from(self.geom.vpn(self.pd0)),
            len: self.geom.size(),
        }
    }
}
