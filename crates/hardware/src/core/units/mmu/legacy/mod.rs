//! Legacy set-associative MMU.
//!
//! This module implements the software-managed TLB generation of the MMU. It provides:
//! 1. **Storage:** 256 sets of 4 ways, each slot a [`TlbEntry`] descriptor pair,
//!    with a per-set round-robin victim cursor.
//! 2. **Matching:** Global, shared-library (SASID), and per-process (PID) entry matching.
//! 3. **Translation:** Hit, protection violation, TLB miss (with the `TLBPD0`
//!    pre-load side effect), or machine check on duplicate matches.
//! 4. **Register Surface:** PID/SASID, the page-descriptor scratch registers, and
//!    the command protocol (see [`command`]).

/// TLB command protocol.
pub mod command;

/// Descriptor layout.
pub mod entry;

use std::fmt::Write as _;

use tracing::debug;

use crate::common::constants::{LEGACY_MMU_VA_END, LEGACY_MMU_VA_START};
use crate::common::{
    AccessKind, ConfigError, Fault, PhysAddr, RegisterError, TranslateResult, Translation,
    VirtAddr,
};
use crate::config::{MAX_LEGACY_PAGE_BITS, MIN_LEGACY_PAGE_BITS};
use crate::core::arch::mode::Privilege;
use crate::core::units::mmu::regs::AuxReg;
use crate::core::units::mmu::tlb::CacheFlush;

use self::entry::{PD0_V, PageGeometry, TlbEntry};

/// Number of sets.
pub const N_SETS: usize = 256;

/// Number of ways per set.
pub const N_WAYS: usize = 4;

/// Total number of TLB slots.
pub const N_ENTRIES: usize = N_SETS * N_WAYS;

/// BUILD value before the page-size field is patched in.
const BUILD_BASE: u32 = 0x04e2_1a4a;

/// Shift of the BUILD page-size field.
const BUILD_PGSZ_SHIFT: u32 = 15;

/// PID: enable bit.
const PID_ENABLE: u32 = 1 << 31;

/// Legacy MMU state owned by one simulated CPU.
#[derive(Clone, Debug)]
pub struct LegacyMmu {
    geom: PageGeometry,
    entries: Vec<TlbEntry>,
    way_sel: Vec<u8>,

    enabled: bool,
    pid: u8,
    sasid0: u32,
    sasid1: u32,

    pd0: u32,
    pd1: u32,
    pd1_hi: u32,
    index: u32,
    cmd: u32,
    scratch_data0: u32,
}

impl LegacyMmu {
    /// Creates a disabled MMU with pages of `1 << page_bits` bytes and every slot invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PageSizeOutOfRange`] unless `page_bits` is in
    /// `MIN_LEGACY_PAGE_BITS..=MAX_LEGACY_PAGE_BITS`.
    pub fn new(page_bits: u8) -> Result<Self, ConfigError> {
        if !(MIN_LEGACY_PAGE_BITS..=MAX_LEGACY_PAGE_BITS).contains(&page_bits) {
            return Err(ConfigError::PageSizeOutOfRange(page_bits));
        }
        Ok(Self {
            geom: PageGeometry::new(page_bits),
            entries: vec![TlbEntry::default(); N_ENTRIES],
            way_sel: vec![0; N_SETS],
            enabled: false,
            pid: 0,
            sasid0: 0,
            sasid1: 0,
            pd0: 0,
            pd1: 0,
            pd1_hi: 0,
            index: 0,
            cmd: 0,
            scratch_data0: 0,
        })
    }

    /// Returns the page geometry.
    pub const fn geometry(&self) -> PageGeometry {
        self.geom
    }

    /// Returns true if translation is enabled (PID bit 31).
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the live process id.
    pub const fn pid(&self) -> u8 {
        self.pid
    }

    /// Returns the combined 64-bit shared-library mask.
    pub const fn sasid(&self) -> u64 {
        ((self.sasid1 as u64) << 32) | self.sasid0 as u64
    }

    /// Returns the TLBPD0 scratch register.
    pub const fn pd0(&self) -> u32 {
        self.pd0
    }

    /// Returns the TLBPD1 scratch register.
    pub const fn pd1(&self) -> u32 {
        self.pd1
    }

    /// Returns the TLBINDEX register.
    pub const fn tlb_index(&self) -> u32 {
        self.index
    }

    /// Returns the slot at `index` (`set * N_WAYS + way`).
    pub fn entry(&self, index: usize) -> Option<&TlbEntry> {
        self.entries.get(index)
    }

    /// Returns true if `vaddr` lies in the translated window.
    pub fn in_range(vaddr: u64) -> bool {
        (LEGACY_MMU_VA_START..LEGACY_MMU_VA_END).contains(&vaddr)
    }

    /// Returns the BUILD register value.
    pub const fn build(&self) -> u64 {
        let reg = (BUILD_BASE & !(0xf << BUILD_PGSZ_SHIFT))
            | ((self.geom.bits() as u32 - 9) << BUILD_PGSZ_SHIFT);
        reg as u64
    }

    /// Set selected by an address or descriptor.
    fn set_of(&self, addr: u32) -> usize {
        (self.geom.vpn(addr) >> self.geom.bits()) as usize & (N_SETS - 1)
    }

    /// Returns the round-robin victim of `set` and advances the cursor.
    fn next_victim(&mut self, set: usize) -> usize {
        let way = usize::from(self.way_sel[set]);
        self.way_sel[set] = ((way + 1) & (N_WAYS - 1)) as u8;
        set * N_WAYS + way
    }

    /// Returns true if `e` maps `vpn` in the live address space.
    fn translation_match(&self, e: &TlbEntry, vpn: u32) -> bool {
        if !e.is_valid() || self.geom.vpn(e.pd0) != vpn {
            return false;
        }
        if e.is_global() {
            true
        } else if e.is_shared() {
            e.matches_sasid(self.sasid())
        } else {
            e.asid() == self.pid
        }
    }

    /// Translates an in-range address.
    ///
    /// A miss advances the set's victim cursor and, for any request other than
    /// a debug one, pre-loads TLBPD0 with the missing page and the live PID.
    pub fn translate(
        &mut self,
        vaddr: u64,
        access: AccessKind,
        privilege: Privilege,
    ) -> TranslateResult {
        let quiet = matches!(access, AccessKind::Irrelevant);
        let va = vaddr as u32;
        let vpn = self.geom.vpn(va);
        let set = self.set_of(va);

        let mut found = None;
        let mut count = 0;
        for idx in set * N_WAYS..(set + 1) * N_WAYS {
            if self.translation_match(&self.entries[idx], vpn) {
                count += 1;
                found = Some(idx);
            }
        }

        if count > 1 {
            if !quiet {
                debug!(target: "mmu", vaddr = %VirtAddr::new(vaddr), count, "machine check: duplicate TLB matches");
            }
            return Err(Fault::machine_check());
        }

        let Some(idx) = found else {
            let _ = self.next_victim(set);
            if !quiet {
                self.pd0 = vpn | PD0_V | u32::from(self.pid);
                debug!(target: "mmu", vaddr = %VirtAddr::new(vaddr), %access, pid = self.pid, "TLB miss");
            }
            return Err(Fault::tlb_miss(access));
        };

        let entry = self.entries[idx];
        let perms = entry.permissions(privilege);
        if !perms.allows(access) {
            debug!(target: "mmu", vaddr = %VirtAddr::new(vaddr), %access, %privilege, pd0 = entry.pd0, pd1 = entry.pd1, "protection violation");
            return Err(Fault::protection_violation(access));
        }

        let paddr = u64::from(self.geom.pfn(entry.pd1) | (va & !self.geom.page_mask()));
        Ok(Translation::new(PhysAddr::new(paddr), perms))
    }

    /// Iterates over `(index, entry)` for every valid slot.
    pub fn valid_entries(&self) -> impl Iterator<Item = (usize, &TlbEntry)> + '_ {
        self.entries.iter().enumerate().filter(|(_, e)| e.is_valid())
    }

    /// Renders every valid slot, one line per entry.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (idx, e) in self.valid_entries() {
            let _ = writeln!(
                out,
                "set {:3} way {}: {}",
                idx / N_WAYS,
                idx % N_WAYS,
                e.describe(self.geom)
            );
        }
        out
    }

    /// Renders the valid slots of the set `vaddr` maps to.
    pub fn dump_set_for(&self, vaddr: u32) -> String {
        let set = self.set_of(vaddr);
        let mut out = String::new();
        for idx in set * N_WAYS..(set + 1) * N_WAYS {
            let e = &self.entries[idx];
            if e.is_valid() {
                let _ = writeln!(out, "set {set:3} way {}: {}", idx % N_WAYS, e.describe(self.geom));
            }
        }
        out
    }

    /// Reads a control register.
    pub fn read_reg(&self, reg: AuxReg) -> Result<u64, RegisterError> {
        let val = match reg {
            AuxReg::Build => return Ok(self.build()),
            AuxReg::TlbIndex => self.index,
            AuxReg::TlbPd0 => self.pd0,
            AuxReg::TlbPd1 => self.pd1,
            AuxReg::TlbPd1Hi => self.pd1_hi,
            AuxReg::ScratchData0 => self.scratch_data0,
            AuxReg::TlbCommand => self.cmd,
            AuxReg::Pid => (if self.enabled { PID_ENABLE } else { 0 }) | u32::from(self.pid),
            AuxReg::Sasid0 => self.sasid0,
            AuxReg::Sasid1 => self.sasid1,
            other => return Err(RegisterError::NotPresent(other.name(), "legacy")),
        };
        Ok(u64::from(val))
    }

    /// Writes a control register.
    ///
    /// # Returns
    ///
    /// The cache invalidation the write requires.
    pub fn write_reg(&mut self, reg: AuxReg, val: u64) -> Result<CacheFlush, RegisterError> {
        let val = val as u32;
        match reg {
            AuxReg::Build => return Err(RegisterError::ReadOnly(reg.name())),
            AuxReg::TlbCommand => return Ok(self.command(val)),
            AuxReg::TlbIndex => self.index = val,
            AuxReg::TlbPd0 => self.pd0 = val,
            AuxReg::TlbPd1 => self.pd1 = val,
            AuxReg::TlbPd1Hi => self.pd1_hi = val,
            AuxReg::ScratchData0 => self.scratch_data0 = val,
            AuxReg::Pid => {
                self.enabled = val & PID_ENABLE != 0;
                self.pid = (val & 0xff) as u8;
                debug!(target: "mmu", enabled = self.enabled, pid = self.pid, "PID written");
                return Ok(CacheFlush::All);
            }
            AuxReg::Sasid0 | AuxReg::Sasid1 => {
                let slot = if reg == AuxReg::Sasid0 {
                    &mut self.sasid0
                } else {
                    &mut self.sasid1
                };
                if *slot != val {
                    *slot = val;
                    debug!(target: "mmu", reg = reg.name(), val, "shared ASID mask changed");
                    return Ok(CacheFlush::All);
                }
            }
            other => return Err(RegisterError::NotPresent(other.name(), "legacy")),
        }
        Ok(CacheFlush::Nothing)
    }

    /// Restores power-on state, keeping the page geometry.
    pub fn reset(&mut self) {
        // The geometry was validated when `self` was built, so this cannot fail.
        if let Ok(fresh) = Self::new(self.geom.bits()) {
            *self = fresh;
        }
    }

    /// Clears the enable bit.
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}
