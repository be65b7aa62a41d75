//! Radix page-table MMU.
//!
//! This module implements the multi-level hardware table walker generation of
//! the MMU. It provides:
//! 1. **Control State:** CTRL, TTBCR, two root pointers, and the fault-status scratch register.
//! 2. **Root Selection:** Picking root 0 or root 1 from the address's high bits.
//! 3. **Translation:** Table walk plus protection check against the derived capability mask.
//! 4. **Command Protocol:** Invalidation commands (all implemented as a full flush).
//!
//! Geometry is chosen once from a [`GeometryProfile`] and never changes.

/// Geometry profiles.
pub mod profile;

/// Page-table entry decoding.
pub mod pte;

/// Table walker.
pub mod ptw;

use tracing::{debug, warn};

use crate::common::{AccessKind, Fault, PhysAddr, RegisterError, TranslateResult, Translation};
use crate::core::arch::mode::Privilege;
use crate::core::units::mmu::regs::AuxReg;
use crate::core::units::mmu::tlb::CacheFlush;
use crate::soc::traits::PhysMemory;

use self::profile::{GeometryProfile, RootSelect, low_mask};
use self::ptw::page_table_walk;

/// CTRL: translation enabled.
pub const CTRL_ENABLE: u32 = 1 << 0;

/// CTRL: kernel/user mode bit.
pub const CTRL_KU: u32 = 1 << 1;

/// TTBCR: split-width field mask (per root).
const TTBCR_TNSZ_MASK: u32 = 0x1f;

/// TTBCR: shareability field shift (relative to the root's half).
const TTBCR_TNSH_SHIFT: u32 = 4;

/// TTBCR: ASID-select bit.
const TTBCR_A1: u32 = 1 << 15;

/// Shift of the ASID field in a root pointer.
const RTP_ASID_SHIFT: u32 = 48;

/// BUILD: version field (0x10).
const BUILD_VERSION: u64 = 0x10 << 24;

/// BUILD: shift of the profile type field.
const BUILD_TYPE_SHIFT: u32 = 21;

/// BUILD: instruction micro-TLB size code.
const BUILD_ITLB: u64 = 1 << 3;

/// BUILD: data micro-TLB size code.
const BUILD_DTLB: u64 = 2;

/// Radix TLB command values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RadixCommand {
    /// Invalidate every entry.
    InvalidateAll = 1,
    /// Read an entry back (not implemented).
    Read = 2,
    /// Invalidate entries of one ASID.
    InvalidateAsid = 3,
    /// Invalidate one address.
    InvalidateAddr = 4,
    /// Invalidate an address range.
    InvalidateRegion = 5,
    /// Invalidate an address range of one ASID.
    InvalidateRegionAsid = 6,
}

impl RadixCommand {
    /// Decodes a TLBCOMMAND value.
    pub const fn from_u64(val: u64) -> Option<Self> {
        match val {
            1 => Some(Self::InvalidateAll),
            2 => Some(Self::Read),
            3 => Some(Self::InvalidateAsid),
            4 => Some(Self::InvalidateAddr),
            5 => Some(Self::InvalidateRegion),
            6 => Some(Self::InvalidateRegionAsid),
            _ => None,
        }
    }
}

/// Radix MMU state owned by one simulated CPU.
#[derive(Clone, Debug)]
pub struct RadixMmu {
    profile: GeometryProfile,
    ctrl: u32,
    ttbcr: u32,
    rtp: [u64; 2],
    fault_status: u64,
}

impl RadixMmu {
    /// Creates a disabled MMU with the given geometry.
    pub const fn new(profile: GeometryProfile) -> Self {
        Self {
            profile,
            ctrl: 0,
            ttbcr: 0,
            rtp: [0; 2],
            fault_status: 0,
        }
    }

    /// Returns the geometry profile.
    pub const fn profile(&self) -> GeometryProfile {
        self.profile
    }

    /// Returns true if translation is enabled.
    pub const fn enabled(&self) -> bool {
        self.ctrl & CTRL_ENABLE != 0
    }

    /// Returns the CTRL.KU bit.
    pub const fn kernel_user(&self) -> bool {
        self.ctrl & CTRL_KU != 0
    }

    /// Returns the split width configured for `root`.
    pub const fn tnsz(&self, root: RootSelect) -> u32 {
        (self.ttbcr >> (root.index() as u32 * 16)) & TTBCR_TNSZ_MASK
    }

    /// Returns the shareability attribute configured for `root`.
    pub const fn tnsh(&self, root: RootSelect) -> u32 {
        (self.ttbcr >> (TTBCR_TNSH_SHIFT + root.index() as u32 * 16)) & 0x3
    }

    /// Returns the TTBCR.A1 bit.
    pub const fn a1(&self) -> bool {
        self.ttbcr & TTBCR_A1 != 0
    }

    /// Returns the raw root pointer register.
    pub const fn rtp(&self, root: RootSelect) -> u64 {
        self.rtp[root.index()]
    }

    /// Returns the ASID held in a root pointer.
    pub const fn asid(&self, root: RootSelect) -> u16 {
        (self.rtp[root.index()] >> RTP_ASID_SHIFT) as u16
    }

    /// Returns the level recorded by the last invalid-descriptor or access-flag fault.
    pub const fn fault_status(&self) -> u64 {
        self.fault_status
    }

    /// Returns the BUILD register value.
    pub const fn build(&self) -> u64 {
        BUILD_VERSION | (self.profile.build_type() << BUILD_TYPE_SHIFT) | BUILD_ITLB | BUILD_DTLB
    }

    /// Picks the root pointer covering `vaddr`, if any.
    ///
    /// A zero split width selects no high bits, so that root matches every address.
    pub fn select_root(&self, vaddr: u64) -> Option<RootSelect> {
        let width = self.profile.root_select_width();
        let addr = vaddr & low_mask(width);

        let high = |n: u32| if n == 0 { 0 } else { addr >> (width - n) };

        let t0 = self.tnsz(RootSelect::Root0);
        if high(t0) == 0 {
            return Some(RootSelect::Root0);
        }
        let t1 = self.tnsz(RootSelect::Root1);
        if high(t1) == low_mask(t1) {
            return Some(RootSelect::Root1);
        }
        None
    }

    /// Returns the physical base address of the table for `root`.
    pub const fn root_base(&self, root: RootSelect) -> u64 {
        self.profile
            .root_address(self.rtp(root), root, self.tnsz(root))
    }

    /// Translates `vaddr` by walking the page tables.
    ///
    /// Debug (`Irrelevant`) requests skip the protection check but still fault
    /// on an unresolvable root, an invalid descriptor, or a clear access flag.
    pub fn translate(
        &mut self,
        vaddr: u64,
        access: AccessKind,
        privilege: Privilege,
        mem: &mut dyn PhysMemory,
    ) -> TranslateResult {
        let Some(root) = self.select_root(vaddr) else {
            return Err(Fault::mmu_fault(access, false));
        };

        let walk = page_table_walk(
            self.profile,
            self.root_base(root),
            vaddr,
            access,
            privilege,
            mem,
        )
        .map_err(|fault| {
            self.fault_status = (fault.level() & 0x7) as u64;
            fault.to_fault(access)
        })?;

        if !matches!(access, AccessKind::Irrelevant) && !walk.perms.allows(access) {
            return Err(Fault::protection_violation(access));
        }

        Ok(Translation::new(PhysAddr::new(walk.paddr), walk.perms))
    }

    /// Executes a TLBCOMMAND write.
    pub fn command(&mut self, val: u64) -> CacheFlush {
        match RadixCommand::from_u64(val) {
            Some(RadixCommand::Read) => {
                warn!(target: "mmu", "TLB read command is not implemented for the radix MMU");
                CacheFlush::Nothing
            }
            Some(cmd) => {
                debug!(target: "mmu", ?cmd, "TLB flush");
                CacheFlush::All
            }
            None => {
                warn!(target: "mmu", command = val, "unknown radix TLB command ignored");
                CacheFlush::Nothing
            }
        }
    }

    /// Reads a control register.
    pub fn read_reg(&self, reg: AuxReg) -> Result<u64, RegisterError> {
        Ok(match reg {
            AuxReg::Build => self.build(),
            AuxReg::TlbCommand => 0,
            AuxReg::Rtp0 => self.rtp[0],
            AuxReg::Rtp0Hi => self.rtp[0] >> 32,
            AuxReg::Rtp1 => self.rtp[1],
            AuxReg::Rtp1Hi => self.rtp[1] >> 32,
            AuxReg::Ctrl => u64::from(self.ctrl),
            AuxReg::Ttbcr => u64::from(self.ttbcr),
            AuxReg::FaultStatus => self.fault_status,
            other => return Err(RegisterError::NotPresent(other.name(), "radix")),
        })
    }

    /// Writes a control register.
    ///
    /// # Returns
    ///
    /// The cache invalidation the write requires.
    pub fn write_reg(&mut self, reg: AuxReg, val: u64) -> Result<CacheFlush, RegisterError> {
        let flush = match reg {
            AuxReg::Build | AuxReg::FaultStatus => return Err(RegisterError::ReadOnly(reg.name())),
            AuxReg::TlbCommand => return Ok(self.command(val)),
            AuxReg::Rtp0 | AuxReg::Rtp1 => {
                let root = if reg == AuxReg::Rtp0 { 0 } else { 1 };
                let changed = self.rtp[root] != val;
                self.rtp[root] = val;
                changed
            }
            AuxReg::Rtp0Hi | AuxReg::Rtp1Hi => {
                let root = if reg == AuxReg::Rtp0Hi { 0 } else { 1 };
                let hi = val & 0xffff_ffff;
                let changed = (self.rtp[root] >> 32) != hi;
                self.rtp[root] = (self.rtp[root] & 0xffff_ffff) | (hi << 32);
                changed
            }
            AuxReg::Ctrl => {
                let val = val as u32;
                let changed = self.ctrl != val;
                self.ctrl = val;
                changed
            }
            AuxReg::Ttbcr => {
                let val = val as u32;
                let changed = self.ttbcr != val;
                self.ttbcr = val;
                changed
            }
            other => return Err(RegisterError::NotPresent(other.name(), "radix")),
        };

        if flush {
            debug!(target: "mmu", reg = reg.name(), val, "mapping register changed");
            Ok(CacheFlush::All)
        } else {
            Ok(CacheFlush::Nothing)
        }
    }

    /// Restores power-on state, keeping the geometry.
    pub fn reset(&mut self) {
        *self = Self::new(self.profile);
    }

    /// Clears the enable bit.
    pub fn disable(&mut self) {
        self.ctrl &= !CTRL_ENABLE;
    }
}
