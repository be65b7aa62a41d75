//! Radix page-table walker.
//!
//! This module performs the hardware table walk for the radix MMU. It implements:
//! 1. **Index Extraction:** Most-significant remaining address bits first, one field per level.
//! 2. **Descriptor Loads:** 64-bit entries read from backing memory at `base + 8 * index`.
//! 3. **Override Accumulation:** Table restrictions OR-ed into a running mask.
//! 4. **Termination:** Block/page descriptors end the walk, gated by the access flag.
//!
//! The walker never writes memory and never synthesizes descriptors.

use tracing::trace;

use crate::common::constants::PTE_SIZE;
use crate::common::{AccessKind, Fault, Permissions, PhysAddr};
use crate::core::arch::mode::Privilege;
use crate::soc::traits::PhysMemory;

use super::profile::{GeometryProfile, low_mask};
use super::pte::{DescriptorKind, Pte, TableOverrides};

/// A successful walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Walk {
    /// Translated physical address.
    pub paddr: u64,
    /// Capability mask of the terminal descriptor.
    pub perms: Permissions,
    /// Level at which the walk terminated.
    pub level: usize,
    /// Terminal descriptor.
    pub pte: Pte,
}

/// Why a walk stopped without a mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkFault {
    /// A descriptor failed the profile's validity rule.
    InvalidDescriptor {
        /// Level of the offending descriptor.
        level: usize,
    },
    /// A block/page descriptor had its access flag clear.
    AccessFlagClear {
        /// Level of the offending descriptor.
        level: usize,
    },
}

impl WalkFault {
    /// Returns the level the walk stopped at.
    pub const fn level(self) -> usize {
        match self {
            Self::InvalidDescriptor { level } | Self::AccessFlagClear { level } => level,
        }
    }

    /// Converts the walk failure into the fault delivered for an access of `kind`.
    pub fn to_fault(self, kind: AccessKind) -> Fault {
        Fault::mmu_fault(kind, matches!(self, Self::AccessFlagClear { .. }))
    }
}

/// Walks the tables rooted at `root` for `vaddr`.
///
/// `access` is used only to silence tracing for debug requests; protection is
/// checked by the caller against [`Walk::perms`].
pub fn page_table_walk(
    profile: GeometryProfile,
    root: u64,
    vaddr: u64,
    access: AccessKind,
    privilege: Privilege,
    mem: &mut dyn PhysMemory,
) -> Result<Walk, WalkFault> {
    let quiet = matches!(access, AccessKind::Irrelevant);
    let last = profile.last_level();
    let mut base = root;
    let mut overrides = TableOverrides::empty();

    for (level, &bits) in profile.level_bits().iter().enumerate() {
        let remaining = profile.remaining_bits(level);
        let index = (vaddr >> remaining) & low_mask(bits);
        let pte_addr = base.wrapping_add(PTE_SIZE * index);
        let pte = Pte::new(mem.read_u64(pte_addr));

        if !quiet {
            trace!(target: "mmu", level, index, pte_addr = %PhysAddr::new(pte_addr), %pte, "walk step");
        }

        if profile.rejects(pte.raw(), level) {
            return Err(WalkFault::InvalidDescriptor { level });
        }

        match pte.kind(level, last) {
            DescriptorKind::Table => {
                overrides |= pte.table_overrides();
                base = profile.next_table_address(pte.raw());
            }
            DescriptorKind::Block | DescriptorKind::Page => {
                if !pte.access_flag() {
                    return Err(WalkFault::AccessFlagClear { level });
                }
                let frame_mask = low_mask(profile.vaddr_bits()) & !low_mask(remaining);
                let paddr = (pte.raw() & frame_mask) | (vaddr & low_mask(remaining));
                return Ok(Walk {
                    paddr,
                    perms: pte.permissions(overrides, privilege),
                    level,
                    pte,
                });
            }
        }
    }

    // The last level either rejects the descriptor or yields a page.
    Err(WalkFault::InvalidDescriptor { level: last })
}
