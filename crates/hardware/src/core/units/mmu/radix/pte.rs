//! Radix page-table entry decoding.
//!
//! This module wraps the raw 64-bit descriptors loaded during a walk. It provides:
//! 1. **Classification:** Table, block, and page descriptors at a given level.
//! 2. **Table Overrides:** The five restriction flags a table descriptor imposes on
//!    everything reachable beneath it.
//! 3. **Capabilities:** The read/write/execute mask a terminal descriptor grants
//!    under a given privilege and accumulated override set.
//!
//! Layout of a terminal (block/page) descriptor:
//!
//! | Bits   | Field                                  |
//! |--------|----------------------------------------|
//! | 0      | Valid                                  |
//! | 1      | Type (1 = table/page, 0 = block)       |
//! | 6      | User accessible (clear = kernel only)  |
//! | 7      | Read only                              |
//! | 10     | Access flag                            |
//! | 53     | Kernel execute-never                   |
//! | 54     | User execute-never                     |
//!
//! Table descriptors carry their restrictions in bits 59-63.

use std::fmt;

use bitflags::bitflags;

use crate::common::Permissions;
use crate::core::arch::mode::Privilege;

/// Valid bit.
const PTE_VALID: u64 = 1 << 0;

/// Type bit.
const PTE_TYPE: u64 = 1 << 1;

/// User-accessible bit.
const PTE_USER: u64 = 1 << 6;

/// Read-only bit.
const PTE_READ_ONLY: u64 = 1 << 7;

/// Access flag.
const PTE_ACCESS_FLAG: u64 = 1 << 10;

/// Kernel execute-never bit.
const PTE_KERNEL_XN: u64 = 1 << 53;

/// User execute-never bit.
const PTE_USER_XN: u64 = 1 << 54;

/// Shift of the table-attribute field.
const TBL_ATTR_SHIFT: u32 = 59;

/// Table attribute: kernel execute-never for the subtree.
const TBL_ATTR_KERNEL_XN: u64 = 0x1;

/// Table attribute: user execute-never for the subtree.
const TBL_ATTR_USER_XN: u64 = 0x2;

/// Shift of the two-bit access-permission field inside the table attributes.
const TBL_ATTR_AP_SHIFT: u32 = 2;

bitflags! {
    /// Restrictions accumulated from the table descriptors along a walk.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TableOverrides: u8 {
        /// Kernel-mode fetches are forbidden.
        const KERNEL_XN = 1 << 0;
        /// User-mode fetches are forbidden.
        const USER_XN = 1 << 1;
        /// User-mode reads and writes are forbidden.
        const NO_USER_RW = 1 << 2;
        /// Writes are forbidden at every privilege.
        const NO_WRITE = 1 << 3;
        /// User mode may not access the subtree at all.
        const NO_USER_MODE = 1 << 4;
    }
}

/// Shape of a descriptor once it has passed the validity check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Points to the next-level table.
    Table,
    /// Terminal mapping above the last level.
    Block,
    /// Terminal mapping at the last level.
    Page,
}

/// A raw radix page-table entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pte(u64);

impl Pte {
    /// Wraps a raw descriptor.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw descriptor.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns true if the valid bit is set.
    pub const fn is_valid(self) -> bool {
        self.0 & PTE_VALID != 0
    }

    /// Classifies a descriptor at `level` of a walk whose last level is `last_level`.
    ///
    /// Only meaningful for descriptors that passed the profile validity check.
    pub const fn kind(self, level: usize, last_level: usize) -> DescriptorKind {
        if self.0 & PTE_TYPE == 0 {
            DescriptorKind::Block
        } else if level == last_level {
            DescriptorKind::Page
        } else {
            DescriptorKind::Table
        }
    }

    /// Returns true if the access flag is set.
    pub const fn access_flag(self) -> bool {
        self.0 & PTE_ACCESS_FLAG != 0
    }

    /// Returns true if the mapping is reachable from kernel mode only.
    pub const fn is_kernel_only(self) -> bool {
        self.0 & PTE_USER == 0
    }

    /// Returns true if the mapping forbids writes.
    pub const fn is_read_only(self) -> bool {
        self.0 & PTE_READ_ONLY != 0
    }

    /// Returns true if kernel-mode fetches are forbidden.
    pub const fn kernel_execute_never(self) -> bool {
        self.0 & PTE_KERNEL_XN != 0
    }

    /// Returns true if user-mode fetches are forbidden.
    pub const fn user_execute_never(self) -> bool {
        self.0 & PTE_USER_XN != 0
    }

    /// Decodes the restrictions a table descriptor imposes on its subtree.
    pub fn table_overrides(self) -> TableOverrides {
        let attrs = self.0 >> TBL_ATTR_SHIFT;
        let mut overrides = TableOverrides::empty();
        if attrs & TBL_ATTR_KERNEL_XN != 0 {
            overrides |= TableOverrides::KERNEL_XN;
        }
        if attrs & TBL_ATTR_USER_XN != 0 {
            overrides |= TableOverrides::USER_XN;
        }
        match (attrs >> TBL_ATTR_AP_SHIFT) & 0x3 {
            1 => overrides |= TableOverrides::NO_USER_MODE,
            2 => overrides |= TableOverrides::NO_WRITE,
            3 => overrides |= TableOverrides::NO_USER_RW,
            _ => {}
        }
        overrides
    }

    /// Computes the capability mask of a terminal descriptor.
    ///
    /// This mask is the only input to the protection check.
    pub fn permissions(self, overrides: TableOverrides, privilege: Privilege) -> Permissions {
        let mut perms = Permissions::all();
        let user = privilege.is_user();

        if self.is_read_only() || overrides.contains(TableOverrides::NO_WRITE) {
            perms.remove(Permissions::WRITE);
        }

        if user {
            if self.user_execute_never() || overrides.contains(TableOverrides::USER_XN) {
                perms.remove(Permissions::EXEC);
            }
            if overrides.contains(TableOverrides::NO_USER_RW) {
                perms.remove(Permissions::READ | Permissions::WRITE);
            }
            if self.is_kernel_only() || overrides.contains(TableOverrides::NO_USER_MODE) {
                perms = Permissions::empty();
            }
        } else if self.kernel_execute_never() || overrides.contains(TableOverrides::KERNEL_XN) {
            perms.remove(Permissions::EXEC);
        }

        perms
    }
}

impl fmt::Display for Pte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
