//! Legacy TLB entry layout.
//!
//! A legacy TLB slot is a pair of 32-bit page descriptors.
//!
//! `PD0` (virtual side):
//!
//! | Bits  | Field                                                    |
//! |-------|----------------------------------------------------------|
//! | 0-7   | ASID (shared entries: match position in bits 0-5)        |
//! | 8     | G, global                                                |
//! | 9     | V, valid                                                 |
//! | 10    | SZ, super-page                                           |
//! | 11    | L, locked                                                |
//! | 12-30 | Virtual page number (masked by the page size)            |
//! | 31    | S, shared library                                        |
//!
//! `PD1` (physical side): bit 0 FC (cacheable), bits 1-3 user X/W/R, bits 4-6
//! kernel X/W/R, frame in the bits above the page offset.

use std::fmt;

use crate::common::Permissions;
use crate::core::arch::mode::Privilege;

/// PD0: address-space id.
pub const PD0_ASID: u32 = 0xff;
/// PD0: shared-library match position.
pub const PD0_ASID_MATCH: u32 = 0x3f;
/// PD0: global.
pub const PD0_G: u32 = 1 << 8;
/// PD0: valid.
pub const PD0_V: u32 = 1 << 9;
/// PD0: super-page size.
pub const PD0_SZ: u32 = 1 << 10;
/// PD0: locked.
pub const PD0_L: u32 = 1 << 11;
/// PD0: virtual page number field.
pub const PD0_VPN: u32 = 0x7fff_f000;
/// PD0: shared library.
pub const PD0_S: u32 = 1 << 31;

/// PD1: cacheable.
pub const PD1_FC: u32 = 1 << 0;
/// PD1: user execute.
pub const PD1_XU: u32 = 1 << 1;
/// PD1: user write.
pub const PD1_WU: u32 = 1 << 2;
/// PD1: user read.
pub const PD1_RU: u32 = 1 << 3;
/// PD1: kernel execute.
pub const PD1_XK: u32 = 1 << 4;
/// PD1: kernel write.
pub const PD1_WK: u32 = 1 << 5;
/// PD1: kernel read.
pub const PD1_RK: u32 = 1 << 6;

/// Virtual addresses never carry the top bit into a page number.
const VPN_ADDR_MASK: u32 = 0x7fff_ffff;

/// Page-size dependent masks for the legacy MMU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageGeometry {
    bits: u8,
}

impl PageGeometry {
    /// Creates the geometry for pages of `1 << bits` bytes.
    ///
    /// `bits` must lie in 12..=24; [`LegacyMmu::new`](super::LegacyMmu::new) checks it.
    pub const fn new(bits: u8) -> Self {
        Self { bits }
    }

    /// Returns log2 of the page size.
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Returns the page size in bytes.
    pub const fn size(self) -> u64 {
        1 << self.bits
    }

    /// Returns the mask selecting the page frame of a 32-bit address.
    pub const fn page_mask(self) -> u32 {
        !((1u32 << self.bits) - 1)
    }

    /// Virtual page number of an address or descriptor.
    pub const fn vpn(self, addr: u32) -> u32 {
        addr & self.page_mask() & VPN_ADDR_MASK
    }

    /// Physical frame of an address or descriptor.
    pub const fn pfn(self, addr: u32) -> u32 {
        addr & self.page_mask()
    }
}

/// One legacy TLB slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TlbEntry {
    /// Virtual-side descriptor.
    pub pd0: u32,
    /// Physical-side descriptor.
    pub pd1: u32,
}

impl TlbEntry {
    /// Creates an entry from its two descriptors.
    pub const fn new(pd0: u32, pd1: u32) -> Self {
        Self { pd0, pd1 }
    }

    /// Returns true if the valid bit is set.
    pub const fn is_valid(&self) -> bool {
        self.pd0 & PD0_V != 0
    }

    /// Returns true if the entry matches every address space.
    pub const fn is_global(&self) -> bool {
        self.pd0 & PD0_G != 0
    }

    /// Returns true if the entry belongs to a shared library.
    pub const fn is_shared(&self) -> bool {
        self.pd0 & PD0_S != 0
    }

    /// Returns true if the super-page bit is set.
    pub const fn is_super_page(&self) -> bool {
        self.pd0 & PD0_SZ != 0
    }

    /// Returns true if the locked bit is set.
    pub const fn is_locked(&self) -> bool {
        self.pd0 & PD0_L != 0
    }

    /// Returns the address-space id.
    pub const fn asid(&self) -> u8 {
        (self.pd0 & PD0_ASID) as u8
    }

    /// Returns the shared-library match position.
    pub const fn match_position(&self) -> u32 {
        self.pd0 & PD0_ASID_MATCH
    }

    /// Returns true if the page may be cached.
    pub const fn is_cacheable(&self) -> bool {
        self.pd1 & PD1_FC != 0
    }

    /// Returns true if this shared entry's match position is set in `sasid`.
    pub const fn matches_sasid(&self, sasid: u64) -> bool {
        (1u64 << self.match_position()) & sasid != 0
    }

    /// Returns the capability mask granted to `privilege`.
    pub fn permissions(&self, privilege: Privilege) -> Permissions {
        let (r, w, x) = if privilege.is_user() {
            (PD1_RU, PD1_WU, PD1_XU)
        } else {
            (PD1_RK, PD1_WK, PD1_XK)
        };
        let mut perms = Permissions::empty();
        perms.set(Permissions::READ, self.pd1 & r != 0);
        perms.set(Permissions::WRITE, self.pd1 & w != 0);
        perms.set(Permissions::EXEC, self.pd1 & x != 0);
        perms
    }

    /// Returns a `Display` adapter rendering the entry with page geometry `geom`.
    pub const fn describe(&self, geom: PageGeometry) -> EntryDescription {
        EntryDescription { entry: *self, geom }
    }
}

/// One-line rendering of a [`TlbEntry`].
///
/// Upper-case letters mark granted capabilities, lower-case absent ones.
#[derive(Clone, Copy, Debug)]
pub struct EntryDescription {
    entry: TlbEntry,
    geom: PageGeometry,
}

impl fmt::Display for EntryDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.entry;
        let flag = |set: bool, on: char, off: char| if set { on } else { off };
        write!(
            f,
            "pd0={:08x} vaddr={:#010x} {} {}{} asid={:02x} | pd1={:08x} paddr={:#010x} k:{}{}{} u:{}{}{} f:{}",
            e.pd0,
            self.geom.vpn(e.pd0),
            if e.is_super_page() { "sz1" } else { "sz0" },
            if e.is_valid() { "V" } else { "" },
            if e.is_global() { "g" } else { "" },
            e.asid(),
            e.pd1,
            self.geom.pfn(e.pd1),
            flag(e.pd1 & PD1_RK != 0, 'R', 'r'),
            flag(e.pd1 & PD1_WK != 0, 'W', 'w'),
            flag(e.pd1 & PD1_XK != 0, 'X', 'x'),
            flag(e.pd1 & PD1_RU != 0, 'R', 'r'),
            flag(e.pd1 & PD1_WU != 0, 'W', 'w'),
            flag(e.pd1 & PD1_XU != 0, 'X', 'x'),
            flag(e.is_cacheable(), 'C', 'c'),
        )
    }
}
