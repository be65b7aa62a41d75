//! Descriptor builders.
//!
//! Legacy helpers produce `(pd0, pd1)` words for the TLBPD registers; radix
//! helpers produce 64-bit table, block, and page entries.

use arcsim_mmu::core::units::mmu::legacy::entry::{
    PD0_G, PD0_S, PD0_V, PD0_VPN, PD1_FC, PD1_RK, PD1_RU, PD1_WK, PD1_WU, PD1_XK, PD1_XU,
};

// ══════════════════════════════════════════════════════════
// Legacy
// ══════════════════════════════════════════════════════════

/// Kernel read/write/execute.
pub const K_RWX: u32 = PD1_RK | PD1_WK | PD1_XK;

/// User read/write/execute.
pub const U_RWX: u32 = PD1_RU | PD1_WU | PD1_XU;

/// Kernel read/write only.
pub const K_RW: u32 = PD1_RK | PD1_WK;

/// Valid per-process PD0.
pub fn pd0(vaddr: u32, asid: u8) -> u32 {
    (vaddr & PD0_VPN) | PD0_V | u32::from(asid)
}

/// Valid global PD0.
pub fn pd0_global(vaddr: u32) -> u32 {
    (vaddr & PD0_VPN) | PD0_V | PD0_G
}

/// Valid shared-library PD0 with match position `position`.
pub fn pd0_shared(vaddr: u32, position: u8) -> u32 {
    (vaddr & PD0_VPN) | PD0_V | PD0_S | u32::from(position & 0x3f)
}

/// PD1 with frame `paddr` and capability bits `perms`.
pub fn pd1(paddr: u32, perms: u32) -> u32 {
    paddr | perms | PD1_FC
}

// ══════════════════════════════════════════════════════════
// Radix
// ══════════════════════════════════════════════════════════

/// Access flag.
pub const AF: u64 = 1 << 10;
/// User accessible.
pub const USER: u64 = 1 << 6;
/// Read only.
pub const RO: u64 = 1 << 7;
/// Kernel execute-never.
pub const KXN: u64 = 1 << 53;
/// User execute-never.
pub const UXN: u64 = 1 << 54;

/// Table attribute: kernel execute-never below.
pub const TBL_KXN: u64 = 1 << 59;
/// Table attribute: user execute-never below.
pub const TBL_UXN: u64 = 1 << 60;
/// Table attribute: no user mode below.
pub const TBL_NO_USER: u64 = 1 << 61;
/// Table attribute: no writes below.
pub const TBL_NO_WRITE: u64 = 2 << 61;
/// Table attribute: no user reads or writes below.
pub const TBL_NO_USER_RW: u64 = 3 << 61;

/// Table descriptor pointing at `next`.
pub fn table(next: u64) -> u64 {
    next | 0b11
}

/// Last-level page descriptor with the access flag set.
pub fn page(frame: u64, attrs: u64) -> u64 {
    frame | 0b11 | AF | attrs
}

/// Block descriptor with the access flag set.
pub fn block(frame: u64, attrs: u64) -> u64 {
    frame | 0b01 | AF | attrs
}
