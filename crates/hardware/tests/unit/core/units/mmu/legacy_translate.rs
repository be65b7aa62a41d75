//! Legacy TLB Translation Tests.
//!
//! Verifies the matching rules and translation outcomes of the legacy MMU:
//! 1. **Round Trip:** INSERT then translate returns the inserted frame.
//! 2. **Protection:** Per-privilege capability bits gate access.
//! 3. **Matching:** Per-process, global, and shared-library entries.
//! 4. **Misses:** Fault kind and the TLBPD0 pre-load side effect.
//! 5. **Machine Check:** Duplicate matches are always fatal.

use arcsim_mmu::common::error::{EV_PROT_V, PROT_V_PARAM};
use arcsim_mmu::common::{AccessKind, FaultKind, Permissions, PhysAddr};
use arcsim_mmu::core::arch::mode::Privilege;
use arcsim_mmu::core::units::mmu::legacy::command::LegacyCommand;
use arcsim_mmu::core::units::mmu::legacy::entry::PD0_V;
use arcsim_mmu::core::units::mmu::regs::AuxReg;
use pretty_assertions::assert_eq;

use crate::common::descriptors::{K_RW, K_RWX, U_RWX, pd0, pd0_global, pd0_shared, pd1};
use crate::common::harness::LegacyContext;

// ══════════════════════════════════════════════════════════
// 1. Round trip
// ══════════════════════════════════════════════════════════

#[test]
fn insert_then_translate_returns_frame() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.insert(pd0(0x4000, 5), pd1(0x12_0000, K_RWX | U_RWX));

    let t = ctx
        .translate(0x4abc, AccessKind::Read, Privilege::User)
        .unwrap();
    assert_eq!(t.paddr, PhysAddr::new(0x12_0abc));
    assert_eq!(t.perms, Permissions::all());
}

#[test]
fn offset_spans_whole_page() {
    let mut ctx = LegacyContext::new().enabled(1);
    ctx.insert(pd0(0x2_0000, 1), pd1(0x40_0000, K_RWX));

    let t = ctx
        .translate(0x2_1ffc, AccessKind::Write, Privilege::Kernel)
        .unwrap();
    assert_eq!(t.paddr, PhysAddr::new(0x40_1ffc));
}

#[test]
fn small_pages_translate_at_4k_granularity() {
    let mut ctx = LegacyContext::with_page_bits(12).enabled(2);
    ctx.insert(pd0(0x5000, 2), pd1(0x7000, K_RWX));

    assert_eq!(
        ctx.translate(0x5008, AccessKind::Read, Privilege::Kernel)
            .unwrap()
            .paddr,
        PhysAddr::new(0x7008)
    );
    // The neighbouring 4 KiB page is not covered.
    assert_eq!(
        ctx.translate(0x4008, AccessKind::Read, Privilege::Kernel)
            .unwrap_err()
            .kind(),
        FaultKind::TlbMissData
    );
}

// ══════════════════════════════════════════════════════════
// 2. Protection
// ══════════════════════════════════════════════════════════

#[test]
fn kernel_only_page_rejects_user() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.insert(pd0(0x4000, 5), pd1(0x30_0000, K_RW));

    let fault = ctx
        .translate(0x4000, AccessKind::Read, Privilege::User)
        .unwrap_err();
    assert_eq!(fault.kind(), FaultKind::ProtectionViolation);
    assert_eq!(fault.number(), EV_PROT_V);
    assert_eq!(fault.parameter(), PROT_V_PARAM);

    let t = ctx
        .translate(0x4000, AccessKind::Read, Privilege::Kernel)
        .unwrap();
    assert_eq!(t.paddr, PhysAddr::new(0x30_0000));
    assert_eq!(t.perms, Permissions::READ | Permissions::WRITE);
}

#[test]
fn fetch_needs_execute_bit() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.insert(pd0(0x4000, 5), pd1(0x30_0000, K_RW));

    let fault = ctx
        .translate(0x4000, AccessKind::Fetch, Privilege::Kernel)
        .unwrap_err();
    assert_eq!(fault.kind(), FaultKind::ProtectionViolation);
    assert_eq!(fault.cause_code(), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Matching
// ══════════════════════════════════════════════════════════

#[test]
fn entry_of_another_process_misses() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.insert(pd0(0x4000, 5), pd1(0x30_0000, K_RWX));
    ctx.set_pid(6);

    let fault = ctx
        .translate(0x4000, AccessKind::Read, Privilege::Kernel)
        .unwrap_err();
    assert_eq!(fault.kind(), FaultKind::TlbMissData);
}

#[test]
fn global_entry_matches_every_process() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.insert(pd0_global(0xa000), pd1(0x50_0000, K_RWX));

    for pid in [0, 5, 200] {
        ctx.set_pid(pid);
        let t = ctx
            .translate(0xa010, AccessKind::Read, Privilege::Kernel)
            .unwrap();
        assert_eq!(t.paddr, PhysAddr::new(0x50_0010));
    }
}

#[test]
fn shared_entry_follows_sasid_mask() {
    let mut ctx = LegacyContext::new().enabled(9);
    ctx.write(1 << 3, AuxReg::Sasid0);
    ctx.insert(pd0_shared(0x8000, 3), pd1(0x60_0000, U_RWX));

    let t = ctx
        .translate(0x8000, AccessKind::Fetch, Privilege::User)
        .unwrap();
    assert_eq!(t.paddr, PhysAddr::new(0x60_0000));

    ctx.write(0, AuxReg::Sasid0);
    assert_eq!(
        ctx.translate(0x8000, AccessKind::Fetch, Privilege::User)
            .unwrap_err()
            .kind(),
        FaultKind::TlbMissInstruction
    );
}

#[test]
fn shared_entry_uses_high_mask_word() {
    let mut ctx = LegacyContext::new().enabled(1);
    ctx.write(1 << (40 - 32), AuxReg::Sasid1);
    ctx.insert(pd0_shared(0xc000, 40), pd1(0x70_0000, K_RWX));

    assert!(ctx
        .translate(0xc000, AccessKind::Read, Privilege::Kernel)
        .is_ok());
}

// ══════════════════════════════════════════════════════════
// 4. Misses
// ══════════════════════════════════════════════════════════

#[test]
fn miss_preloads_pd0() {
    let mut ctx = LegacyContext::new().enabled(5);

    let fault = ctx
        .translate(0x6123, AccessKind::Write, Privilege::Kernel)
        .unwrap_err();
    assert_eq!(fault.kind(), FaultKind::TlbMissData);
    assert_eq!(fault.cause_code(), 2);
    assert_eq!(ctx.read(AuxReg::TlbPd0), u64::from(0x6000 | PD0_V | 5));
}

#[test]
fn fetch_miss_is_instruction_side() {
    let mut ctx = LegacyContext::new().enabled(5);
    let fault = ctx
        .translate(0x6000, AccessKind::Fetch, Privilege::User)
        .unwrap_err();
    assert_eq!(fault.kind(), FaultKind::TlbMissInstruction);
}

#[test]
fn debug_miss_leaves_pd0_alone() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.write(0x1234, AuxReg::TlbPd0);

    assert_eq!(ctx.mmu.debug_translate(0x6000, &mut ctx.mem), None);
    assert_eq!(ctx.read(AuxReg::TlbPd0), 0x1234);
}

#[test]
fn probe_miss_still_preloads_pd0() {
    let mut ctx = LegacyContext::new().enabled(5);

    assert!(!ctx
        .mmu
        .probe(0x6000, AccessKind::Read, Privilege::Kernel, &mut ctx.mem));
    assert_eq!(ctx.read(AuxReg::TlbPd0), u64::from(0x6000 | PD0_V | 5));
}

#[test]
fn miss_then_insert_from_preloaded_pd0() {
    let mut ctx = LegacyContext::new().enabled(4);
    assert!(ctx
        .translate(0xe000, AccessKind::Read, Privilege::Kernel)
        .is_err());

    // A refill handler only has to supply PD1.
    ctx.write(u64::from(pd1(0x88_0000, K_RWX)), AuxReg::TlbPd1);
    ctx.command(LegacyCommand::Insert);

    let t = ctx
        .translate(0xe004, AccessKind::Read, Privilege::Kernel)
        .unwrap();
    assert_eq!(t.paddr, PhysAddr::new(0x88_0004));
}

// ══════════════════════════════════════════════════════════
// 5. Machine check
// ══════════════════════════════════════════════════════════

#[test]
fn duplicate_matches_raise_machine_check() {
    let mut ctx = LegacyContext::new().enabled(5);
    // 0x4000 with 8 KiB pages lands in set 2 (slots 8..12).
    ctx.write_slot(8, pd0(0x4000, 5), pd1(0x10_0000, K_RWX));
    ctx.write_slot(9, pd0(0x4000, 5), pd1(0x20_0000, K_RWX));

    let fault = ctx
        .translate(0x4000, AccessKind::Read, Privilege::Kernel)
        .unwrap_err();
    assert_eq!(fault.kind(), FaultKind::MachineCheck);
    assert!(fault.is_fatal());
    assert_eq!(ctx.mmu.stats().machine_checks, 1);
}

#[test]
fn global_and_private_duplicate_is_machine_check() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.write_slot(8, pd0_global(0x4000), pd1(0x10_0000, K_RWX));
    ctx.write_slot(10, pd0(0x4000, 5), pd1(0x20_0000, K_RWX));

    assert_eq!(
        ctx.translate(0x4000, AccessKind::Fetch, Privilege::Kernel)
            .unwrap_err()
            .kind(),
        FaultKind::MachineCheck
    );
    // Another process only sees the global entry.
    ctx.set_pid(6);
    assert!(ctx
        .translate(0x4000, AccessKind::Fetch, Privilege::Kernel)
        .is_ok());
}

#[test]
fn insert_of_global_replaces_private_entry() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.insert(pd0(0x4000, 5), pd1(0x10_0000, K_RWX));
    ctx.insert(pd0_global(0x4000), pd1(0x20_0000, K_RWX));

    assert_eq!(ctx.legacy().valid_entries().count(), 1);
    assert_eq!(
        ctx.translate(0x4000, AccessKind::Read, Privilege::Kernel)
            .unwrap()
            .paddr,
        PhysAddr::new(0x20_0000)
    );
}

#[test]
fn insert_of_private_replaces_global_entry() {
    let mut ctx = LegacyContext::new().enabled(5);
    ctx.insert(pd0_global(0x4000), pd1(0x10_0000, K_RWX));
    ctx.insert(pd0(0x4000, 5), pd1(0x20_0000, K_RWX));

    assert_eq!(ctx.legacy().valid_entries().count(), 1);
    assert_eq!(
        ctx.translate(0x4000, AccessKind::Read, Privilege::Kernel)
            .unwrap()
            .paddr,
        PhysAddr::new(0x20_0000)
    );
    ctx.set_pid(6);
    assert_eq!(
        ctx.translate(0x4000, AccessKind::Read, Privilege::Kernel)
            .unwrap_err()
            .kind(),
        FaultKind::TlbMissData
    );
}

#[test]
fn insert_never_leaves_duplicates() {
    let mut ctx = LegacyContext::new().enabled(5);
    for frame in [0x10_0000, 0x20_0000, 0x30_0000] {
        ctx.insert(pd0(0x4000, 5), pd1(frame, K_RWX));
    }
    assert_eq!(ctx.legacy().valid_entries().count(), 1);
    assert_eq!(
        ctx.translate(0x4000, AccessKind::Read, Privilege::Kernel)
            .unwrap()
            .paddr,
        PhysAddr::new(0x30_0000)
    );
}

// ══════════════════════════════════════════════════════════
// 6. Dispatch around the window
// ══════════════════════════════════════════════════════════

#[test]
fn above_window_is_direct_for_kernel_and_fault_for_user() {
    let mut ctx = LegacyContext::new().enabled(5);

    let t = ctx
        .translate(0x9000_0000, AccessKind::Write, Privilege::Kernel)
        .unwrap();
    assert_eq!(t.paddr, PhysAddr::new(0x9000_0000));

    let fault = ctx
        .translate(0x9000_0000, AccessKind::Write, Privilege::User)
        .unwrap_err();
    assert_eq!(fault.kind(), FaultKind::ProtectionViolation);
    assert_eq!(fault.cause_code(), 2);
}
