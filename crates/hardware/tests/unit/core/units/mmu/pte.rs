//! Radix Descriptor Tests.
//!
//! Verifies descriptor classification, table-override decoding, and the
//! capability mask of terminal descriptors.

use arcsim_mmu::common::Permissions;
use arcsim_mmu::core::arch::mode::Privilege;
use arcsim_mmu::core::units::mmu::radix::pte::{DescriptorKind, Pte, TableOverrides};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::descriptors::{
    KXN, RO, TBL_KXN, TBL_NO_USER, TBL_NO_USER_RW, TBL_NO_WRITE, TBL_UXN, USER, UXN, block, page,
    table,
};

const R: Permissions = Permissions::READ;
const W: Permissions = Permissions::WRITE;
const X: Permissions = Permissions::EXEC;

#[test]
fn classification() {
    assert_eq!(Pte::new(table(0x2000)).kind(0, 3), DescriptorKind::Table);
    assert_eq!(Pte::new(page(0x2000, 0)).kind(3, 3), DescriptorKind::Page);
    assert_eq!(Pte::new(block(0x4000_0000, 0)).kind(1, 3), DescriptorKind::Block);
}

#[test]
fn display_is_zero_padded_hex() {
    assert_eq!(Pte::new(0x403).to_string(), "0x0000000000000403");
}

#[rstest]
#[case(0, TableOverrides::empty())]
#[case(TBL_KXN, TableOverrides::KERNEL_XN)]
#[case(TBL_UXN, TableOverrides::USER_XN)]
#[case(TBL_NO_USER, TableOverrides::NO_USER_MODE)]
#[case(TBL_NO_WRITE, TableOverrides::NO_WRITE)]
#[case(TBL_NO_USER_RW, TableOverrides::NO_USER_RW)]
#[case(TBL_KXN | TBL_UXN | TBL_NO_WRITE, TableOverrides::KERNEL_XN.union(TableOverrides::USER_XN).union(TableOverrides::NO_WRITE))]
fn table_override_decoding(#[case] attrs: u64, #[case] expected: TableOverrides) {
    assert_eq!(Pte::new(table(0x1000) | attrs).table_overrides(), expected);
}

#[rstest]
// Kernel view
#[case(0, TableOverrides::empty(), Privilege::Kernel, R | W | X)]
#[case(RO, TableOverrides::empty(), Privilege::Kernel, R | X)]
#[case(KXN, TableOverrides::empty(), Privilege::Kernel, R | W)]
#[case(UXN, TableOverrides::empty(), Privilege::Kernel, R | W | X)]
#[case(0, TableOverrides::NO_WRITE, Privilege::Kernel, R | X)]
#[case(0, TableOverrides::KERNEL_XN, Privilege::Kernel, R | W)]
#[case(0, TableOverrides::NO_USER_MODE, Privilege::Kernel, R | W | X)]
// User view
#[case(0, TableOverrides::empty(), Privilege::User, Permissions::empty())]
#[case(USER, TableOverrides::empty(), Privilege::User, R | W | X)]
#[case(USER | RO, TableOverrides::empty(), Privilege::User, R | X)]
#[case(USER | UXN, TableOverrides::empty(), Privilege::User, R | W)]
#[case(USER | KXN, TableOverrides::empty(), Privilege::User, R | W | X)]
#[case(USER, TableOverrides::USER_XN, Privilege::User, R | W)]
#[case(USER, TableOverrides::NO_USER_RW, Privilege::User, X)]
#[case(USER, TableOverrides::NO_USER_MODE, Privilege::User, Permissions::empty())]
fn terminal_permissions(
    #[case] attrs: u64,
    #[case] overrides: TableOverrides,
    #[case] privilege: Privilege,
    #[case] expected: Permissions,
) {
    let pte = Pte::new(page(0x5000, attrs));
    assert_eq!(pte.permissions(overrides, privilege), expected);
}
