//! Translation dispatcher.
//!
//! Decides, per request, which path resolves an address:
//!
//! | MMU | MPU | in MMU range | privilege | action          |
//! |-----|-----|--------------|-----------|-----------------|
//! | off | off | any          | any       | direct          |
//! | off | on  | any          | any       | protection unit |
//! | on  | off | yes          | any       | MMU             |
//! | on  | off | no           | kernel    | direct          |
//! | on  | off | no           | user      | fault (ProtV)   |
//! | on  | on  | no           | any       | protection unit |
//! | on  | on  | yes          | any       | MMU             |

use crate::core::arch::mode::Privilege;

/// Path selected for a translation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Physical address equals virtual address, full capabilities.
    Direct,
    /// The region-based protection unit decides.
    ProtectionUnit,
    /// The active MMU design translates.
    Mmu,
    /// Protection violation without consulting any translation structure.
    ImmediateFault,
}

/// Selects the translation path. Pure and side-effect free.
pub const fn decide_action(
    mmu_enabled: bool,
    mpu_enabled: bool,
    in_mmu_range: bool,
    privilege: Privilege,
) -> Action {
    match (mmu_enabled, mpu_enabled, in_mmu_range) {
        (false, false, _) => Action::Direct,
        (false, true, _) | (true, true, false) => Action::ProtectionUnit,
        (true, _, true) => Action::Mmu,
        (true, false, false) => {
            if privilege.is_user() {
                Action::ImmediateFault
            } else {
                Action::Direct
            }
        }
    }
}
