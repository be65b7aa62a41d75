//! Region-based protection unit interface.
//!
//! The protection unit (MPU) is an external collaborator. The dispatcher only
//! needs to know whether it is enabled and what it grants for an address; it
//! never translates, so the physical address always equals the virtual one.

use crate::common::{AccessKind, Fault, Permissions, VirtAddr};
use crate::core::arch::mode::Privilege;

/// A region-based protection unit.
pub trait ProtectionUnit {
    /// Returns true if the unit participates in dispatch.
    fn enabled(&self) -> bool;

    /// Checks an access, returning the capabilities granted for its region.
    ///
    /// # Errors
    ///
    /// Returns the fault to deliver when the region forbids the access.
    fn check(
        &mut self,
        vaddr: VirtAddr,
        access: AccessKind,
        privilege: Privilege,
    ) -> Result<Permissions, Fault>;
}

/// A protection unit that is permanently disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProtectionUnit;

impl ProtectionUnit for NoProtectionUnit {
    fn enabled(&self) -> bool {
        false
    }

    fn check(
        &mut self,
        _vaddr: VirtAddr,
        _access: AccessKind,
        _privilege: Privilege,
    ) -> Result<Permissions, Fault> {
        Ok(Permissions::all())
    }
}
