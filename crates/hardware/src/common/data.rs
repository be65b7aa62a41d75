//! Memory Access Types.
//!
//! This module defines the classification of memory accesses seen by the
//! translation subsystem. These types are used for the following:
//! 1. **Permission Validation:** Matching a request against a capability mask.
//! 2. **Fault Generation:** Selecting the fault kind and cause code for a failed translation.
//! 3. **Debug Walks:** The `Irrelevant` kind marks introspection requests that must not fault on permissions.

use bitflags::bitflags;

/// Kind of memory access a translation is requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Data load. Requires read capability.
    Read,

    /// Data store. Requires write capability.
    Write,

    /// Instruction fetch. Requires execute capability.
    Fetch,

    /// Atomic read-modify-write. Requires both read and write capability.
    Atomic,

    /// Debugger / introspection access.
    ///
    /// Never checked against permissions, never logged, and never leaves the
    /// legacy miss-side-effect in the page-descriptor registers.
    Irrelevant,
}

impl AccessKind {
    /// Returns the capability bits a request of this kind needs.
    ///
    /// `Irrelevant` needs nothing and is therefore always covered.
    pub const fn required(self) -> Permissions {
        match self {
            Self::Read => Permissions::READ,
            Self::Write => Permissions::WRITE,
            Self::Fetch => Permissions::EXEC,
            Self::Atomic => Permissions::READ.union(Permissions::WRITE),
            Self::Irrelevant => Permissions::empty(),
        }
    }

    /// Returns true for instruction-side accesses.
    pub const fn is_fetch(self) -> bool {
        matches!(self, Self::Fetch)
    }

    /// Returns the short mnemonic used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Fetch => "fetch",
            Self::Atomic => "atomic",
            Self::Irrelevant => "irrelevant",
        }
    }
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Read/write/execute capability mask granted by a translation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Permissions: u8 {
        /// Loads are allowed.
        const READ = 1 << 0;
        /// Stores are allowed.
        const WRITE = 1 << 1;
        /// Instruction fetches are allowed.
        const EXEC = 1 << 2;
    }
}

impl Permissions {
    /// Returns true if this mask covers an access of `kind`.
    #[inline]
    pub const fn allows(self, kind: AccessKind) -> bool {
        self.contains(kind.required())
    }
}
