//! Privilege levels.
//!
//! This module defines the two privilege levels the translation subsystem
//! distinguishes. It implements the following:
//! 1. **Mode Classification:** Kernel and User.
//! 2. **Serialization:** Conversion to and from the softmmu index used by the execution core.
//! 3. **Observability:** Human-readable naming and display formatting.

/// Privilege level of the requesting access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Privilege {
    /// Kernel mode (status `U` flag clear).
    #[default]
    Kernel = 0,

    /// User mode (status `U` flag set).
    User = 1,
}

impl Privilege {
    /// Converts a softmmu index to a privilege level.
    ///
    /// Index 1 is user mode; every other value is treated as kernel mode.
    pub const fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::User,
            _ => Self::Kernel,
        }
    }

    /// Returns the softmmu index of this privilege level.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for user mode.
    pub const fn is_user(self) -> bool {
        matches!(self, Self::User)
    }

    /// Returns the human-readable name of the privilege level.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kernel => "Kernel",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for Privilege {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
