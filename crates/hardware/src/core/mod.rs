//! Core processor components.
//!
//! This module contains the parts of the simulated CPU involved in address
//! translation: architectural state shared with the execution core, and the
//! execution units themselves.

/// Architecture-specific components (privilege levels).
pub mod arch;

/// Execution units (MMU).
pub mod units;

pub use self::units::mmu::Mmu;
