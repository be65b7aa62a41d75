//! Common types and constants used throughout the translation subsystem.
//!
//! This module provides the building blocks shared by both MMU designs, the
//! dispatcher, and the execution core that consumes translation results:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Constants:** Cache granularity, address windows, and descriptor sizes.
//! 3. **Memory Access:** Access kinds and capability masks.
//! 4. **Error Handling:** Fault descriptors, configuration and register errors.

/// Address type definitions (physical and virtual addresses).
pub mod addr;

/// Common constants used throughout the MMU models.
pub mod constants;

/// Memory access kinds and permission masks.
pub mod data;

/// Fault descriptors and error types.
pub mod error;

pub use addr::{PhysAddr, VirtAddr};
pub use constants::{CACHE_PAGE_SHIFT, CACHE_PAGE_SIZE};
pub use data::{AccessKind, Permissions};
pub use error::{
    ConfigError, Fault, FaultCause, FaultKind, RegisterError, TranslateResult, Translation,
};
