//! ARC address-translation library.
//!
//! This crate implements the address-translation subsystem of an ARC instruction-set
//! simulator with the following:
//! 1. **Dispatch:** Direct mapping, protection unit, MMU, or immediate fault per access.
//! 2. **Legacy MMU:** Software-managed 256x4 set-associative TLB with PID/SASID matching
//!    and the TLBCOMMAND protocol.
//! 3. **Radix MMU:** Multi-level page-table walker over five geometry profiles.
//! 4. **Faults:** A uniform `(vector, cause, parameter)` descriptor for the execution core.
//! 5. **Support:** Configuration, a fast-path translation cache, statistics, and sparse
//!    physical memory for page tables.

/// Common types and constants (addresses, access kinds, faults).
pub mod common;
/// MMU configuration (CPU family, MMU version, geometry).
pub mod config;
/// CPU core components (privilege levels, MMU).
pub mod core;
/// System-on-chip pieces below the MMU (physical memory).
pub mod soc;
/// Translation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or parse from JSON.
pub use crate::config::Config;
/// Per-CPU MMU context; construct with `Mmu::new`.
pub use crate::core::Mmu;
/// Sparse backing memory for page tables.
pub use crate::soc::SparseMemory;
