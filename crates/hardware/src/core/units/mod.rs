//! Execution units and functional components.
//!
//! This module contains the units of the simulated core that the translation
//! subsystem provides; currently the memory management unit.

/// Memory Management Unit: dispatcher, legacy TLB, radix walker, and fast-path cache.
pub mod mmu;
