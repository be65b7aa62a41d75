//! System-on-Chip (SoC) Components.
//!
//! This module organizes the parts of the simulated system that sit below the
//! MMU: the physical memory the radix walker reads page tables from.

/// Sparse physical memory.
pub mod memory;

/// Physical memory access trait.
pub mod traits;

pub use memory::SparseMemory;
pub use traits::PhysMemory;
