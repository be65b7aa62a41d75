//! ARC architecture-specific components.
//!
//! This module contains the architectural elements the MMU consults:
//! 1. **Modes:** Privilege level definitions (kernel and user).

/// Privilege level definitions.
pub mod mode;
