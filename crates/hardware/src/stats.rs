//! Translation statistics collection and reporting.
//!
//! This module tracks per-CPU MMU activity. It provides:
//! 1. **Volume:** Live translations and probes.
//! 2. **Fast Path:** Translation-cache hits, misses, and flushes.
//! 3. **Outcomes:** Delivered faults, failed probes, and machine checks.
//! 4. **Walks:** Radix page-table walks started.

use std::fmt;

/// Translation statistics for one simulated CPU.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MmuStats {
    /// Live (non-probe) translation requests.
    pub translations: u64,
    /// Probe requests.
    pub probes: u64,
    /// Fast-path cache hits.
    pub cache_hits: u64,
    /// Fast-path cache misses.
    pub cache_misses: u64,
    /// Faults returned for live requests.
    pub faults: u64,
    /// Probe requests that found the address untranslatable.
    pub failed_probes: u64,
    /// Machine checks raised (live or probe).
    pub machine_checks: u64,
    /// Radix page-table walks started.
    pub walks: u64,
    /// Cache flushes applied.
    pub flushes: u64,
}

impl MmuStats {
    /// Creates zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fraction of fast-path lookups that hit (0.0 when none were made).
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for MmuStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MMU")?;
        writeln!(f, "  mmu.translations          {}", self.translations)?;
        writeln!(f, "  mmu.probes                {}", self.probes)?;
        writeln!(
            f,
            "  mmu.cache                 {} hits / {} misses ({:.2}%)",
            self.cache_hits,
            self.cache_misses,
            self.cache_hit_rate() * 100.0
        )?;
        writeln!(f, "  mmu.faults                {}", self.faults)?;
        writeln!(f, "  mmu.failed_probes         {}", self.failed_probes)?;
        writeln!(f, "  mmu.machine_checks        {}", self.machine_checks)?;
        writeln!(f, "  mmu.walks                 {}", self.walks)?;
        write!(f, "  mmu.flushes               {}", self.flushes)
    }
}
