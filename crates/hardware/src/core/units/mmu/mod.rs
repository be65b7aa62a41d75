//! Memory Management Unit (MMU).
//!
//! This module implements the per-CPU translation context. It owns:
//! 1. **Design:** Exactly one MMU generation, the legacy set-associative TLB or
//!    the radix page-table walker, selected at construction.
//! 2. **Dispatch:** Direct mapping, protection unit, MMU, or immediate fault per request.
//! 3. **Fast Path:** A translation cache flushed on every mapping change.
//! 4. **Register Surface:** Routing of control-register reads and writes to the design.
//!
//! No state is shared between CPUs; only the backing memory passed to each call may be.

/// Translation dispatcher.
pub mod dispatch;

/// Legacy set-associative TLB MMU.
pub mod legacy;

/// Region-based protection unit interface.
pub mod mpu;

/// Radix page-table MMU.
pub mod radix;

/// Control-register identifiers.
pub mod regs;

/// Fast-path translation cache.
pub mod tlb;

use std::fmt;

use tracing::debug;

use crate::common::{
    AccessKind, CACHE_PAGE_SHIFT, ConfigError, Fault, FaultKind, PhysAddr,
    RegisterError, TranslateResult, Translation, VirtAddr,
};
use crate::config::{Config, MmuVersion};
use crate::core::arch::mode::Privilege;
use crate::soc::traits::PhysMemory;
use crate::stats::MmuStats;

use self::dispatch::{Action, decide_action};
use self::legacy::LegacyMmu;
use self::mpu::{NoProtectionUnit, ProtectionUnit};
use self::radix::RadixMmu;
use self::regs::AuxReg;
use self::tlb::{CacheFlush, TranslationCache};

/// A single translation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TranslationRequest {
    /// Address issued by the simulated program.
    pub vaddr: VirtAddr,
    /// Kind of access.
    pub access: AccessKind,
    /// Privilege of the requester.
    pub privilege: Privilege,
    /// Only report translatability; the caller will not deliver the fault.
    pub probe: bool,
}

impl TranslationRequest {
    /// Creates a live (non-probe) request.
    pub const fn new(vaddr: u64, access: AccessKind, privilege: Privilege) -> Self {
        Self {
            vaddr: VirtAddr::new(vaddr),
            access,
            privilege,
            probe: false,
        }
    }

    /// Creates a probe request.
    pub const fn probe(vaddr: u64, access: AccessKind, privilege: Privilege) -> Self {
        Self {
            vaddr: VirtAddr::new(vaddr),
            access,
            privilege,
            probe: true,
        }
    }
}

/// The MMU generation implemented by a CPU.
#[derive(Clone, Debug)]
pub enum MmuDesign {
    /// Software-managed set-associative TLB.
    Legacy(LegacyMmu),
    /// Hardware page-table walker.
    Radix(RadixMmu),
}

impl MmuDesign {
    /// Returns true if translation is enabled.
    pub const fn enabled(&self) -> bool {
        match self {
            Self::Legacy(l) => l.enabled(),
            Self::Radix(r) => r.enabled(),
        }
    }

    /// Returns true if `vaddr` is translated when the design is enabled.
    pub fn in_range(&self, vaddr: u64) -> bool {
        match self {
            Self::Legacy(_) => LegacyMmu::in_range(vaddr),
            Self::Radix(_) => true,
        }
    }

    /// Returns the design name used in register errors and logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "legacy",
            Self::Radix(_) => "radix",
        }
    }
}

/// Per-CPU MMU context.
pub struct Mmu {
    design: MmuDesign,
    cache: TranslationCache,
    mpu: Box<dyn ProtectionUnit>,
    stats: MmuStats,
}

impl fmt::Debug for Mmu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mmu")
            .field("design", &self.design)
            .field("mpu_enabled", &self.mpu.enabled())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Mmu {
    /// Builds an MMU from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unknown radix profile or an out-of-range
    /// legacy page size.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcsim_mmu::common::{AccessKind, PhysAddr};
    /// use arcsim_mmu::config::Config;
    /// use arcsim_mmu::core::arch::mode::Privilege;
    /// use arcsim_mmu::core::units::mmu::{Mmu, TranslationRequest};
    /// use arcsim_mmu::soc::memory::SparseMemory;
    ///
    /// let mut mmu = Mmu::new(&Config::default()).unwrap();
    /// let mut mem = SparseMemory::new();
    ///
    /// // Translation is disabled at reset, so addresses map directly.
    /// let req = TranslationRequest::new(0x1234, AccessKind::Read, Privilege::User);
    /// let t = mmu.translate(&req, &mut mem).unwrap();
    /// assert_eq!(t.paddr, PhysAddr::new(0x1234));
    /// ```
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let design = match config.mmu.version {
            MmuVersion::Legacy => MmuDesign::Legacy(LegacyMmu::new(config.mmu.page_size_sel)?),
            MmuVersion::Radix => {
                MmuDesign::Radix(RadixMmu::new(config.mmu.radix_profile(config.cpu.family)?))
            }
        };
        Ok(Self::with_design(design, config.mmu.translation_cache_size))
    }

    /// Wraps an already-built design.
    pub fn with_design(design: MmuDesign, cache_size: usize) -> Self {
        Self {
            design,
            cache: TranslationCache::new(cache_size),
            mpu: Box::new(NoProtectionUnit),
            stats: MmuStats::new(),
        }
    }

    /// Attaches a protection unit, replacing the default disabled one.
    pub fn with_protection_unit(mut self, mpu: Box<dyn ProtectionUnit>) -> Self {
        self.mpu = mpu;
        self.cache.flush();
        self
    }

    /// Returns the active design.
    pub const fn design(&self) -> &MmuDesign {
        &self.design
    }

    /// Returns the statistics.
    pub const fn stats(&self) -> &MmuStats {
        &self.stats
    }

    /// Returns the statistics for resetting.
    pub fn stats_mut(&mut self) -> &mut MmuStats {
        &mut self.stats
    }

    /// Returns true if translation is enabled.
    pub const fn enabled(&self) -> bool {
        self.design.enabled()
    }

    /// Returns the fast-path cache.
    pub const fn translation_cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Drops every cached translation.
    ///
    /// The protection unit is external, so whoever reconfigures it must call this.
    pub fn flush_translation_cache(&mut self) {
        self.apply_flush(CacheFlush::All);
    }

    fn apply_flush(&mut self, flush: CacheFlush) {
        if self.cache.apply(flush) {
            self.stats.flushes += 1;
            debug!(target: "mmu", ?flush, "translation cache flushed");
        }
    }

    /// Resolves a request without touching statistics.
    fn resolve(&mut self, req: &TranslationRequest, mem: &mut dyn PhysMemory) -> (Action, TranslateResult) {
        let vaddr = req.vaddr.val();
        let action = decide_action(
            self.design.enabled(),
            self.mpu.enabled(),
            self.design.in_range(vaddr),
            req.privilege,
        );

        let result = match action {
            Action::Direct => Ok(Translation::direct(vaddr)),
            Action::ProtectionUnit => self
                .mpu
                .check(req.vaddr, req.access, req.privilege)
                .map(|perms| Translation::new(PhysAddr::new(vaddr), perms)),
            Action::ImmediateFault => Err(Fault::protection_violation(req.access)),
            Action::Mmu => match &mut self.design {
                MmuDesign::Legacy(legacy) => legacy.translate(vaddr, req.access, req.privilege),
                MmuDesign::Radix(radix) => {
                    self.stats.walks += 1;
                    radix.translate(vaddr, req.access, req.privilege, mem)
                }
            },
        };
        (action, result)
    }

    fn record(&mut self, req: &TranslationRequest, result: &TranslateResult) {
        if req.probe {
            self.stats.probes += 1;
        } else {
            self.stats.translations += 1;
        }

        let Err(fault) = result else {
            return;
        };
        if fault.kind() == FaultKind::MachineCheck {
            self.stats.machine_checks += 1;
        }
        if req.probe {
            self.stats.failed_probes += 1;
        } else {
            self.stats.faults += 1;
        }
        if !matches!(req.access, AccessKind::Irrelevant) {
            debug!(target: "mmu", vaddr = %req.vaddr, access = %req.access, privilege = %req.privilege, probe = req.probe, %fault, "translation failed");
        }
    }

    /// Translates a request through the dispatcher and the active design.
    ///
    /// Faults are returned, never delivered; a probe differs only in how it is
    /// counted. Legacy side effects (victim cursor, TLBPD0 pre-load) still
    /// happen for probes.
    pub fn translate(&mut self, req: &TranslationRequest, mem: &mut dyn PhysMemory) -> TranslateResult {
        let (_, result) = self.resolve(req, mem);
        self.record(req, &result);
        result
    }

    /// Returns true if `vaddr` is translatable for `access` under `privilege`.
    pub fn probe(
        &mut self,
        vaddr: u64,
        access: AccessKind,
        privilege: Privilege,
        mem: &mut dyn PhysMemory,
    ) -> bool {
        self.translate(&TranslationRequest::probe(vaddr, access, privilege), mem)
            .is_ok()
    }

    /// Translates through the fast-path cache.
    ///
    /// A hit whose cached capabilities do not cover the access falls through
    /// to a full translation so the correct fault is produced. Protection-unit
    /// results are never cached.
    pub fn access(&mut self, req: &TranslationRequest, mem: &mut dyn PhysMemory) -> TranslateResult {
        let vpn = req.vaddr.page_number(CACHE_PAGE_SHIFT);
        let offset = req.vaddr.page_offset(CACHE_PAGE_SHIFT);

        let cached = self
            .cache
            .lookup(vpn, req.privilege)
            .filter(|(_, perms)| perms.allows(req.access));
        if let Some((ppn, perms)) = cached {
            self.stats.cache_hits += 1;
            if req.probe {
                self.stats.probes += 1;
            } else {
                self.stats.translations += 1;
            }
            return Ok(Translation::new(PhysAddr::new((ppn << CACHE_PAGE_SHIFT) | offset), perms));
        }
        self.stats.cache_misses += 1;

        let (action, result) = self.resolve(req, mem);
        self.record(req, &result);

        if let (Ok(t), Action::Direct | Action::Mmu) = (&result, action) {
            self.cache.insert(vpn, req.privilege, t.paddr.page_number(CACHE_PAGE_SHIFT), t.perms);
        }
        result
    }

    /// Best-effort translation for debuggers; never faults and never logs.
    ///
    /// Returns the identity when translation is off (or, for the legacy
    /// design, outside its window) and `None` when no mapping exists.
    pub fn debug_translate(&mut self, vaddr: u64, mem: &mut dyn PhysMemory) -> Option<PhysAddr> {
        if !self.design.enabled() || !self.design.in_range(vaddr) {
            return Some(PhysAddr::new(vaddr));
        }
        let result = match &mut self.design {
            MmuDesign::Legacy(legacy) => legacy.translate(vaddr, AccessKind::Irrelevant, Privilege::Kernel),
            MmuDesign::Radix(radix) => {
                radix.translate(vaddr, AccessKind::Irrelevant, Privilege::Kernel, mem)
            }
        };
        result.ok().map(|t| t.paddr)
    }

    /// Reads a control register.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::NotPresent`] for a register of the other design.
    pub fn read_reg(&self, reg: AuxReg) -> Result<u64, RegisterError> {
        match &self.design {
            MmuDesign::Legacy(legacy) => legacy.read_reg(reg),
            MmuDesign::Radix(radix) => radix.read_reg(reg),
        }
    }

    /// Writes a control register and applies any cache invalidation it implies.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::ReadOnly`] for BUILD and FAULT_STATUS, and
    /// [`RegisterError::NotPresent`] for a register of the other design.
    pub fn write_reg(&mut self, reg: AuxReg, val: u64) -> Result<(), RegisterError> {
        let flush = match &mut self.design {
            MmuDesign::Legacy(legacy) => legacy.write_reg(reg, val)?,
            MmuDesign::Radix(radix) => radix.write_reg(reg, val)?,
        };
        self.apply_flush(flush);
        Ok(())
    }

    /// Restores power-on state: every entry invalid, registers zero, translation off.
    pub fn reset(&mut self) {
        match &mut self.design {
            MmuDesign::Legacy(legacy) => legacy.reset(),
            MmuDesign::Radix(radix) => radix.reset(),
        }
        self.apply_flush(CacheFlush::All);
    }

    /// Turns translation off, leaving all other state intact.
    pub fn disable(&mut self) {
        match &mut self.design {
            MmuDesign::Legacy(legacy) => legacy.disable(),
            MmuDesign::Radix(radix) => radix.disable(),
        }
        self.apply_flush(CacheFlush::All);
    }
}
