//! Configuration system for the MMU models.
//!
//! This module defines the configuration structures used to build a per-CPU
//! [`Mmu`](crate::core::units::mmu::Mmu). It provides:
//! 1. **Defaults:** Baseline geometry (8 KiB legacy pages, 48-bit/4 KiB radix tables).
//! 2. **Structures:** Hierarchical config for the CPU family and the MMU.
//! 3. **Validation:** Host-fatal checks performed once, before any translation runs.
//!
//! Configuration is supplied as JSON (`Config::from_json`, `Config::from_file`) or
//! built with `Config::default()`.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::common::ConfigError;
use crate::common::constants::{DEFAULT_LEGACY_PAGE_BITS, DEFAULT_TRANSLATION_CACHE_SIZE};
use crate::core::units::mmu::radix::profile::GeometryProfile;

/// Smallest legacy page-size selector (4 KiB pages).
pub const MIN_LEGACY_PAGE_BITS: u8 = 12;

/// Largest legacy page-size selector (16 MiB pages).
pub const MAX_LEGACY_PAGE_BITS: u8 = 24;

/// CPU family; decides which radix geometry profiles are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CpuFamily {
    /// 32-bit cores. The radix MMU is always the 32-bit/4 KiB profile.
    #[serde(alias = "ARC32", alias = "arc32")]
    Arc32,
    /// 64-bit cores. The radix profile is selected by name.
    #[default]
    #[serde(alias = "ARC64", alias = "arc64")]
    Arc64,
}

/// MMU generation implemented by the simulated CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MmuVersion {
    /// Software-managed set-associative TLB driven by page-descriptor registers.
    #[default]
    #[serde(alias = "legacy", alias = "v3", alias = "v4")]
    Legacy,
    /// Hardware multi-level page-table walker.
    #[serde(alias = "radix", alias = "v6")]
    Radix,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use arcsim_mmu::config::{Config, MmuVersion};
///
/// let config = Config::from_json(r#"{
///     "cpu": { "family": "Arc64" },
///     "mmu": { "version": "Radix", "radix_profile": "48_16k" }
/// }"#).unwrap();
/// assert_eq!(config.mmu.version, MmuVersion::Radix);
/// assert_eq!(config.mmu.page_size_sel, 13);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// CPU family settings
    #[serde(default)]
    pub cpu: CpuConfig,
    /// MMU settings
    #[serde(default)]
    pub mmu: MmuConfig,
}

impl Config {
    /// Parses a configuration from a JSON document and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks every host-fatal constraint without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.mmu.legacy_page_bits()?;
        let _ = self.mmu.radix_profile(self.cpu.family)?;
        Ok(())
    }
}

/// CPU-level settings relevant to address translation.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CpuConfig {
    /// Core family (32- or 64-bit)
    #[serde(default)]
    pub family: CpuFamily,
}

/// MMU settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MmuConfig {
    /// MMU generation
    #[serde(default)]
    pub version: MmuVersion,

    /// Legacy MMU page size as log2 bytes (12..=24)
    #[serde(default = "MmuConfig::default_page_size_sel")]
    pub page_size_sel: u8,

    /// Radix geometry profile name (64-bit family only)
    #[serde(default)]
    pub radix_profile: Option<String>,

    /// Number of fast-path translation cache entries (rounded up to a power of two)
    #[serde(default = "MmuConfig::default_translation_cache_size")]
    pub translation_cache_size: usize,
}

impl MmuConfig {
    /// Returns the default legacy page size selector.
    const fn default_page_size_sel() -> u8 {
        DEFAULT_LEGACY_PAGE_BITS
    }

    /// Returns the default fast-path cache size.
    const fn default_translation_cache_size() -> usize {
        DEFAULT_TRANSLATION_CACHE_SIZE
    }

    /// Returns the validated legacy page size selector.
    pub fn legacy_page_bits(&self) -> Result<u8, ConfigError> {
        if (MIN_LEGACY_PAGE_BITS..=MAX_LEGACY_PAGE_BITS).contains(&self.page_size_sel) {
            Ok(self.page_size_sel)
        } else {
            Err(ConfigError::PageSizeOutOfRange(self.page_size_sel))
        }
    }

    /// Resolves the radix geometry profile for `family`.
    ///
    /// 32-bit cores only support the 32-bit profile; a name given for them is
    /// ignored. 64-bit cores default to the 48-bit/4 KiB profile.
    pub fn radix_profile(&self, family: CpuFamily) -> Result<GeometryProfile, ConfigError> {
        match family {
            CpuFamily::Arc32 => {
                match self.radix_profile.as_deref() {
                    Some(name) if name != GeometryProfile::Va32Page4K.name() => {
                        warn!(target: "mmu", profile = name, "radix profile ignored for 32-bit family");
                    }
                    _ => {}
                }
                Ok(GeometryProfile::Va32Page4K)
            }
            CpuFamily::Arc64 => match self.radix_profile.as_deref() {
                None => Ok(GeometryProfile::Va48Page4K),
                Some(name) => GeometryProfile::from_name(name),
            },
        }
    }
}

impl Default for MmuConfig {
    fn default() -> Self {
        Self {
            version: MmuVersion::default(),
            page_size_sel: Self::default_page_size_sel(),
            radix_profile: None,
            translation_cache_size: Self::default_translation_cache_size(),
        }
    }
}
