//! Configuration Tests.
//!
//! Verifies JSON parsing, defaults, and host-fatal validation of the MMU
//! configuration.

use std::io::Write as _;

use arcsim_mmu::common::ConfigError;
use arcsim_mmu::config::{Config, CpuFamily, MmuVersion};
use arcsim_mmu::core::units::mmu::radix::profile::GeometryProfile;
use arcsim_mmu::core::units::mmu::{Mmu, MmuDesign};
use pretty_assertions::assert_eq;

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.cpu.family, CpuFamily::Arc64);
    assert_eq!(config.mmu.version, MmuVersion::Legacy);
    assert_eq!(config.mmu.page_size_sel, 13);
    assert_eq!(config.mmu.translation_cache_size, 256);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_document_uses_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.mmu.version, MmuVersion::Legacy);
    assert_eq!(config.mmu.radix_profile(config.cpu.family).unwrap(), GeometryProfile::Va48Page4K);
}

#[test]
fn radix_profile_by_name() {
    let config = Config::from_json(
        r#"{ "cpu": { "family": "Arc64" }, "mmu": { "version": "Radix", "radix_profile": "52_64k" } }"#,
    )
    .unwrap();
    let mmu = Mmu::new(&config).unwrap();
    match mmu.design() {
        MmuDesign::Radix(radix) => assert_eq!(radix.profile(), GeometryProfile::Va52Page64K),
        MmuDesign::Legacy(_) => panic!("expected radix design"),
    }
}

#[test]
fn version_aliases() {
    let config = Config::from_json(r#"{ "mmu": { "version": "v6" } }"#).unwrap();
    assert_eq!(config.mmu.version, MmuVersion::Radix);
    let config = Config::from_json(r#"{ "mmu": { "version": "v3" } }"#).unwrap();
    assert_eq!(config.mmu.version, MmuVersion::Legacy);
}

#[test]
fn unknown_profile_is_rejected() {
    let err = Config::from_json(r#"{ "mmu": { "radix_profile": "40_8k" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProfile(ref name) if name == "40_8k"));
}

#[test]
fn page_size_out_of_range_is_rejected() {
    let err = Config::from_json(r#"{ "mmu": { "page_size_sel": 11 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::PageSizeOutOfRange(11)));
    let err = Config::from_json(r#"{ "mmu": { "page_size_sel": 25 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::PageSizeOutOfRange(25)));
}

#[test]
fn arc32_ignores_profile_name() {
    let config = Config::from_json(
        r#"{ "cpu": { "family": "ARC32" }, "mmu": { "version": "Radix", "radix_profile": "48_64k" } }"#,
    )
    .unwrap();
    assert_eq!(config.mmu.radix_profile(config.cpu.family).unwrap(), GeometryProfile::Va32Page4K);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = Config::from_json("{ mmu: ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn from_file_reads_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{ "mmu": { "version": "Legacy", "page_size_sel": 12, "translation_cache_size": 32 } }"#)
        .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.mmu.page_size_sel, 12);

    let mmu = Mmu::new(&config).unwrap();
    assert_eq!(mmu.translation_cache().capacity(), 32);
    match mmu.design() {
        MmuDesign::Legacy(legacy) => assert_eq!(legacy.geometry().size(), 4096),
        MmuDesign::Radix(_) => panic!("expected legacy design"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
