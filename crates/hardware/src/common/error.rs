//! Fault and error definitions.
//!
//! This module defines the three failure tiers of the translation subsystem:
//! 1. **Simulated faults:** [`Fault`] descriptors handed to the execution core, which
//!    turns them into a simulated exception (TLB miss, protection violation, MMU fault,
//!    machine check).
//! 2. **Configuration errors:** [`ConfigError`], detected once at construction and fatal
//!    for the host.
//! 3. **Register-surface misuse:** [`RegisterError`], returned when a read-only or
//!    absent control register is written or read.

use std::fmt;

use thiserror::Error;

use super::addr::PhysAddr;
use super::data::{AccessKind, Permissions};

/// Exception vector for a machine check.
pub const EV_MACHINE_CHECK: u8 = 0x03;

/// Exception vector for an instruction TLB miss (legacy) or instruction MMU fault (radix).
pub const EV_TLB_MISS_I: u8 = 0x04;

/// Exception vector for a data TLB miss (legacy) or data MMU fault (radix).
pub const EV_TLB_MISS_D: u8 = 0x05;

/// Exception vector for a protection violation.
pub const EV_PROT_V: u8 = 0x06;

/// Parameter value reported with every protection violation.
pub const PROT_V_PARAM: u8 = 0x08;

/// Cause code reported with a machine check caused by duplicate TLB matches.
pub const MACHINE_CHECK_DUP_MATCH: u8 = 0x01;

/// Cause-code bit distinguishing an access-flag fault from an invalid descriptor.
pub const CAUSE_ACCESS_FLAG: u8 = 0x10;

/// Access direction encoded into a fault's cause code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultCause {
    /// Instruction fetch.
    Fetch = 0,
    /// Data load.
    Read = 1,
    /// Data store.
    Write = 2,
    /// Atomic (and debugger) accesses.
    Atomic = 3,
}

impl From<AccessKind> for FaultCause {
    fn from(kind: AccessKind) -> Self {
        match kind {
            AccessKind::Fetch => Self::Fetch,
            AccessKind::Read => Self::Read,
            AccessKind::Write => Self::Write,
            AccessKind::Atomic | AccessKind::Irrelevant => Self::Atomic,
        }
    }
}

impl FaultCause {
    /// Returns the numeric cause code.
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// The class of a translation fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Radix walk failed for an instruction-side (or debug) access.
    InstructionMmuFault,
    /// Radix walk failed for a data access.
    DataMmuFault,
    /// Mapping exists but does not grant the requested access.
    ProtectionViolation,
    /// Inconsistent TLB state (more than one matching entry).
    MachineCheck,
    /// Legacy TLB miss on an instruction fetch.
    TlbMissInstruction,
    /// Legacy TLB miss on a data access.
    TlbMissData,
}

impl FaultKind {
    /// Returns the exception vector the execution core raises for this kind.
    pub const fn number(self) -> u8 {
        match self {
            Self::MachineCheck => EV_MACHINE_CHECK,
            Self::TlbMissInstruction | Self::InstructionMmuFault => EV_TLB_MISS_I,
            Self::TlbMissData | Self::DataMmuFault => EV_TLB_MISS_D,
            Self::ProtectionViolation => EV_PROT_V,
        }
    }

    /// Returns the human-readable name of the fault kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::InstructionMmuFault => "InstructionMMUFault",
            Self::DataMmuFault => "DataMMUFault",
            Self::ProtectionViolation => "ProtectionViolation",
            Self::MachineCheck => "MachineCheck",
            Self::TlbMissInstruction => "TLBMissInstruction",
            Self::TlbMissData => "TLBMissData",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully populated translation fault descriptor.
///
/// The `(number, cause_code, parameter)` triple is everything the execution
/// core needs to synthesize the simulated exception. Fields are private so a
/// descriptor can only come from one of the constructors below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("{kind} (vector {:#04x}, cause {cause_code:#04x}, param {parameter:#04x})", .kind.number())]
pub struct Fault {
    kind: FaultKind,
    cause_code: u8,
    parameter: u8,
}

impl Fault {
    /// Protection violation for an access of `kind`.
    pub fn protection_violation(kind: AccessKind) -> Self {
        Self {
            kind: FaultKind::ProtectionViolation,
            cause_code: FaultCause::from(kind).code(),
            parameter: PROT_V_PARAM,
        }
    }

    /// Machine check raised by duplicate TLB matches.
    pub const fn machine_check() -> Self {
        Self {
            kind: FaultKind::MachineCheck,
            cause_code: MACHINE_CHECK_DUP_MATCH,
            parameter: 0,
        }
    }

    /// Legacy TLB miss: instruction-side for fetches, data-side otherwise.
    pub fn tlb_miss(kind: AccessKind) -> Self {
        if kind.is_fetch() {
            Self {
                kind: FaultKind::TlbMissInstruction,
                cause_code: 0,
                parameter: 0,
            }
        } else {
            Self {
                kind: FaultKind::TlbMissData,
                cause_code: FaultCause::from(kind).code(),
                parameter: 0,
            }
        }
    }

    /// Radix MMU fault (unresolvable root, invalid descriptor, or clear access flag).
    ///
    /// Fetch and debug requests produce an instruction-side fault; all data
    /// accesses produce a data-side fault carrying the access cause.
    pub fn mmu_fault(kind: AccessKind, access_flag_clear: bool) -> Self {
        let af = if access_flag_clear { CAUSE_ACCESS_FLAG } else { 0 };
        match kind {
            AccessKind::Fetch | AccessKind::Irrelevant => Self {
                kind: FaultKind::InstructionMmuFault,
                cause_code: af,
                parameter: 0,
            },
            AccessKind::Read | AccessKind::Write | AccessKind::Atomic => Self {
                kind: FaultKind::DataMmuFault,
                cause_code: af | FaultCause::from(kind).code(),
                parameter: 0,
            },
        }
    }

    /// Returns the fault class.
    pub const fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Returns the exception vector number.
    pub const fn number(&self) -> u8 {
        self.kind.number()
    }

    /// Returns the cause code.
    pub const fn cause_code(&self) -> u8 {
        self.cause_code
    }

    /// Returns the exception parameter.
    pub const fn parameter(&self) -> u8 {
        self.parameter
    }

    /// Returns true if this fault represents an inconsistent simulated CPU.
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind, FaultKind::MachineCheck)
    }
}

/// A successful translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Translation {
    /// Resulting physical address.
    pub paddr: PhysAddr,
    /// Capabilities granted for the containing page under the requesting privilege.
    pub perms: Permissions,
}

impl Translation {
    /// Creates a translation result.
    #[inline]
    pub const fn new(paddr: PhysAddr, perms: Permissions) -> Self {
        Self { paddr, perms }
    }

    /// Identity mapping with full capabilities.
    #[inline]
    pub const fn direct(addr: u64) -> Self {
        Self {
            paddr: PhysAddr(addr),
            perms: Permissions::all(),
        }
    }
}

/// Outcome of a single translation request.
pub type TranslateResult = Result<Translation, Fault>;

/// Host-fatal configuration problems detected at MMU construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The radix geometry profile name is not one of the supported shapes.
    #[error("unknown radix MMU profile `{0}` (expected 32_4k, 48_4k, 48_16k, 48_64k or 52_64k)")]
    UnknownProfile(String),

    /// The legacy page-size selector is outside the supported range.
    #[error("legacy MMU page size selector {0} out of range (12..=24)")]
    PageSizeOutOfRange(u8),

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Misuse of the control-register surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// The register exists but cannot be written.
    #[error("register {0} is read-only")]
    ReadOnly(&'static str),

    /// The register is not implemented by the active MMU design.
    #[error("register {0} is not implemented by the {1} MMU")]
    NotPresent(&'static str, &'static str),
}
