//! Control-register identifiers.
//!
//! The surrounding simulator addresses every MMU register through a stable
//! [`AuxReg`] identifier rather than a raw auxiliary-space number. Both MMU
//! designs share `BUILD` and `TLBCOMMAND`; the rest belong to exactly one design.

use std::fmt;

/// An MMU control register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuxReg {
    /// Read-only capability descriptor (both designs).
    Build,
    /// TLB command register (both designs).
    TlbCommand,

    /// Legacy page descriptor 0 (virtual side).
    TlbPd0,
    /// Legacy page descriptor 1 (physical side).
    TlbPd1,
    /// Legacy page descriptor 1, upper half.
    TlbPd1Hi,
    /// Legacy TLB index and status.
    TlbIndex,
    /// Legacy process id and enable bit.
    Pid,
    /// Legacy shared-library ASID mask, positions 0-31.
    Sasid0,
    /// Legacy shared-library ASID mask, positions 32-63.
    Sasid1,
    /// Legacy scratch register.
    ScratchData0,

    /// Radix root pointer 0.
    Rtp0,
    /// Radix root pointer 0, upper half.
    Rtp0Hi,
    /// Radix root pointer 1.
    Rtp1,
    /// Radix root pointer 1, upper half.
    Rtp1Hi,
    /// Radix control (enable, KU).
    Ctrl,
    /// Radix translation-table base control.
    Ttbcr,
    /// Radix fault status (read-only).
    FaultStatus,
}

impl AuxReg {
    /// Returns the architectural register name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Build => "MMU_BUILD",
            Self::TlbCommand => "TLBCOMMAND",
            Self::TlbPd0 => "TLBPD0",
            Self::TlbPd1 => "TLBPD1",
            Self::TlbPd1Hi => "TLBPD1_HI",
            Self::TlbIndex => "TLBINDEX",
            Self::Pid => "PID",
            Self::Sasid0 => "SASID0",
            Self::Sasid1 => "SASID1",
            Self::ScratchData0 => "SCRATCH_DATA0",
            Self::Rtp0 => "MMU_RTP0",
            Self::Rtp0Hi => "MMU_RTP0HI",
            Self::Rtp1 => "MMU_RTP1",
            Self::Rtp1Hi => "MMU_RTP1HI",
            Self::Ctrl => "MMU_CTRL",
            Self::Ttbcr => "MMU_TTBCR",
            Self::FaultStatus => "MMU_FAULT_STATUS",
        }
    }
}

impl fmt::Display for AuxReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
