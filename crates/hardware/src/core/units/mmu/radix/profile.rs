//! Radix page-table geometry profiles.
//!
//! Each profile fixes the shape of the translation tables for the lifetime of an
//! MMU instance. This module captures, per profile:
//! 1. **Shape:** Virtual-address width, number of levels, and index bits per level.
//! 2. **Root Handling:** How a root pointer is scaled and aligned, and how wide the
//!    address examined for root selection is.
//! 3. **Descriptor Rules:** Which descriptor encodings are legal at which level, and
//!    how a table descriptor encodes the next-level table address.
//!
//! Every behavioral difference between geometries lives here, so the walker never
//! re-dispatches on a version switch.

use std::fmt;

use crate::common::ConfigError;

/// Returns a mask of the low `bits` bits.
#[inline]
pub const fn low_mask(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// Selects one of the two root pointers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootSelect {
    /// Lower half of the address space (high bits all zero).
    Root0 = 0,
    /// Upper half of the address space (high bits all one).
    Root1 = 1,
}

impl RootSelect {
    /// Returns the root number (0 or 1).
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One of the five supported translation-table shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryProfile {
    /// 32-bit addresses, 4 KiB pages, 3 levels ({2, 9, 9}).
    Va32Page4K,
    /// 48-bit addresses, 4 KiB pages, 4 levels ({9, 9, 9, 9}).
    Va48Page4K,
    /// 48-bit addresses, 16 KiB pages, 4 levels ({1, 11, 11, 11}).
    Va48Page16K,
    /// 48-bit addresses, 64 KiB pages, 3 levels ({6, 13, 13}).
    Va48Page64K,
    /// 52-bit addresses, 64 KiB pages, 3 levels ({10, 13, 13}).
    Va52Page64K,
}

impl GeometryProfile {
    /// Every supported profile.
    pub const ALL: [Self; 5] = [
        Self::Va32Page4K,
        Self::Va48Page4K,
        Self::Va48Page16K,
        Self::Va48Page64K,
        Self::Va52Page64K,
    ];

    /// Parses a configuration-time profile name (`32_4k`, `48_4k`, ...).
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_owned()))
    }

    /// Returns the configuration-time name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Va32Page4K => "32_4k",
            Self::Va48Page4K => "48_4k",
            Self::Va48Page16K => "48_16k",
            Self::Va48Page64K => "48_64k",
            Self::Va52Page64K => "52_64k",
        }
    }

    /// Returns the index width consumed at each level, top level first.
    pub const fn level_bits(self) -> &'static [u32] {
        match self {
            Self::Va32Page4K => &[2, 9, 9],
            Self::Va48Page4K => &[9, 9, 9, 9],
            Self::Va48Page16K => &[1, 11, 11, 11],
            Self::Va48Page64K => &[6, 13, 13],
            Self::Va52Page64K => &[10, 13, 13],
        }
    }

    /// Returns the number of table levels.
    pub const fn levels(self) -> usize {
        self.level_bits().len()
    }

    /// Returns the index of the last table level.
    pub const fn last_level(self) -> usize {
        self.levels() - 1
    }

    /// Returns the translated virtual-address width in bits.
    pub const fn vaddr_bits(self) -> u32 {
        match self {
            Self::Va32Page4K => 32,
            Self::Va48Page4K | Self::Va48Page16K | Self::Va48Page64K => 48,
            Self::Va52Page64K => 52,
        }
    }

    /// Returns log2 of the smallest page size.
    pub const fn page_shift(self) -> u32 {
        match self {
            Self::Va32Page4K | Self::Va48Page4K => 12,
            Self::Va48Page16K => 14,
            Self::Va48Page64K | Self::Va52Page64K => 16,
        }
    }

    /// Returns the `type` field reported in the BUILD register.
    pub const fn build_type(self) -> u64 {
        match self {
            Self::Va32Page4K => 0,
            Self::Va48Page4K => 1,
            Self::Va48Page16K => 2,
            Self::Va48Page64K => 3,
            Self::Va52Page64K => 4,
        }
    }

    /// Returns true if a block descriptor may appear at the top level.
    pub const fn allows_top_level_block(self) -> bool {
        matches!(self, Self::Va52Page64K)
    }

    /// Width of the address examined when selecting a root pointer.
    pub const fn root_select_width(self) -> u32 {
        match self {
            Self::Va32Page4K => 32,
            _ => 64,
        }
    }

    /// Number of address bits still untranslated after consuming `level`.
    pub fn remaining_bits(self, level: usize) -> u32 {
        let consumed: u32 = self.level_bits().iter().take(level + 1).sum();
        self.vaddr_bits().saturating_sub(consumed)
    }

    /// Extracts the table index used at `level` for `vaddr`.
    pub fn level_index(self, vaddr: u64, level: usize) -> u64 {
        let bits = self.level_bits().get(level).copied().unwrap_or(0);
        (vaddr >> self.remaining_bits(level)) & low_mask(bits)
    }

    /// Returns the alignment (log2) the root table must honor.
    ///
    /// `tnsz` is the split width configured for the same root in TTBCR.
    pub const fn root_alignment(self, root: RootSelect, tnsz: u32) -> u32 {
        match self {
            Self::Va32Page4K => {
                if tnsz > 1 {
                    14u32.saturating_sub(tnsz)
                } else {
                    5u32.saturating_sub(tnsz)
                }
            }
            Self::Va48Page4K => 12,
            Self::Va48Page16K => match root {
                RootSelect::Root0 => 4,
                RootSelect::Root1 => 6,
            },
            Self::Va48Page64K => match root {
                RootSelect::Root0 => 9,
                RootSelect::Root1 => 13,
            },
            Self::Va52Page64K => match root {
                RootSelect::Root0 => 13,
                RootSelect::Root1 => 16,
            },
        }
    }

    /// Computes the physical base of the root table from an RTP register value.
    pub const fn root_address(self, rtp: u64, root: RootSelect, tnsz: u32) -> u64 {
        let scaled = match self {
            Self::Va52Page64K => rtp << 4,
            _ => rtp,
        };
        scaled & low_mask(self.vaddr_bits()) & !low_mask(self.root_alignment(root, tnsz))
    }

    /// Decodes the next-level table address held in a table descriptor.
    ///
    /// Reserved descriptor bits are assumed to be zero.
    pub const fn next_table_address(self, pte: u64) -> u64 {
        match self {
            Self::Va52Page64K => ((pte & 0xf000) << 36) | (pte & 0x0000_ffff_ffff_0000),
            _ => pte & 0x0000_ffff_ffff_f000,
        }
    }

    /// Returns true if `pte` is not a legal descriptor at `level`.
    ///
    /// The valid bit must be set; the type bit must be set at the last level
    /// and, unless top-level blocks are allowed, at the top level too.
    pub const fn rejects(self, pte: u64, level: usize) -> bool {
        let valid = pte & 0b01 != 0;
        let typed = pte & 0b10 != 0;
        !valid
            || (!typed && level == 0 && !self.allows_top_level_block())
            || (!typed && level == self.last_level())
    }
}

impl fmt::Display for GeometryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
