//! LED flash configuration wire format
//!
//! A flash loop is described by a fixed-layout record: a 4-byte header
//! (reserved, flags, priority, id — one byte each) followed by up to
//! [`MAX_LED_PATTERNS`] big-endian 16-bit pattern entries. The
//! transmitted length is exactly `4 + entry_count * 2` bytes, so partial
//! pattern arrays are supported by truncating the transmitted length.

use zerocopy::byteorder::big_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{StmError, StmResult};

/// Maximum number of pattern entries the staging record can hold.
///
/// Callers supplying more entries than this are in violation of the
/// interface contract and get [`StmError::Invalid`] back.
pub const MAX_LED_PATTERNS: usize = 32;

/// Size of the record header, in bytes.
pub const LED_FLASH_HEADER_LEN: usize = 4;

/// LED flash behaviour flags.
///
/// Packed into the second header byte.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct LedFlags(u8);

impl LedFlags {
    /// No flags.
    pub const NONE: Self = Self(0);

    /// The pattern entries are caller-supplied rather than one of the
    /// service's built-in loops.
    pub const USER: Self = Self(1 << 0);

    /// Raw flag bits as transmitted.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reconstruct flags from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Check whether all flags in `other` are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// These flags with the flags in `other` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl core::fmt::Debug for LedFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.contains(Self::USER) {
            write!(f, "LedFlags(USER")?;
        } else {
            write!(f, "LedFlags(")?;
        }
        let rest = self.without(Self::USER).bits();
        if rest != 0 {
            write!(f, "|{rest:#04x}")?;
        }
        write!(f, ")")
    }
}

/// On-wire flash configuration record.
///
/// Only the first `LED_FLASH_HEADER_LEN + count * 2` bytes are
/// transmitted; the rest of the staging buffer is never sent.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
struct LedFlashConfig {
    reserved: u8,
    flags: u8,
    priority: u8,
    id: u8,
    patterns: [U16; MAX_LED_PATTERNS],
}

const _: () = assert!(
    core::mem::size_of::<LedFlashConfig>() == LED_FLASH_HEADER_LEN + 2 * MAX_LED_PATTERNS
);
const _: () = assert!(core::mem::offset_of!(LedFlashConfig, patterns) == LED_FLASH_HEADER_LEN);

/// A validated, encoded flash-loop request.
pub struct LedFlashRequest {
    config: LedFlashConfig,
    count: usize,
}

impl LedFlashRequest {
    /// Build a flash-loop request, normalising the user-pattern flag.
    ///
    /// If [`LedFlags::USER`] is set and a pattern slice is supplied, the
    /// entries are staged for transmission. Otherwise the entry count is
    /// forced to zero and the USER flag cleared regardless of what the
    /// caller passed; the service then falls back to its built-in loop
    /// for `id`.
    pub fn new(
        id: u8,
        priority: u8,
        flags: LedFlags,
        patterns: Option<&[u16]>,
    ) -> StmResult<Self> {
        let (flags, entries) = match patterns {
            Some(entries) if flags.contains(LedFlags::USER) => (flags, entries),
            _ => (flags.without(LedFlags::USER), &[][..]),
        };

        if entries.len() > MAX_LED_PATTERNS {
            return Err(StmError::Invalid);
        }

        let mut config = LedFlashConfig {
            reserved: 0,
            flags: flags.bits(),
            priority,
            id,
            patterns: [U16::ZERO; MAX_LED_PATTERNS],
        };
        for (slot, &entry) in config.patterns.iter_mut().zip(entries) {
            *slot = U16::new(entry);
        }

        Ok(Self {
            config,
            count: entries.len(),
        })
    }

    /// Number of pattern entries that will be transmitted.
    #[inline]
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.count
    }

    /// Flags as they will be transmitted (after normalisation).
    #[inline]
    #[must_use]
    pub fn flags(&self) -> LedFlags {
        LedFlags::from_bits(self.config.flags)
    }

    /// Total transmitted length in bytes.
    #[inline]
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        LED_FLASH_HEADER_LEN + self.count * 2
    }

    /// The bytes to transmit: the header plus exactly the staged entries.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.config.as_bytes()[..self.encoded_len()]
    }
}

impl core::fmt::Debug for LedFlashRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedFlashRequest")
            .field("id", &self.config.id)
            .field("priority", &self.config.priority)
            .field("flags", &self.flags())
            .field("pattern_count", &self.count)
            .finish()
    }
}
