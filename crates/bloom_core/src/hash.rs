//! FNV-1a, 32- and 64-bit. Non-cryptographic: no seed, no collision resistance.
use crate::consts::{FNV32_OFFSET_BASIS, FNV32_PRIME, FNV64_OFFSET_BASIS, FNV64_PRIME};
use std::fmt;
use std::str::FromStr;

#[inline]
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter()
        .fold(FNV32_OFFSET_BASIS, |h, &b| (h ^ b as u32).wrapping_mul(FNV32_PRIME))
}

#[inline]
pub fn fnv1a_64(data: &[u8]) -> u64 {
    data.iter()
        .fold(FNV64_OFFSET_BASIS, |h, &b| (h ^ b as u64).wrapping_mul(FNV64_PRIME))
}

/// Digest width used for window fingerprints.
///
/// The name is part of every cached array's key, so arrays built with one
/// variant are never compared against arrays built with the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashVariant {
    Fnv1a32,
    #[default]
    Fnv1a64,
}

impl HashVariant {
    /// Digest widened to `u64`; a 32-bit digest is zero-extended.
    #[inline]
    pub fn digest(self, data: &[u8]) -> u64 {
        match self {
            HashVariant::Fnv1a32 => fnv1a_32(data) as u64,
            HashVariant::Fnv1a64 => fnv1a_64(data),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashVariant::Fnv1a32 => "fnv1a_32",
            HashVariant::Fnv1a64 => "fnv1a_64",
        }
    }
}

impl fmt::Display for HashVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fnv1a_32" | "fnv1a32" => Ok(HashVariant::Fnv1a32),
            "fnv1a_64" | "fnv1a64" => Ok(HashVariant::Fnv1a64),
            other => Err(format!("unknown hash variant: {other}")),
        }
    }
}
