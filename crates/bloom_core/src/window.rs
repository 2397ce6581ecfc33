//! Sliding-window (k-gram) fingerprints folded into a Bloom bit array.
//!
//! Every window `data[o..o + w]` with `0 <= o <= len - w` is hashed on its own
//! and the digest, reduced modulo the array's bit capacity, is set. Inserting is
//! a set union over window digests: repeating it, or visiting windows in another
//! order, yields the same array.
use crate::bits::{capacity_bits, BitArray};
use crate::errors::{BloomError, Result};
use crate::hash::HashVariant;

fn check_args(bits: &[u8], window: usize) -> Result<u64> {
    if window == 0 {
        return Err(BloomError::InvalidArgument("window size must be greater than zero".into()));
    }
    let capacity = capacity_bits(bits);
    if capacity == 0 {
        return Err(BloomError::InvalidArgument(
            "bit array capacity must be greater than zero".into(),
        ));
    }
    Ok(capacity)
}

/// Bit index for one window.
#[inline]
pub fn window_index(variant: HashVariant, window: &[u8], capacity_bits: u64) -> u64 {
    variant.digest(window) % capacity_bits
}

/// Number of full windows of length `window` in `len` bytes.
#[inline]
pub fn window_count(len: usize, window: usize) -> usize {
    if window == 0 || len < window { 0 } else { len - window + 1 }
}

/// Set the bit of every `window`-byte window of `data`.
///
/// Arguments are validated before the array is touched. Data shorter than one
/// window is a no-op.
pub fn insert_windows(
    variant: HashVariant,
    bits: &mut [u8],
    data: &[u8],
    window: usize,
) -> Result<()> {
    let capacity = check_args(bits, window)?;
    let mut view = BitArray::new(bits)?;
    for w in data.windows(window) {
        view.set(window_index(variant, w, capacity))?;
    }
    Ok(())
}

pub fn insert_bloom32(bits: &mut [u8], data: &[u8], window: usize) -> Result<()> {
    insert_windows(HashVariant::Fnv1a32, bits, data, window)
}

pub fn insert_bloom64(bits: &mut [u8], data: &[u8], window: usize) -> Result<()> {
    insert_windows(HashVariant::Fnv1a64, bits, data, window)
}

/// Membership query: whether every window of `data` has its bit set.
///
/// `false` is definite; `true` may be a false positive. Data shorter than one
/// window has no windows and is vacuously contained.
pub fn contains_windows(
    variant: HashVariant,
    bits: &[u8],
    data: &[u8],
    window: usize,
) -> Result<bool> {
    let capacity = check_args(bits, window)?;
    for w in data.windows(window) {
        if !crate::bits::test_bit(bits, window_index(variant, w, capacity))? {
            return Ok(false);
        }
    }
    Ok(true)
}
