//! Bit-level view over a caller-owned byte buffer.
//!
//! Bit `i` lives in byte `i / 8` at position `i % 8`, bit 0 being the least
//! significant bit of that byte. Capacity is always `8 * len` bits; nothing here
//! grows, shrinks or clears the buffer.
use crate::consts::BITS_PER_BYTE;
use crate::errors::{BloomError, Result};

#[inline]
pub fn capacity_bits(bytes: &[u8]) -> u64 {
    bytes.len() as u64 * BITS_PER_BYTE
}

#[inline]
fn locate(bytes: &[u8], index: u64) -> Result<(usize, u8)> {
    let capacity = capacity_bits(bytes);
    if index >= capacity {
        return Err(BloomError::OutOfRange { index, capacity });
    }
    Ok(((index / BITS_PER_BYTE) as usize, 1u8 << (index & 7)))
}

/// Set bit `index` to 1. Already-set bits are left as they are.
#[inline]
pub fn set_bit(bytes: &mut [u8], index: u64) -> Result<()> {
    let (idx, mask) = locate(bytes, index)?;
    bytes[idx] |= mask;
    Ok(())
}

#[inline]
pub fn test_bit(bytes: &[u8], index: u64) -> Result<bool> {
    let (idx, mask) = locate(bytes, index)?;
    Ok(bytes[idx] & mask != 0)
}

pub fn count_ones(bytes: &[u8]) -> u64 {
    bytes.iter().map(|b| b.count_ones() as u64).sum()
}

/// True when every bit set in `needle` is also set in `haystack`.
pub fn is_subset(needle: &[u8], haystack: &[u8]) -> Result<bool> {
    if needle.len() != haystack.len() {
        return Err(BloomError::InvalidArgument(format!(
            "bit arrays differ in size: {} vs {} bytes",
            needle.len(),
            haystack.len()
        )));
    }
    Ok(needle.iter().zip(haystack).all(|(&n, &h)| h & n == n))
}

/// Mutable view borrowed for the duration of one insertion.
#[derive(Debug)]
pub struct BitArray<'a> {
    bytes: &'a mut [u8],
}

impl<'a> BitArray<'a> {
    /// Wrap `bytes`; a zero-length buffer has no addressable bit and is rejected.
    pub fn new(bytes: &'a mut [u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(BloomError::InvalidArgument(
                "bit array capacity must be greater than zero".into(),
            ));
        }
        Ok(Self { bytes })
    }

    pub fn capacity_bits(&self) -> u64 {
        capacity_bits(&*self.bytes)
    }

    pub fn set(&mut self, index: u64) -> Result<()> {
        set_bit(self.bytes, index)
    }

    pub fn test(&self, index: u64) -> Result<bool> {
        test_bit(&*self.bytes, index)
    }

    pub fn count_ones(&self) -> u64 {
        count_ones(&*self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &*self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_bit_addresses_lsb_first() {
        let mut buf = [0u8; 2];
        set_bit(&mut buf, 0).unwrap();
        assert_eq!(buf, [0x01, 0x00]);
        set_bit(&mut buf, 7).unwrap();
        assert_eq!(buf, [0x81, 0x00]);
        set_bit(&mut buf, 9).unwrap();
        assert_eq!(buf, [0x81, 0x02]);
    }

    #[test]
    fn set_is_monotonic_and_idempotent() {
        let mut buf = [0u8; 1];
        set_bit(&mut buf, 3).unwrap();
        set_bit(&mut buf, 3).unwrap();
        assert_eq!(buf, [0x08]);
        assert!(test_bit(&buf, 3).unwrap());
        assert!(!test_bit(&buf, 2).unwrap());
    }

    #[test]
    fn out_of_range_is_reported() {
        let mut buf = [0u8; 4];
        assert_eq!(
            set_bit(&mut buf, 32),
            Err(BloomError::OutOfRange { index: 32, capacity: 32 })
        );
        assert!(matches!(test_bit(&[], 0), Err(BloomError::OutOfRange { capacity: 0, .. })));
        assert_eq!(buf, [0u8; 4]);
    }

    #[test]
    fn count_ones_per_byte() {
        assert_eq!(count_ones(b""), 0);
        assert_eq!(count_ones(b"\x00"), 0);
        assert_eq!(count_ones(b"\x01"), 1);
        assert_eq!(count_ones(b"\x03"), 2);
        assert_eq!(count_ones(b"\x1f"), 5);
        assert_eq!(count_ones(b"\xf1"), 5);
        assert_eq!(count_ones(b"\xff"), 8);
        assert_eq!(count_ones(b"\x00\xff\x00"), 8);
    }

    #[test]
    fn subset_checks_every_needle_bit() {
        assert!(is_subset(&[0x00, 0x00], &[0x12, 0x00]).unwrap());
        assert!(is_subset(&[0x02, 0x80], &[0x03, 0x81]).unwrap());
        assert!(!is_subset(&[0x04, 0x00], &[0x03, 0x81]).unwrap());
        assert!(matches!(is_subset(&[0], &[0, 0]), Err(BloomError::InvalidArgument(_))));
    }

    #[test]
    fn view_rejects_empty_buffer() {
        let mut empty: [u8; 0] = [];
        assert!(matches!(BitArray::new(&mut empty), Err(BloomError::InvalidArgument(_))));

        let mut buf = [0u8; 8];
        let mut view = BitArray::new(&mut buf).unwrap();
        assert_eq!(view.capacity_bits(), 64);
        view.set(21).unwrap();
        assert!(view.test(21).unwrap());
        assert_eq!(view.count_ones(), 1);
        assert_eq!(view.as_bytes()[2], 0x20);
    }
}
