//! Windowed FNV-1a fingerprints recorded in a caller-owned Bloom bit array.
//!
//! No I/O and no allocation of the bit array happen here; callers own the
//! buffer and lend it for one insertion at a time.
pub mod bits;
pub mod consts;
pub mod errors;
pub mod hash;
pub mod window;

pub use bits::{count_ones, is_subset, set_bit, test_bit, BitArray};
pub use errors::{BloomError, Result};
pub use hash::{fnv1a_32, fnv1a_64, HashVariant};
pub use window::{contains_windows, insert_bloom32, insert_bloom64, insert_windows};
