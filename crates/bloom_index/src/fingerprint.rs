//! Builds file and search-expression arrays from normalized lines.
use crate::config::IndexConfig;
use crate::errors::Result;
use bloom_core::bits::{capacity_bits, count_ones, is_subset};
use bloom_core::insert_windows;
use std::io::BufRead;
use std::time::Instant;
use tracing::debug;

#[inline]
fn is_trailing_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Strip trailing whitespace and lowercase. UTF-8 lines get full Unicode
/// lowercasing; anything else is lowercased byte-wise over ASCII only.
pub fn normalize_line(line: &[u8]) -> Vec<u8> {
    let end = line.iter().rposition(|&b| !is_trailing_space(b)).map_or(0, |i| i + 1);
    let line = &line[..end];
    match std::str::from_utf8(line) {
        Ok(s) => s.to_lowercase().into_bytes(),
        Err(_) => line.to_ascii_lowercase(),
    }
}

#[derive(Debug, Clone)]
pub struct Fingerprinter {
    config: IndexConfig,
}

impl Fingerprinter {
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Record every window of `line`, for every sample size, in `array`.
    pub fn insert_line(&self, array: &mut [u8], line: &[u8]) -> Result<()> {
        for &w in &self.config.sample_sizes {
            insert_windows(self.config.variant, array, line, w)?;
        }
        Ok(())
    }

    /// Fingerprint every line of `reader` into a new `array_bytes` array.
    pub fn file_array<R: BufRead>(&self, mut reader: R) -> Result<Vec<u8>> {
        let mut array = vec![0u8; self.config.array_bytes];
        let t0 = Instant::now();
        let mut total_bytes = 0usize;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            total_bytes += n;
            self.insert_line(&mut array, &normalize_line(&buf))?;
        }
        let pct_filled = 100.0 * count_ones(&array) as f64 / capacity_bits(&array) as f64;
        debug!(
            "Indexed {:.2} MB in {:.3} s, {:.0} kB array {:.1} % filled",
            total_bytes as f64 / (1 << 20) as f64,
            t0.elapsed().as_secs_f64(),
            array.len() as f64 / 1024.0,
            pct_filled
        );
        Ok(array)
    }

    /// Array for the search expressions, sized to match the file array it
    /// will be compared with.
    pub fn match_array<S: AsRef<str>>(&self, expressions: &[S], array_bytes: usize) -> Result<Vec<u8>> {
        let mut array = vec![0u8; array_bytes];
        for expr in expressions {
            let expr = expr.as_ref().to_lowercase();
            self.insert_line(&mut array, expr.as_bytes())?;
        }
        Ok(array)
    }
}

/// Whether a file may contain every expression of `match_array`.
///
/// `false` is definite. `true` may be a false positive, so callers confirm
/// with a real scan.
pub fn may_match(match_array: &[u8], file_array: &[u8]) -> Result<bool> {
    Ok(is_subset(match_array, file_array)?)
}
