use crate::errors::{IndexError, Result};
use bloom_core::HashVariant;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_ARRAY_BYTES: usize = 1 << 20;
pub const DEFAULT_SAMPLE_SIZES: [usize; 3] = [4, 5, 6];

fn default_sample_sizes() -> Vec<usize> {
    DEFAULT_SAMPLE_SIZES.to_vec()
}

fn default_array_bytes() -> usize {
    DEFAULT_ARRAY_BYTES
}

/// How files are fingerprinted. The hash variant and sample sizes are part of
/// the cache key, so changing either forces affected files to be re-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(with = "variant_serde", default)]
    pub variant: HashVariant,
    #[serde(default = "default_sample_sizes")]
    pub sample_sizes: Vec<usize>,
    /// Size of a freshly built file array. Cached arrays keep the size they
    /// were built with.
    #[serde(default = "default_array_bytes")]
    pub array_bytes: usize,
}

mod variant_serde {
    use bloom_core::HashVariant;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &HashVariant, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.name())
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<HashVariant, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            variant: HashVariant::Fnv1a64,
            sample_sizes: default_sample_sizes(),
            array_bytes: DEFAULT_ARRAY_BYTES,
        }
    }
}

impl IndexConfig {
    /// Load a JSON config; missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let cfg: IndexConfig = serde_json::from_reader(reader)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_sizes.is_empty() {
            return Err(IndexError::InvalidConfig("at least one sample size is required".into()));
        }
        if self.sample_sizes.contains(&0) {
            return Err(IndexError::InvalidConfig("sample sizes must be greater than zero".into()));
        }
        if self.array_bytes == 0 {
            return Err(IndexError::InvalidConfig("array size must be greater than zero".into()));
        }
        Ok(())
    }

    /// `size:mtime:hash:sizes`, e.g. `120:1700000000000000000:fnv1a_64:4,5,6`.
    pub fn cache_key(&self, size: u64, mtime: i128) -> String {
        let sizes = self
            .sample_sizes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{size}:{mtime}:{}:{sizes}", self.variant)
    }
}
