//! On-disk cache of file arrays, one entry file per indexed path.
//!
//! Entry layout (LE):
//!   magic[4]    = "BLMA"
//!   version[2]  = 1
//!   created[8]  = unix seconds
//!   key_len[4], key[key_len]          = cache key (see `IndexConfig::cache_key`)
//!   payload_len[4], payload[...]      = zstd(array)
//!   crc[4]      = crc32(key ‖ payload)
//!
//! Entries are written to a temp file in the store directory and atomically
//! renamed into place, so readers never observe a half-written entry.
use crate::errors::{IndexError, Result};
use crate::utils::{crc32, fsync_dir, now_ts, read_i64, read_u16, read_u32, write_i64, write_u16, write_u32};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MAGIC_ARRAY: &[u8; 4] = b"BLMA";
pub const STORE_VERSION: u16 = 1;
const ENTRY_EXT: &str = "blma";
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArray {
    pub key: String,
    pub created: i64,
    pub array: Vec<u8>,
}

fn eof_is_corrupt(e: io::Error) -> IndexError {
    if e.kind() == io::ErrorKind::UnexpectedEof { IndexError::Corrupt } else { IndexError::Io(e) }
}

fn read_exact_vec(r: &mut &[u8], len: usize) -> Result<Vec<u8>> {
    if r.len() < len {
        return Err(IndexError::Corrupt);
    }
    let (head, tail) = r.split_at(len);
    *r = tail;
    Ok(head.to_vec())
}

pub fn encode_entry(key: &str, created: i64, array: &[u8]) -> Result<Vec<u8>> {
    let payload = zstd::encode_all(array, ZSTD_LEVEL)?;
    let mut out = Vec::with_capacity(payload.len() + key.len() + 26);
    out.extend_from_slice(MAGIC_ARRAY);
    write_u16(&mut out, STORE_VERSION)?;
    write_i64(&mut out, created)?;
    write_u32(&mut out, key.len() as u32)?;
    out.extend_from_slice(key.as_bytes());
    write_u32(&mut out, payload.len() as u32)?;
    out.extend_from_slice(&payload);
    write_u32(&mut out, crc32(&[key.as_bytes(), &payload[..]]))?;
    debug!(
        "Array compression: {:.2} kB -> {:.2} kB",
        array.len() as f64 / 1024.0,
        payload.len() as f64 / 1024.0
    );
    Ok(out)
}

pub fn decode_entry(mut bytes: &[u8]) -> Result<StoredArray> {
    let r = &mut bytes;
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic).map_err(|_| IndexError::BadHeader)?;
    if &magic != MAGIC_ARRAY {
        return Err(IndexError::BadHeader);
    }
    if read_u16(r).map_err(|_| IndexError::BadHeader)? != STORE_VERSION {
        return Err(IndexError::BadHeader);
    }
    let created = read_i64(r).map_err(eof_is_corrupt)?;
    let key_len = read_u32(r).map_err(eof_is_corrupt)? as usize;
    let key = read_exact_vec(r, key_len)?;
    let payload_len = read_u32(r).map_err(eof_is_corrupt)? as usize;
    let payload = read_exact_vec(r, payload_len)?;
    let want = read_u32(r).map_err(eof_is_corrupt)?;
    if crc32(&[&key[..], &payload[..]]) != want {
        return Err(IndexError::Corrupt);
    }
    let key = String::from_utf8(key).map_err(|_| IndexError::Corrupt)?;
    let array = zstd::decode_all(&payload[..]).map_err(|_| IndexError::Corrupt)?;
    Ok(StoredArray { key, created, array })
}

#[derive(Debug, Clone)]
pub struct ArrayStore {
    dir: PathBuf,
}

impl ArrayStore {
    /// Open (or create) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            debug!("Creating directory {}", dir.display());
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, path: &Path) -> PathBuf {
        let name = blake3::hash(path.to_string_lossy().as_bytes()).to_hex();
        self.dir.join(format!("{name}.{ENTRY_EXT}"))
    }

    /// Stored entry for `path` regardless of its key.
    pub fn load(&self, path: &Path) -> Result<Option<StoredArray>> {
        let entry = self.entry_path(path);
        let bytes = match fs::read(&entry) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode_entry(&bytes).map(Some)
    }

    /// Cached array for `path`, only if it was stored under `key`.
    pub fn get(&self, path: &Path, key: &str) -> Result<Option<Vec<u8>>> {
        match self.load(path)? {
            Some(stored) if stored.key == key => Ok(Some(stored.array)),
            Some(stored) => {
                debug!("Stale entry for {} (key {} != {})", path.display(), stored.key, key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Replace whatever is stored for `path`.
    pub fn put(&self, path: &Path, key: &str, array: &[u8]) -> Result<()> {
        let final_path = self.entry_path(path);
        let bytes = encode_entry(key, now_ts(), array)?;
        let mut tmp = tempfile::Builder::new().prefix("blma_").tempfile_in(&self.dir)?;
        tmp.as_file_mut().write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&final_path)?;
        let _ = fsync_dir(&final_path);
        Ok(())
    }

    pub fn remove(&self, path: &Path) -> Result<bool> {
        match fs::remove_file(self.entry_path(path)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
