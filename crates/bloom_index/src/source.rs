//! Opening indexed files: compression sniffing and line-oriented readers.
use crate::errors::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, warn};

pub const HEADER_LEN: usize = 20;

const MAGIC_GZIP: &[u8] = &[0x1f, 0x8b];
const MAGIC_ZSTD: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const MAGIC_XZ: &[u8] = &[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
    Xz,
}

impl Compression {
    pub fn detect(header: &[u8]) -> Self {
        if header.starts_with(MAGIC_GZIP) {
            Compression::Gzip
        } else if header.starts_with(MAGIC_ZSTD) {
            Compression::Zstd
        } else if header.starts_with(MAGIC_XZ) {
            Compression::Xz
        } else {
            Compression::None
        }
    }
}

fn read_header(f: &mut File, buf: &mut [u8; HEADER_LEN]) -> io::Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match f.read(&mut buf[n..])? {
            0 => break,
            k => n += k,
        }
    }
    Ok(n)
}

/// A header that is not UTF-8 only because it was cut mid-character still counts as text.
fn looks_like_text(header: &[u8]) -> bool {
    match std::str::from_utf8(header) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// Open `path` for line-by-line reading, decoding gzip, zstd and xz
/// transparently.
///
/// Everything is streamed; the size reported by the filesystem is never
/// trusted, since files may shrink or grow while they are read.
pub fn open_lines(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let mut f = File::open(path)?;
    let mut header = [0u8; HEADER_LEN];
    let n = read_header(&mut f, &mut header)?;
    f.seek(SeekFrom::Start(0))?;
    let header = &header[..n];

    match Compression::detect(header) {
        Compression::Zstd => {
            debug!("zstd compression detected: {}", path.display());
            Ok(Box::new(BufReader::new(zstd::Decoder::new(f)?)))
        }
        Compression::Gzip => {
            debug!("gzip compression detected: {}", path.display());
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(f))))
        }
        Compression::Xz => {
            debug!("xz compression detected: {}", path.display());
            Ok(Box::new(BufReader::new(xz2::read::XzDecoder::new_multi_decoder(f))))
        }
        Compression::None => {
            if looks_like_text(header) {
                debug!("No compression detected: {}", path.display());
            } else {
                warn!("No compression detected, but file header is not utf-8? {:?}", header);
            }
            Ok(Box::new(BufReader::new(f)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lines_of(path: &Path) -> Vec<Vec<u8>> {
        open_lines(path).unwrap().split(b'\n').map(|l| l.unwrap()).collect()
    }

    #[test]
    fn detects_magic_numbers() {
        assert_eq!(Compression::detect(&[0x1f, 0x8b, 0x08]), Compression::Gzip);
        assert_eq!(Compression::detect(&[0x28, 0xb5, 0x2f, 0xfd, 0x00]), Compression::Zstd);
        assert_eq!(
            Compression::detect(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00, 0x00]),
            Compression::Xz
        );
        assert_eq!(Compression::detect(b"hello world"), Compression::None);
        assert_eq!(Compression::detect(b""), Compression::None);
    }

    #[test]
    fn truncated_multibyte_header_is_text() {
        let s = "aaaaaaaaaaaaaaaaaaaé".as_bytes();
        assert!(looks_like_text(&s[..20]));
        assert!(!looks_like_text(&[0xff, 0xfe, 0x00]));
    }

    #[test]
    fn plain_file_lines() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"first line\nsecond\n").unwrap();
        assert_eq!(lines_of(f.path()), vec![b"first line".to_vec(), b"second".to_vec()]);
    }

    #[test]
    fn zstd_file_is_decoded() {
        let mut f = NamedTempFile::new().unwrap();
        let packed = zstd::encode_all(&b"compressed\ncontent\n"[..], 3).unwrap();
        f.write_all(&packed).unwrap();
        assert_eq!(lines_of(f.path()), vec![b"compressed".to_vec(), b"content".to_vec()]);
    }

    #[test]
    fn gzip_file_is_decoded() {
        let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        gz.write_all(b"gzipped\nlines\n").unwrap();
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&gz.finish().unwrap()).unwrap();
        assert_eq!(lines_of(f.path()), vec![b"gzipped".to_vec(), b"lines".to_vec()]);
    }

    #[test]
    fn concatenated_gzip_members_are_all_read() {
        let mut packed = Vec::new();
        for part in [&b"one\n"[..], &b"two\n"[..]] {
            let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
            gz.write_all(part).unwrap();
            packed.extend(gz.finish().unwrap());
        }
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&packed).unwrap();
        assert_eq!(lines_of(f.path()), vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn xz_file_is_decoded() {
        let mut xz = xz2::write::XzEncoder::new(Vec::new(), 6);
        xz.write_all(b"xz\npacked\n").unwrap();
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(&xz.finish().unwrap()).unwrap();
        assert_eq!(lines_of(f.path()), vec![b"xz".to_vec(), b"packed".to_vec()]);
    }

    #[test]
    fn file_truncated_while_reading_ends_early() {
        let mut f = NamedTempFile::new().unwrap();
        for i in 0..100_000 {
            writeln!(f, "log line number {i}").unwrap();
        }
        f.flush().unwrap();
        let mut reader = open_lines(f.path()).unwrap();
        f.as_file().set_len(0).unwrap();

        let mut seen = 0usize;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).unwrap() == 0 {
                break;
            }
            seen += 1;
        }
        assert!(seen < 100_000);
    }

    #[test]
    fn empty_file_has_no_lines() {
        let f = NamedTempFile::new().unwrap();
        assert!(lines_of(f.path()).is_empty());
    }
}
