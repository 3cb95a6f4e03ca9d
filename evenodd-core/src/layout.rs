use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Largest supported prime parameter; also bounds the disk probe loop when
/// `p` is not yet known.
pub const MAX_P: usize = 100;

/// Bytes of the per-disk header word.
pub const HEADER_LEN: u64 = 8;

/// Bytes per stripe cell.
pub const WORD: u64 = 8;

/// Per-disk file header: the original byte length and the prime, packed into
/// a single little-endian u64 as `(size << 8) | p`. Every disk carries the
/// same header, so any one surviving copy recovers both values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub file_size: u64,
    pub p: usize,
}

impl Header {
    pub fn pack(&self) -> u64 {
        (self.file_size << 8) | self.p as u64
    }

    pub fn unpack(word: u64) -> Self {
        Self { file_size: word >> 8, p: (word & 0xFF) as usize }
    }

    /// Read the header word from the start of a disk file.
    pub fn read_from(path: &Path) -> Result<Self> {
        let mut f = std::fs::File::open(path).with_context(|| format!("open {:?}", path))?;
        let mut buf = [0u8; HEADER_LEN as usize];
        f.read_exact(&mut buf).with_context(|| format!("read header of {:?}", path))?;
        Ok(Self::unpack(u64::from_le_bytes(buf)))
    }
}

/// `disk_<d>` directory under `root`.
pub fn disk_dir(root: &Path, d: usize) -> PathBuf {
    root.join(format!("disk_{}", d))
}

/// Per-disk copy of the logical file `name`.
pub fn disk_path(root: &Path, d: usize, name: &Path) -> PathBuf {
    disk_dir(root, d).join(name)
}

/// Number of words covering `n` bytes.
pub fn word_count(n: u64) -> u64 {
    n.div_ceil(WORD)
}

/// Data words consumed by one stripe.
pub fn stripe_words(p: usize) -> usize {
    p * (p - 1)
}

/// Stripes needed to encode an `n`-byte file.
pub fn stripe_count(n: u64, p: usize) -> u64 {
    word_count(n).div_ceil(stripe_words(p) as u64)
}

/// Exact length of every per-disk file for an `n`-byte input.
pub fn column_file_len(n: u64, p: usize) -> u64 {
    HEADER_LEN + stripe_count(n, p) * (p as u64 - 1) * WORD
}

/// The prime parameter must be an odd prime within [3, MAX_P].
pub fn validate_p(p: usize) -> Result<()> {
    if p < 3 || p > MAX_P || p % 2 == 0 {
        bail!("p must be an odd prime in 3..={}, got {}", MAX_P, p);
    }
    let mut d = 3;
    while d * d <= p {
        if p % d == 0 {
            bail!("p must be prime, got {}", p);
        }
        d += 2;
    }
    Ok(())
}
