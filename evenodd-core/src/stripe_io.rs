use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::layout::{Header, HEADER_LEN};

/// Cap on the summed size of all write buffers of one pipeline.
const MAX_IO_BUFFER_TOTAL: usize = 1 << 28;

/// Cap on a single write buffer.
const MAX_IO_BUFFER_PER: usize = 1 << 20;

/// Buffer capacity for one of `streams` concurrently open writers, keeping
/// the summed buffering under the total cap.
pub fn buffer_capacity(streams: usize) -> usize {
    (MAX_IO_BUFFER_TOTAL / streams.max(1)).clamp(4096, MAX_IO_BUFFER_PER)
}

/// Copy little-endian bytes into words, zero-filling past the end of `src`.
fn fill_words(dst: &mut [u64], src: &[u8]) {
    let mut off = 0usize;
    for w in dst.iter_mut() {
        *w = if off + 8 <= src.len() {
            u64::from_le_bytes(src[off..off + 8].try_into().unwrap())
        } else if off < src.len() {
            let mut tail = [0u8; 8];
            tail[..src.len() - off].copy_from_slice(&src[off..]);
            u64::from_le_bytes(tail)
        } else {
            0
        };
        off += 8;
    }
}

fn map_file(path: &Path) -> Result<Option<Mmap>> {
    let f = File::open(path).with_context(|| format!("open {:?}", path))?;
    // A zero-length file cannot be mapped; it also has nothing to read.
    if f.metadata()?.len() == 0 {
        return Ok(None);
    }
    let map = unsafe { Mmap::map(&f) }.with_context(|| format!("map {:?}", path))?;
    Ok(Some(map))
}

/// Streams the input file as zero-padded stripe data columns.
pub struct StripeReader {
    map: Option<Mmap>,
    off: usize,
}

impl StripeReader {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self { map: map_file(path)?, off: 0 })
    }

    /// Fill `dst` with the next input words, zeros past end of file.
    pub fn read_column(&mut self, dst: &mut [u64]) {
        let src: &[u8] = match &self.map {
            Some(m) => &m[self.off.min(m.len())..],
            None => &[],
        };
        fill_words(dst, src);
        self.off += dst.len() * 8;
    }
}

/// Reads one disk's column stream, past the 8-byte header.
pub struct DiskColumnReader {
    map: Option<Mmap>,
    off: usize,
}

impl DiskColumnReader {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self { map: map_file(path)?, off: HEADER_LEN as usize })
    }

    /// Next (p-1)-word column; zeros past end of file.
    pub fn read_column(&mut self, dst: &mut [u64]) {
        let src: &[u8] = match &self.map {
            Some(m) => &m[self.off.min(m.len())..],
            None => &[],
        };
        fill_words(dst, src);
        self.off += dst.len() * 8;
    }
}

/// Writes one disk's copy: the header word, then one column per stripe.
pub struct DiskColumnWriter {
    out: BufWriter<File>,
}

impl DiskColumnWriter {
    /// Create `path` (and its parent directories) and write the header.
    pub fn create(path: &Path, header: Header, buf_capacity: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {:?}", parent))?;
        }
        let f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("create {:?}", path))?;
        let mut out = BufWriter::with_capacity(buf_capacity, f);
        out.write_all(&header.pack().to_le_bytes())?;
        Ok(Self { out })
    }

    pub fn write_column(&mut self, col: &[u64]) -> Result<()> {
        for w in col {
            self.out.write_all(&w.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.out.flush().context("flush disk column")?;
        Ok(())
    }
}

/// Writes decoded words and truncates to the original byte length.
pub struct ByteWriter {
    out: BufWriter<File>,
    limit: u64,
}

impl ByteWriter {
    pub fn create(path: &Path, limit: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {:?}", parent))?;
        }
        let f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("create {:?}", path))?;
        Ok(Self { out: BufWriter::with_capacity(buffer_capacity(1), f), limit })
    }

    pub fn write_words(&mut self, words: &[u64]) -> Result<()> {
        for w in words {
            self.out.write_all(&w.to_le_bytes())?;
        }
        Ok(())
    }

    /// Flush and cut the zero padding of the final stripe.
    pub fn finish(mut self) -> Result<()> {
        self.out.flush().context("flush output")?;
        self.out.get_ref().set_len(self.limit).context("truncate output")?;
        Ok(())
    }
}
