use anyhow::{Context, Result};
use std::path::Path;

use crate::codec::EvenOdd;
use crate::discovery::{scan_disks, walk_disk};
use crate::layout::{disk_dir, disk_path, stripe_count, validate_p, Header, MAX_P};
use crate::progress::Progress;
use crate::stripe::Stripe;
use crate::stripe_io::{
    buffer_capacity, ByteWriter, DiskColumnReader, DiskColumnWriter, StripeReader,
};

/// Outcome of `decode_file`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    Decoded,
    /// No disk holds a copy of the file.
    Missing,
    /// More than two disks lost their copy.
    Corrupted,
}

/// Outcome of `repair_file` / `repair_disks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStatus {
    Repaired,
    TooManyErasures,
}

/// Encode `root/<name>` across `disk_0/<name> .. disk_{p+1}/<name>`.
pub fn encode_file(root: &Path, name: &Path, p: usize, progress: &Progress) -> Result<()> {
    let codec = EvenOdd::new(p)?;
    let input_path = root.join(name);
    let size = std::fs::metadata(&input_path)
        .with_context(|| format!("stat {:?}", input_path))?
        .len();
    let stripes = stripe_count(size, p);
    let header = Header { file_size: size, p };

    let mut input = StripeReader::open(&input_path)?;
    let buf_cap = buffer_capacity(p + 2);
    let mut writers = Vec::with_capacity(p + 2);
    for d in 0..p + 2 {
        writers.push(DiskColumnWriter::create(&disk_path(root, d, name), header, buf_cap)?);
    }

    progress.set_stage("encode");
    progress.set_total(stripes as usize);
    let mut stripe = Stripe::new(p);
    for _ in 0..stripes {
        for d in 0..p {
            input.read_column(stripe.col_mut(d));
        }
        codec.encode(&mut stripe)?;
        for (d, w) in writers.iter_mut().enumerate() {
            w.write_column(stripe.col(d))?;
        }
        progress.inc();
    }
    for w in writers {
        w.finish()?;
    }
    Ok(())
}

/// Reconstruct the original `name` into `root/<save_as>`. Repairs missing
/// data columns first when at most two disks are gone; parity-only losses
/// are read around without rewriting anything.
pub fn decode_file(root: &Path, name: &Path, save_as: &Path) -> Result<DecodeStatus> {
    // Bootstrap probe: p is unknown until a surviving header is found.
    let probe = scan_disks(root, name, MAX_P + 2);
    let first_ok = match probe.first_ok {
        Some(d) => d,
        None => return Ok(DecodeStatus::Missing),
    };
    if first_ok >= 3 {
        // At least three of the first p+2 copies are gone for any valid p.
        return Ok(DecodeStatus::Corrupted);
    }
    let header = Header::read_from(&disk_path(root, first_ok, name))?;
    validate_p(header.p)?;
    let (size, p) = (header.file_size, header.p);

    match repair_file_with(root, name, header, true, &Progress::new(false))? {
        RepairStatus::Repaired => {}
        RepairStatus::TooManyErasures => return Ok(DecodeStatus::Corrupted),
    }

    let mut readers = Vec::with_capacity(p);
    for d in 0..p {
        readers.push(DiskColumnReader::open(&disk_path(root, d, name))?);
    }
    let mut out = ByteWriter::create(&root.join(save_as), size)?;
    let mut col = vec![0u64; p - 1];
    for _ in 0..stripe_count(size, p) {
        for r in readers.iter_mut() {
            r.read_column(&mut col);
            out.write_words(&col)?;
        }
    }
    out.finish()?;
    Ok(DecodeStatus::Decoded)
}

/// Rebuild every missing disk copy of `name` from the survivors.
pub fn repair_file(root: &Path, name: &Path, progress: &Progress) -> Result<RepairStatus> {
    let probe = scan_disks(root, name, MAX_P + 2);
    let first_ok = match probe.first_ok {
        Some(d) => d,
        None => return Ok(RepairStatus::TooManyErasures),
    };
    let header = Header::read_from(&disk_path(root, first_ok, name))?;
    validate_p(header.p)?;
    repair_file_with(root, name, header, false, progress)
}

fn repair_file_with(
    root: &Path,
    name: &Path,
    header: Header,
    content_only: bool,
    progress: &Progress,
) -> Result<RepairStatus> {
    let p = header.p;
    let scan = scan_disks(root, name, p + 2);
    if scan.missing.len() > 2 {
        return Ok(RepairStatus::TooManyErasures);
    }
    if scan.missing.is_empty() || (content_only && scan.missing[0] >= p) {
        return Ok(RepairStatus::Repaired);
    }

    let codec = EvenOdd::new(p)?;
    let stripes = stripe_count(header.file_size, p);

    let mut readers: Vec<Option<DiskColumnReader>> = Vec::with_capacity(p + 2);
    for d in 0..p + 2 {
        readers.push(if scan.missing.contains(&d) {
            None
        } else {
            Some(DiskColumnReader::open(&disk_path(root, d, name))?)
        });
    }
    let buf_cap = buffer_capacity(scan.missing.len());
    let mut writers = Vec::with_capacity(scan.missing.len());
    for &d in &scan.missing {
        writers.push(DiskColumnWriter::create(&disk_path(root, d, name), header, buf_cap)?);
    }

    progress.set_stage("repair");
    progress.set_total(stripes as usize);
    let mut stripe = Stripe::new(p);
    for _ in 0..stripes {
        for (d, r) in readers.iter_mut().enumerate() {
            match r {
                Some(r) => r.read_column(stripe.col_mut(d)),
                None => stripe.zero_col(d),
            }
        }
        codec.reconstruct(&mut stripe, &scan.missing)?;
        for (w, &d) in writers.iter_mut().zip(&scan.missing) {
            w.write_column(stripe.col(d))?;
        }
        progress.inc();
    }
    for w in writers {
        w.finish()?;
    }
    Ok(RepairStatus::Repaired)
}

/// Fleet-level repair: rebuild every logical file found on a surviving disk.
///
/// The walked disk is the lowest index not listed in `failed`; files that
/// exist only on a failed disk are unreachable by construction. Each file's
/// actual missing set is re-derived from the filesystem, so stale indices in
/// `failed` are harmless.
pub fn repair_disks(root: &Path, failed: &[usize], progress: &Progress) -> Result<RepairStatus> {
    if failed.len() > 2 {
        return Ok(RepairStatus::TooManyErasures);
    }
    if failed.is_empty() {
        return Ok(RepairStatus::Repaired);
    }
    let mut ok_id = 0usize;
    while failed.contains(&ok_id) {
        ok_id += 1;
    }
    for name in walk_disk(&disk_dir(root, ok_id))? {
        match repair_file(root, &name, progress)? {
            RepairStatus::Repaired => {}
            RepairStatus::TooManyErasures => return Ok(RepairStatus::TooManyErasures),
        }
    }
    Ok(RepairStatus::Repaired)
}
