use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

fn usage() {
    println!("usage: ./gendata <file_bytes> <file_name>");
    println!("       ./gendata <file_bytes> <file_name> <seed>");
}

/// Write random bytes to a file, for exercising the coder.
fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        usage();
        std::process::exit(1);
    }
    let file_bytes: u64 = match args[1].parse() {
        Ok(n) => n,
        Err(_) => {
            usage();
            std::process::exit(1);
        }
    };
    let seed: Option<u64> = match args.get(3).map(|s| s.parse()) {
        None => None,
        Some(Ok(s)) => Some(s),
        Some(Err(_)) => {
            usage();
            std::process::exit(1);
        }
    };
    let file_name = PathBuf::from(&args[2]);

    if let Some(parent) = file_name.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {:?}", parent))?;
        }
    }
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let f = File::create(&file_name).with_context(|| format!("create {:?}", file_name))?;
    let mut out = BufWriter::new(f);
    let mut buf = vec![0u8; 1 << 20];
    let mut remaining = file_bytes;
    while remaining > 0 {
        let n = remaining.min(buf.len() as u64) as usize;
        rng.fill_bytes(&mut buf[..n]);
        out.write_all(&buf[..n])?;
        remaining -= n as u64;
    }
    out.flush()?;
    Ok(())
}
