use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use evenodd_core::pipeline::{
    decode_file, encode_file, repair_disks, DecodeStatus, RepairStatus,
};
use evenodd_core::progress::Progress;

#[derive(Parser)]
#[command(
    name = "evenodd",
    version,
    about = "EVENODD erasure coding over disk_0 .. disk_{p+1} directories"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Encode <FILE_NAME> with prime <P> into disk_0 .. disk_{p+1}
    Write {
        file_name: PathBuf,
        /// Odd prime in 3..=97
        p: usize,
        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    /// Reconstruct <FILE_NAME> into <SAVE_AS>
    Read { file_name: PathBuf, save_as: PathBuf },
    /// Rebuild every file stored on the failed disk(s)
    Repair {
        number_erasures: usize,
        idx: Vec<usize>,
        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    #[command(external_subcommand)]
    Other(Vec<String>),
}

fn usage() {
    println!("./evenodd write <file_name> <p>");
    println!("./evenodd read <file_name> <save_as>");
    println!("./evenodd repair <number_erasures> <idx0> ...");
}

fn main() -> Result<()> {
    if std::env::args().len() < 2 {
        usage();
        std::process::exit(1);
    }
    let cli = Cli::parse();
    let root = Path::new(".");
    match cli.cmd {
        Cmd::Write { file_name, p, progress } => {
            let prog = Progress::new(progress);
            prog.start();
            let res = encode_file(root, &file_name, p, &prog);
            prog.stop();
            res?;
        }
        Cmd::Read { file_name, save_as } => match decode_file(root, &file_name, &save_as)? {
            DecodeStatus::Decoded => {}
            DecodeStatus::Missing => println!("File does not exist!"),
            DecodeStatus::Corrupted => println!("File corrupted!"),
        },
        Cmd::Repair { number_erasures, idx, progress } => {
            if number_erasures > 2 {
                println!("Too many corruptions!");
                return Ok(());
            }
            if idx.len() < number_erasures {
                bail!("repair expects {} disk index(es)", number_erasures);
            }
            let prog = Progress::new(progress);
            prog.start();
            let res = repair_disks(root, &idx[..number_erasures], &prog);
            prog.stop();
            if let RepairStatus::TooManyErasures = res? {
                println!("Too many corruptions!");
            }
        }
        Cmd::Other(_) => println!("Non-supported operations!"),
    }
    Ok(())
}
