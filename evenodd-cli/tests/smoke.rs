use assert_cmd::prelude::*;
use predicates::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs;
use std::process::Command;

fn write_random(path: &std::path::Path, bytes: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<u8> = (0..bytes).map(|_| rng.gen()).collect();
    fs::write(path, data).unwrap();
}

fn evenodd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("evenodd").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn no_args_prints_usage() {
    Command::cargo_bin("evenodd")
        .unwrap()
        .assert()
        .failure()
        .stdout(predicate::str::contains("./evenodd write <file_name> <p>"))
        .stdout(predicate::str::contains("./evenodd read <file_name> <save_as>"))
        .stdout(predicate::str::contains("./evenodd repair <number_erasures> <idx0> ..."));
}

#[test]
fn write_then_read_roundtrip() {
    let td = assert_fs::TempDir::new().unwrap();
    write_random(&td.path().join("testfile"), 10_000, 1);

    evenodd(td.path()).args(["write", "testfile", "5"]).assert().success();
    for d in 0..7 {
        assert!(td.path().join(format!("disk_{}/testfile", d)).is_file());
    }

    evenodd(td.path()).args(["read", "testfile", "copy"]).assert().success();
    assert_eq!(
        fs::read(td.path().join("copy")).unwrap(),
        fs::read(td.path().join("testfile")).unwrap()
    );
}

#[test]
fn write_rejects_bad_prime() {
    let td = assert_fs::TempDir::new().unwrap();
    write_random(&td.path().join("testfile"), 100, 2);
    evenodd(td.path()).args(["write", "testfile", "6"]).assert().failure();
    evenodd(td.path()).args(["write", "testfile", "101"]).assert().failure();
}

#[test]
fn read_reports_missing_file() {
    let td = assert_fs::TempDir::new().unwrap();
    evenodd(td.path())
        .args(["read", "nothing", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File does not exist!"));
}

#[test]
fn read_reports_corruption() {
    let td = assert_fs::TempDir::new().unwrap();
    write_random(&td.path().join("testfile"), 3_000, 3);
    evenodd(td.path()).args(["write", "testfile", "3"]).assert().success();
    for d in 0..3 {
        fs::remove_file(td.path().join(format!("disk_{}/testfile", d))).unwrap();
    }
    evenodd(td.path())
        .args(["read", "testfile", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("File corrupted!"));
}

#[test]
fn repair_restores_two_lost_disks() {
    let td = assert_fs::TempDir::new().unwrap();
    write_random(&td.path().join("testfile"), 4_096, 4);
    evenodd(td.path()).args(["write", "testfile", "3"]).assert().success();

    fs::remove_dir_all(td.path().join("disk_1")).unwrap();
    fs::remove_dir_all(td.path().join("disk_3")).unwrap();
    evenodd(td.path()).args(["repair", "2", "1", "3"]).assert().success();

    assert!(td.path().join("disk_1/testfile").is_file());
    assert!(td.path().join("disk_3/testfile").is_file());
    evenodd(td.path()).args(["read", "testfile", "copy"]).assert().success();
    assert_eq!(
        fs::read(td.path().join("copy")).unwrap(),
        fs::read(td.path().join("testfile")).unwrap()
    );
}

#[test]
fn repair_refuses_three_erasures() {
    let td = assert_fs::TempDir::new().unwrap();
    evenodd(td.path())
        .args(["repair", "3", "0", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Too many corruptions!"));
}

#[test]
fn repair_zero_is_a_no_op() {
    let td = assert_fs::TempDir::new().unwrap();
    evenodd(td.path()).args(["repair", "0"]).assert().success();
}

#[test]
fn unknown_subcommand_is_reported() {
    let td = assert_fs::TempDir::new().unwrap();
    evenodd(td.path())
        .arg("frobnicate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Non-supported operations!"));
}

#[test]
fn gendata_rejects_bad_arguments() {
    for args in [&[][..], &["1000"][..], &["many", "out.bin"][..]] {
        Command::cargo_bin("gendata")
            .unwrap()
            .args(args)
            .assert()
            .failure()
            .stdout(predicate::str::contains("usage: ./gendata <file_bytes> <file_name>"))
            .stdout(predicate::str::contains("./gendata <file_bytes> <file_name> <seed>"));
    }
}

#[test]
fn gendata_is_sized_and_seeded() {
    let td = assert_fs::TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("gendata").unwrap();
    cmd.current_dir(td.path()).args(["1000", "data/a.bin", "42"]).assert().success();
    let mut cmd = Command::cargo_bin("gendata").unwrap();
    cmd.current_dir(td.path()).args(["1000", "data/b.bin", "42"]).assert().success();

    let a = fs::read(td.path().join("data/a.bin")).unwrap();
    let b = fs::read(td.path().join("data/b.bin")).unwrap();
    assert_eq!(a.len(), 1000);
    assert_eq!(a, b);
}
