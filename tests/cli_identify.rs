use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn command_identify() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("identify")
        .arg("tests/tfbind/seqs.fa")
        .arg("--absolute-matrix")
        .arg("tests/tfbind/abs.tsv")
        .arg("-a")
        .arg("0.45")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("ref\t0\tACGT\tacgt.txt,escore.txt\n"));
    assert!(stdout.contains("ref\t1\tCGTA\tescore.txt\n"));
    assert!(stdout.contains("ref\t2\tGTAC\tmissing.txt\n"));
    // CGTC scores low everywhere
    assert!(!stdout.contains("del\t4\t"));
    assert_eq!(stdout.lines().filter(|l| l.starts_with("ref\t")).count(), 7);

    Ok(())
}

#[test]
fn command_identify_rank() -> anyhow::Result<()> {
    // both thresholds: the rank matrix has no missing.txt row
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("identify")
        .arg("tests/tfbind/seqs.fa")
        .arg("--absolute-matrix")
        .arg("tests/tfbind/abs.tsv")
        .arg("--rank-matrix")
        .arg("tests/tfbind/rank.tsv")
        .arg("-a")
        .arg("0.45")
        .arg("-r")
        .arg("99")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("ref\t0\tACGT\tacgt.txt,escore.txt\n"));
    assert!(stdout.contains("ref\t1\tCGTA\tescore.txt\n"));
    assert!(!stdout.contains("missing.txt"));

    Ok(())
}

#[test]
fn command_identify_no_threshold() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    cmd.arg("identify")
        .arg("tests/tfbind/seqs.fa")
        .arg("--absolute-matrix")
        .arg("tests/tfbind/abs.tsv");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("threshold"));

    let mut cmd = Command::cargo_bin("tfbind")?;
    cmd.arg("identify")
        .arg("tests/tfbind/seqs.fa")
        .arg("--absolute-matrix")
        .arg("tests/tfbind/abs.tsv")
        .arg("-r")
        .arg("90");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("rank"));

    Ok(())
}
