use assert_cmd::prelude::*;
use std::process::Command;
use tempfile::TempDir;

#[test]
fn command_align() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd.arg("align").arg("tests/tfbind/seqs.fa").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(
        stdout,
        ">ref\nACGTACGTAC\n>del\nACGT-CGTAC\n>ins\nACGtTACGTAC\n"
    );

    Ok(())
}

#[test]
fn command_align_ref() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("align")
        .arg("tests/tfbind/seqs.fa")
        .arg("--ref")
        .arg("del")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // gaps in the reference are never opened, extra bases are lowercase
    assert!(stdout.contains(">del\nACGTCGTAC\n"));
    assert!(stdout.contains(">ref\nACGTaCGTAC\n"));

    let mut cmd = Command::cargo_bin("tfbind")?;
    cmd.arg("align")
        .arg("tests/tfbind/seqs.fa")
        .arg("--ref")
        .arg("missing");
    cmd.assert().failure();

    Ok(())
}

#[test]
fn command_align_positions() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("align")
        .arg("tests/tfbind/seqs.fa")
        .arg("--positions")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("ref\t0,1,2,3,4,5,6,7,8,9\n"));
    assert!(stdout.contains("del\t0,1,2,3,4,5,6,7,8,9\n"));
    assert!(stdout.contains("ins\t0,1,2,2.5,3,4,5,6,7,8,9\n"));

    Ok(())
}

#[test]
fn command_mutants() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd.arg("mutants").arg("tests/tfbind/one.fa").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // 1 + 3 * 6 + (4 + 3 * 6) + 6
    assert_eq!(stdout.matches('>').count(), 47);
    assert!(stdout.starts_with(">wt\nTACGTT\n>wt_m0A\nAACGTT\n"));
    assert!(stdout.contains(">wt_i0T\nTTACGTT\n"));
    assert!(stdout.ends_with(">wt_d5\nTACGT\n"));

    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("mutants")
        .arg("tests/tfbind/one.fa")
        .arg("--no-origin")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.matches('>').count(), 46);
    assert!(!stdout.contains(">wt\n"));

    Ok(())
}

#[test]
fn command_align_named() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let mutants = temp_dir.path().join("mutants.fa");

    let mut cmd = Command::cargo_bin("tfbind")?;
    cmd.arg("mutants")
        .arg("tests/tfbind/one.fa")
        .arg("-o")
        .arg(&mutants);
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd.arg("align").arg(&mutants).arg("--named").output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains(">wt_m1C\nTCCGTT\n"));
    assert!(stdout.contains(">wt_i2A\nTAaCGTT\n"));
    assert!(stdout.contains(">wt_d3\nTAC-TT\n"));

    Ok(())
}
