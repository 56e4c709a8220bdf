use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

#[test]
fn command_invalid() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recognized"));

    Ok(())
}

#[test]
fn command_score() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("score")
        .arg("tests/tfbind/acgt.txt")
        .arg("tests/tfbind/seqs.fa")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // ref 7 windows, del 6, ins 8
    assert_eq!(stdout.lines().count(), 21);
    assert!(stdout.lines().next().unwrap().contains("ref\t0\tACGT\t0.9"));
    assert!(stdout.contains("ref\t1\tCGTA\t0.1"));
    assert!(stdout.contains("ins\t5\tACGT\t0.9"));

    Ok(())
}

#[test]
fn command_score_kind() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("score")
        .arg("tests/tfbind/escore.txt")
        .arg("tests/tfbind/seqs.fa")
        .arg("--kind")
        .arg("secondary")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("ref\t0\tACGT\t4.9"));
    assert!(stdout.contains("ref\t3\tTACG\t4.6"));

    // the alternate kind reads the median intensity column
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("score")
        .arg("tests/tfbind/escore.txt")
        .arg("tests/tfbind/seqs.fa")
        .arg("-k")
        .arg("iscore")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("ref\t0\tACGT\t1490"));

    Ok(())
}

#[test]
fn command_score_stat() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("score")
        .arg("tests/tfbind/acgt.txt")
        .arg("--stat")
        .arg("--rank")
        .arg("90")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "4\t256\t0.9\t0.1\n");

    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("score")
        .arg("tests/tfbind/escore.txt")
        .arg("--stat")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "4\t256\t0.49\n");

    Ok(())
}

#[test]
fn command_score_bad_kind() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    cmd.arg("score")
        .arg("tests/tfbind/acgt.txt")
        .arg("tests/tfbind/seqs.fa")
        .arg("--kind")
        .arg("foo");
    cmd.assert().failure();

    Ok(())
}

#[test]
fn command_pwm() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("pwm")
        .arg("tests/tfbind/motif.pwm")
        .arg("--info")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // the energy block is not a matrix
    assert_eq!(stdout, "1\t4\t7.8478\n");

    let mut cmd = Command::cargo_bin("tfbind")?;
    let output = cmd
        .arg("pwm")
        .arg("tests/tfbind/motif.pwm")
        .arg("tests/tfbind/seqs.fa")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 21);
    assert!(stdout.contains("1\tref\t0\t7.8478"));
    assert!(stdout.contains("1\tref\t1\t-45.1510"));
    assert!(stdout.contains("1\tref\t4\t7.8478"));

    Ok(())
}

#[test]
fn command_score_non_ascii() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("bad.fa");
    std::fs::write(&input, b">bad\nAC\xC3\xA9GT\n")?;

    for sub in ["score", "identify", "mutants"] {
        let mut cmd = Command::cargo_bin("tfbind")?;
        cmd.arg(sub);
        match sub {
            "score" => cmd.arg("tests/tfbind/acgt.txt").arg(&input),
            "identify" => cmd
                .arg(&input)
                .arg("--absolute-matrix")
                .arg("tests/tfbind/abs.tsv")
                .arg("-a")
                .arg("0.45"),
            _ => cmd.arg(&input),
        };
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("non-ASCII"))
            .stderr(predicate::str::contains("panicked").not());
    }

    Ok(())
}
