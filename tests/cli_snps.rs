use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn command_snps_to_bed() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("pgcmp")?;
    let output = cmd
        .arg("snps")
        .arg("to-bed")
        .arg("tests/snps/sample.snps")
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 4);
    assert_eq!(
        stdout.lines().next().unwrap(),
        "track name=\"sample_snv\" description=\"SNPs called by MUMmer\" itemRgb=\"on\""
    );
    assert!(stdout.contains("r1\t1034\t1035\tA > G\t0\t+\t1034\t1035\t0,255,0\n"));
    assert!(stdout.contains("r2\t2099\t2100\tG > C\t0\t+\t2099\t2100\t0,0,255\n"));

    Ok(())
}

#[test]
fn command_snps_to_bed_named() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("pgcmp")?;
    let output = cmd
        .arg("snps")
        .arg("to-bed")
        .arg("tests/snps/sample.snps")
        .arg("--name")
        .arg("isolate_7")
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert!(stdout.starts_with("track name=\"isolate_7\""));

    Ok(())
}
