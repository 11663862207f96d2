// tests/cli.rs
//
// Drives the `huff` binary end to end over temporary files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn huff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_huff"))
        .args(args)
        .output()
        .expect("failed to run huff")
}

fn path(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn encode_then_decode_restores_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("poem.txt");
    let packed = dir.path().join("poem.huff");
    let restored = dir.path().join("poem.out");
    let text = "Tyger Tyger, burning bright,\nIn the forests of the night;\n".repeat(64);
    fs::write(&input, &text).unwrap();

    let out = huff(&["encode", path(&input), path(&packed), "--buffer-size", "4096"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(fs::metadata(&packed).unwrap().len() < text.len() as u64);

    let out = huff(&["decode", path(&packed), path(&restored), "--buffer-size", "16"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_to_string(&restored).unwrap(), text);
}

#[test]
fn empty_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty");
    let packed = dir.path().join("empty.huff");
    let restored = dir.path().join("empty.out");
    fs::write(&input, b"").unwrap();

    assert!(huff(&["encode", path(&input), path(&packed)]).status.success());
    assert_eq!(fs::read(&packed).unwrap(), vec![0u8; 8]);
    assert!(huff(&["decode", path(&packed), path(&restored)]).status.success());
    assert!(fs::read(&restored).unwrap().is_empty());
}

#[test]
fn check_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bytes.bin");
    fs::write(&input, (0..=255u8).cycle().take(3000).collect::<Vec<_>>()).unwrap();

    let out = huff(&["check", path(&input), "--buffer-size", "64"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("OK"));
}

#[test]
fn corrupt_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("short.huff");
    let output = dir.path().join("short.out");
    fs::write(&input, [0u8, 0, 0]).unwrap();

    let out = huff(&["decode", path(&input), path(&output)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("malformed stream"));
}

#[test]
fn tiny_buffer_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("x");
    fs::write(&input, b"x").unwrap();

    let out = huff(&["check", path(&input), "--buffer-size", "4"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid configuration"));
}
