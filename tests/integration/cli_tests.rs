//! End-to-end runs through `run_app_to`, capturing the report.

use blockdupe::cli::Cli;
use blockdupe::error::{ConfigError, ExitCode};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str]) -> (ExitCode, String) {
    let mut argv = vec!["blockdupe", "-q", "--no-config"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    let code = blockdupe::run_app_to(cli, &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_text_report_scenario_a() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"0123456789");
    let b = write(dir.path(), "b", b"0123456789");
    write(dir.path(), "c", b"012X456789");

    let (code, out) = run(&["-B", "4", dir.path().to_str().unwrap()]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(out, format!("{}\n{}\n", a.display(), b.display()));
}

#[test]
fn test_text_report_two_groups() {
    let dir = tempdir().unwrap();
    let s1 = write(dir.path(), "s1", b"xy");
    let s2 = write(dir.path(), "s2", b"xy");
    let l1 = write(dir.path(), "l1", b"longer");
    let l2 = write(dir.path(), "l2", b"longer");

    let (_, out) = run(&[dir.path().to_str().unwrap()]);

    let expected = format!(
        "{}\n{}\n\n{}\n{}\n",
        s1.display(),
        s2.display(),
        l1.display(),
        l2.display()
    );
    assert_eq!(out, expected);
}

#[test]
fn test_no_duplicates_prints_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "unique", b"only one");

    let (code, out) = run(&[dir.path().to_str().unwrap()]);

    assert_eq!(code, ExitCode::Success);
    assert!(out.is_empty());
}

#[test]
fn test_recursive_flag_and_exclude() {
    let dir = tempdir().unwrap();
    let top = write(dir.path(), "top.dat", b"payload");
    let nested = write(dir.path(), "keep/copy.dat", b"payload");
    write(dir.path(), "skip/copy.dat", b"payload");

    let (_, flat) = run(&[dir.path().to_str().unwrap()]);
    assert!(flat.is_empty());

    let (_, deep) = run(&["-r", "-E", "skip", dir.path().to_str().unwrap()]);
    assert_eq!(deep, format!("{}\n{}\n", nested.display(), top.display()));
}

#[test]
fn test_min_size_zero_groups_empty_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");

    let (_, default_out) = run(&[dir.path().to_str().unwrap()]);
    assert!(default_out.is_empty());

    let (_, out) = run(&["-S", "0", dir.path().to_str().unwrap()]);
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "b.txt", b"dup");
    write(dir.path(), "c.txt", b"uniq");

    let (code, out) = run(&["-o", "json", "-H", "sha256", dir.path().to_str().unwrap()]);
    assert_eq!(code, ExitCode::Success);

    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let duplicates = parsed["duplicates"].as_array().unwrap();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0]["size"], 3);
    assert_eq!(duplicates[0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["summary"]["total_files"], 3);
    assert_eq!(parsed["summary"]["exit_code_name"], "BD000");
}

#[test]
fn test_missing_path_is_not_fatal() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup");
    write(dir.path(), "b", b"dup");
    let missing = dir.path().join("missing");

    let (code, out) = run(&[missing.to_str().unwrap(), dir.path().to_str().unwrap()]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(out.lines().count(), 2);
}

#[test]
fn test_invalid_pattern_fails_before_scanning() {
    let cli = Cli::try_parse_from(["blockdupe", "-q", "--no-config", "-P", "(", "."]).unwrap();
    let mut out = Vec::new();
    let err = blockdupe::run_app_to(cli, &mut out).unwrap_err();

    assert!(err.downcast_ref::<ConfigError>().is_some());
    assert_eq!(ExitCode::for_error(&err), ExitCode::ConfigError);
    assert!(out.is_empty());
}

#[test]
fn test_oversized_block_size_fails_before_scanning() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"dup!");
    write(dir.path(), "b", b"dup!");

    let cli = Cli::try_parse_from([
        "blockdupe",
        "-q",
        "--no-config",
        "-B",
        "1TiB",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();
    let mut out = Vec::new();
    let err = blockdupe::run_app_to(cli, &mut out).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidBlockSize(_))
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::ConfigError);
    assert!(out.is_empty());
}

#[test]
fn test_unknown_hash_rejected_by_parser() {
    let err = Cli::try_parse_from(["blockdupe", "--hash", "whirlpool"]).unwrap_err();
    assert!(err.to_string().contains("whirlpool"));
}

#[test]
fn test_print_config_reflects_flags() {
    let (code, out) = run(&["--print-config", "-B", "2KiB", "-H", "sha256", "-r"]);

    assert_eq!(code, ExitCode::Success);
    assert!(out.contains("block_size = 2048"));
    assert!(out.contains("hash = \"sha256\""));
    assert!(out.contains("recursive = true"));
}
