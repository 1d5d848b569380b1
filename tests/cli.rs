// tests/cli.rs

use std::path::PathBuf;

use clap::Parser;
use flowdag::cli::{CliArgs, LogLevel};
use flowdag::config::{DEFAULT_FLOW_FILE, default_flow_path};

#[test]
fn flow_path_defaults_to_flow_toml() {
    let args = CliArgs::parse_from(["flowdag"]);
    assert_eq!(args.flow, DEFAULT_FLOW_FILE);
    assert_eq!(args.flow_path(), default_flow_path());
    assert_eq!(default_flow_path(), PathBuf::from("Flow.toml"));
    assert!(!args.dry_run);
    assert!(!args.quiet);
    assert!(args.log_level.is_none());
}

#[test]
fn explicit_flags_are_parsed() {
    let args = CliArgs::parse_from([
        "flowdag",
        "--flow",
        "pipelines/build.toml",
        "--dry-run",
        "--log-level",
        "debug",
        "-q",
    ]);
    assert_eq!(args.flow_path(), PathBuf::from("pipelines/build.toml"));
    assert!(args.dry_run);
    assert!(args.quiet);
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
}

#[test]
fn empty_flow_argument_falls_back_to_default() {
    let args = CliArgs::parse_from(["flowdag", "--flow", ""]);
    assert_eq!(args.flow_path(), default_flow_path());
}
