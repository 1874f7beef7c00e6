// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the CLI.
//!
//! Parses realistic argument lists and runs the built binary in an isolated
//! working directory with a cleared process environment.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Output};

use clap::Parser;
use kegenv::cli::{Cli, Command as CliCommand};

fn kegenv(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kegenv"))
        .args(args)
        .current_dir(cwd)
        .env_clear()
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn cli_no_command() {
    let cli = Cli::try_parse_from(["kegenv"]).unwrap();
    assert!(cli.command.is_none());
}

#[test]
fn cli_env_defaults() {
    let cli = Cli::try_parse_from(["kegenv", "env"]).unwrap();
    let Some(CliCommand::Env(args)) = cli.command else {
        panic!("expected env command");
    };
    assert!(args.variant.is_none());
    assert!(args.compiler.is_none());
    assert!(args.deps.is_empty());
    assert!(!args.json);
}

#[test]
fn cli_env_rejects_unknown_variant() {
    assert!(Cli::try_parse_from(["kegenv", "env", "--variant", "docker"]).is_err());
}

#[test]
fn cli_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["kegenv", "build"]).is_err());
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn bin_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = kegenv(dir.path(), &["version"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn bin_env_json_sandboxed() {
    let dir = tempfile::tempdir().unwrap();
    let output = kegenv(
        dir.path(),
        &[
            "env",
            "--clean",
            "--json",
            "--prefix",
            "/opt/keg",
            "--compiler",
            "llvm",
            "--dep",
            "zlib",
            "--set",
            "build.make_jobs=3",
        ],
    );
    assert!(output.status.success(), "{output:?}");

    let vars: BTreeMap<String, String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(vars["CC"], "cc");
    assert_eq!(vars["LD"], "cc");
    assert_eq!(vars["KEGENV_CC"], "llvm-gcc");
    assert_eq!(vars["KEGENV_PREFIX"], "/opt/keg");
    assert_eq!(vars["MAKEFLAGS"], "-j3");
    assert!(vars["PATH"].contains("zlib"));
}

#[test]
fn bin_env_shell_passthrough() {
    let dir = tempfile::tempdir().unwrap();
    let output = kegenv(
        dir.path(),
        &["env", "--clean", "--variant", "std", "--compiler", "gcc"],
    );
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("CFLAGS=\"-Os -w -pipe\"\n"), "{text}");
    assert!(text.contains("CC=\"gcc-4.2\"\n"), "{text}");
    assert!(!text.contains("LD="), "{text}");
}

#[test]
fn bin_env_reads_local_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("kegenv.toml"),
        "[build]\nvariant = \"passthrough\"\noptflags = \"-O1\"\n",
    )
    .unwrap();

    let output = kegenv(dir.path(), &["env", "--clean"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("CXXFLAGS=\"-O1\"\n"));
}

#[test]
fn bin_options_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("ci.toml");
    std::fs::write(&config, "[build]\ncompiler = \"gcc-4.5\"\nmake_jobs = 2\n").unwrap();

    let output = kegenv(
        dir.path(),
        &["options", "--config", config.to_str().unwrap()],
    );
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.contains("build.compiler        = gcc-4.5\n"), "{text}");
    assert!(text.contains("build.make_jobs       = 2\n"), "{text}");
}

#[test]
fn bin_compilers_lists_every_compiler() {
    let dir = tempfile::tempdir().unwrap();
    let output = kegenv(dir.path(), &["compilers"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 11);
    assert!(text.lines().next().unwrap().ends_with("(default)"));
}

#[test]
fn bin_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = kegenv(dir.path(), &["options", "--config", "absent.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "{stderr}");
}

#[test]
fn bin_invalid_override_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = kegenv(dir.path(), &["env", "--set", "build.compiler=icc"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid compiler: 'icc'"), "{stderr}");
}

#[test]
fn bin_inis_lists_local_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = kegenv(dir.path(), &["inis"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).starts_with("no configuration files loaded"));

    std::fs::write(dir.path().join("kegenv.toml"), "").unwrap();
    let output = kegenv(dir.path(), &["inis"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output), "1. [optional] kegenv.toml\n");
}
