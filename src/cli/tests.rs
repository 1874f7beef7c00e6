// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::core::activation::VariantKind;
use crate::core::compiler::Compiler;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["kegenv", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
    assert!(cli.global.configs.is_empty());
}

#[test]
fn test_parse_env_args() {
    let cli = Cli::try_parse_from([
        "kegenv",
        "env",
        "--variant",
        "std",
        "--compiler",
        "gcc-4.5",
        "--prefix",
        "/opt/keg",
        "-d",
        "zlib",
        "--dep",
        "openssl",
        "-k",
        "readline",
        "--json",
    ])
    .unwrap();

    let Some(Command::Env(args)) = cli.command else {
        panic!("expected env command");
    };
    assert_eq!(args.variant, Some(VariantKind::Passthrough));
    assert_eq!(args.compiler.map(|c| c.to_string()).as_deref(), Some("gcc-4.5"));
    assert_eq!(args.prefix, Some(PathBuf::from("/opt/keg")));
    assert_eq!(args.deps, ["zlib", "openssl"]);
    assert_eq!(args.keg_only_deps, ["readline"]);
    assert!(args.json);
    assert!(!args.clean);
}

#[test]
fn test_parse_env_rejects_unknown_compiler() {
    let err = Cli::try_parse_from(["kegenv", "env", "--compiler", "icc"]).unwrap_err();
    assert!(err.to_string().contains("invalid compiler: 'icc'"), "{err}");
}

#[test]
fn test_parse_env_accepts_symbolic_compiler() {
    let cli = Cli::try_parse_from(["kegenv", "env", "--compiler", "gcc_4_0"]).unwrap();
    let Some(Command::Env(args)) = cli.command else {
        panic!("expected env command");
    };
    assert_eq!(args.compiler, Some(Compiler::Gcc40));
}

#[test]
fn test_parse_global_options_after_subcommand() {
    let cli = Cli::try_parse_from([
        "kegenv",
        "-l",
        "4",
        "options",
        "--config",
        "a.toml",
        "-c",
        "b.toml",
        "-s",
        "build.compiler=gcc",
    ])
    .unwrap();
    assert!(matches!(cli.command, Some(Command::Options)));
    assert_eq!(
        cli.global.configs,
        [PathBuf::from("a.toml"), PathBuf::from("b.toml")]
    );
    assert_eq!(cli.global.log_level, Some(4));
}

#[test]
fn test_parse_rejects_log_level_out_of_range() {
    assert!(Cli::try_parse_from(["kegenv", "-l", "6", "version"]).is_err());
}

#[test]
fn test_global_options_to_config_overrides() {
    let cli = Cli::try_parse_from([
        "kegenv",
        "--set",
        "build.variant=passthrough",
        "-l",
        "3",
        "--log-file",
        "kegenv.log",
        "compilers",
    ])
    .unwrap();

    insta::assert_debug_snapshot!(cli.global.to_config_overrides(), @r#"
    [
        "build.variant=passthrough",
        "global.log_level=3",
        "global.file_log_level=3",
        "global.log_file=kegenv.log",
    ]
    "#);
}
