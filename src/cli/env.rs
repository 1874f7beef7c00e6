// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `env` command arguments.
//!
//! ```text
//! kegenv env [--variant V] [--compiler C] [--prefix DIR]
//!            [--dep NAME]... [--keg-only-dep NAME]...
//!            [--clean] [--json]
//! ```
//!
//! Flags given here override `[build]` settings for this invocation only.

use std::path::PathBuf;

use clap::Args;

use crate::core::activation::VariantKind;
use crate::core::compiler::Compiler;

/// Arguments for the `env` command.
#[derive(Debug, Clone, Default, Args)]
pub struct EnvArgs {
    /// Environment variant ('passthrough'/'std' or 'sandboxed'/'super').
    #[arg(long, value_name = "VARIANT")]
    pub variant: Option<VariantKind>,

    /// Compiler to select, e.g. 'clang', 'llvm', 'gcc', 'gcc_4_0', 'gcc-4.5'.
    #[arg(long, value_name = "COMPILER")]
    pub compiler: Option<Compiler>,

    /// Install prefix dependencies live under.
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Resolved dependency, in order. Can be specified multiple times.
    #[arg(short = 'd', long = "dep", value_name = "NAME", action = clap::ArgAction::Append)]
    pub deps: Vec<String>,

    /// Resolved keg-only dependency. Can be specified multiple times.
    #[arg(short = 'k', long = "keg-only-dep", value_name = "NAME", action = clap::ArgAction::Append)]
    pub keg_only_deps: Vec<String>,

    /// Start from an empty store instead of the current process environment.
    #[arg(long)]
    pub clean: bool,

    /// Print a JSON object instead of KEY="value" lines.
    #[arg(long)]
    pub json: bool,
}
