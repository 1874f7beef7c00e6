// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! kegenv [global options] <command>
//! env [--variant V] [--compiler C] [--dep D]...
//! compilers
//! options
//! inis
//! version
//! ```

pub mod env;
pub mod global;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};

use crate::cli::env::EnvArgs;
use crate::cli::global::GlobalOptions;

/// Build environment manager.
#[derive(Debug, Parser)]
#[command(
    name = "kegenv",
    author,
    version,
    about = "Build environment manager",
    long_about = "kegenv Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Shows the environment a build step would run in.\n\n\
                  `kegenv env --dep zlib` prints the sandboxed environment for a\n\
                  build depending on zlib. See `kegenv <command> --help` for more\n\
                  information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  kegenv loads `kegenv.toml` from the current directory if it\n\
                  exists, then every file given with --config, in order. Values\n\
                  can be overridden with KEGENV_<SECTION>__<KEY> environment\n\
                  variables and with --set section.key=value."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their resolved values.
    Options,

    /// Lists the configuration files used.
    Inis,

    /// Lists the selectable compilers.
    Compilers,

    /// Prints the activated build environment.
    Env(EnvArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
