// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Env command implementation.
//!
//! ```text
//! EnvArgs + [build] settings
//!        |
//!        v
//! BuildEnv::new(host or empty store, settings)
//!   sandboxed: set_deps / set_keg_only_deps
//!        |
//!        v
//! with_build_environment(|env| env.to_map())   host store restored after
//!        |
//!        v
//! KEY="value" lines  |  JSON object
//! ```


use std::collections::BTreeMap;

use anyhow::Context;
use tracing::{info, warn};

use crate::cli::env::EnvArgs;
use crate::config::Config;
use crate::core::activation::settings::BuildSettings;
use crate::core::activation::{BuildEnv, EnvActivation};
use crate::core::env::container::Env;
use crate::core::env::current_env;
use crate::error::Result;

/// Merges command-line flags over the configured `[build]` settings.
#[must_use]
pub fn build_settings(args: &EnvArgs, configured: &BuildSettings) -> BuildSettings {
    let mut settings = configured.clone();
    if let Some(variant) = args.variant {
        settings.variant = variant;
    }
    if let Some(compiler) = args.compiler {
        settings.compiler = compiler;
    }
    if let Some(prefix) = &args.prefix {
        settings.prefix.clone_from(prefix);
    }
    settings
}

/// Computes the variables a build step would see.
///
/// # Errors
///
/// Returns an error if the build environment cannot be set up.
pub fn activate(
    args: &EnvArgs,
    settings: BuildSettings,
    host: Env,
) -> Result<BTreeMap<String, String>> {
    let mut env = BuildEnv::new(host, settings);
    match env.as_sandboxed_mut() {
        Some(sandboxed) => {
            sandboxed
                .set_deps(&args.deps)?
                .set_keg_only_deps(&args.keg_only_deps)?;
        }
        None if !args.deps.is_empty() || !args.keg_only_deps.is_empty() => {
            warn!("dependencies are ignored by the passthrough variant");
        }
        None => {}
    }

    let vars = env
        .with_build_environment(|env| env.env().to_map())
        .with_context(|| format!("failed to set up the {} build environment", env.kind()))?;
    info!(variant = %env.kind(), vars = vars.len(), "build environment computed");
    Ok(vars)
}

/// Renders `vars` as `KEY="value"` lines, escaped for POSIX shells.
#[must_use]
pub fn format_shell(vars: &BTreeMap<String, String>) -> String {
    vars.iter()
        .map(|(key, value)| format!("{key}=\"{}\"\n", shell_escape(value)))
        .collect()
}

fn shell_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Renders `vars` as a pretty-printed JSON object.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_json(vars: &BTreeMap<String, String>) -> Result<String> {
    serde_json::to_string_pretty(vars).context("failed to serialize environment")
}

/// Main handler for the env command.
///
/// # Errors
///
/// Returns an error if the environment cannot be set up or rendered.
pub fn run_env_command(args: &EnvArgs, config: &Config) -> Result<()> {
    let settings = build_settings(args, &config.build);
    let host = if args.clean { Env::new() } else { current_env() };
    let vars = activate(args, settings, host)?;

    if args.json {
        println!("{}", format_json(&vars)?);
    } else {
        print!("{}", format_shell(&vars));
    }
    Ok(())
}
