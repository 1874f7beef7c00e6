// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment variable management.
//!
//! # Architecture
//!
//! ```text
//! Env (copy-on-write BTreeMap<String, String>)
//! Sources: current_env(), Env::from_map(), Env::new()
//! Ops: set/get/remove, append/prepend, append_path/prepend_path
//! Values: EnvValue (str, paths, integers, bool) under a CoercionPolicy
//! ```
//!
//! - **Case-insensitive on Windows**
//! - **Copy-on-write**: Clones share data until modified
//! - **UTF-8 internal**: Non-UTF-8 host variables are skipped on capture

pub mod container;
pub mod types;
pub mod value;

#[cfg(test)]
mod tests;

use tracing::trace;

/// Captures the current process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
#[must_use]
pub fn current_env() -> container::Env {
    let vars = std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                trace!(key = ?key, "skipping non-UTF-8 environment variable");
                None
            }
        })
        .collect();
    container::Env::from_map(vars)
}
