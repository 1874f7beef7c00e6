// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. kegenv.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. KEGENV_<SECTION>__<KEY> env vars
//! 5. CLI overrides (--set, --log-level, ...)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! KEGENV_GLOBAL__LOG_LEVEL=4     → global.log_level = 4
//! KEGENV_BUILD__COMPILER=gcc     → build.compiler = "gcc"
//! KEGENV_BUILD__MAKE_JOBS=8      → build.make_jobs = 8
//! ```
//!
//! Single-underscore names such as `KEGENV_CC` or `KEGENV_PREFIX` belong to
//! the activated build environment and are never read as configuration.

pub mod loader;
pub mod types;


use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::activation::settings::BuildSettings;
use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::GlobalConfig;

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Build environment settings.
    pub build: BuildSettings,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kegenv::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file("ci/kegenv.toml")
    ///     .add_toml_file_optional("kegenv.toml")
    ///     .with_env_prefix("KEGENV")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Checks values serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a relative prefix or shims
    /// directory, or a job count of zero.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            section: "build".to_string(),
            key: key.to_string(),
            message,
        };

        if !self.build.prefix.is_absolute() {
            return Err(invalid(
                "prefix",
                format!("must be an absolute path, got '{}'", self.build.prefix.display()),
            ));
        }
        if let Some(shims) = &self.build.shims_dir
            && !shims.is_absolute()
        {
            return Err(invalid(
                "shims_dir",
                format!("must be an absolute path, got '{}'", shims.display()),
            ));
        }
        if self.build.make_jobs == Some(0) {
            return Err(invalid("make_jobs", "must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered and aligned on `=`. Derived values
    /// (shims directory, job count) are shown resolved.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_build_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.log_level".into(),
            self.global.log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert("global.json_log".into(), self.global.json_log.to_string());
    }

    fn format_build_options(&self, options: &mut BTreeMap<String, String>) {
        let build = &self.build;
        options.insert("build.variant".into(), build.variant.to_string());
        options.insert("build.compiler".into(), build.compiler.to_string());
        options.insert("build.prefix".into(), build.prefix.display().to_string());
        options.insert(
            "build.shims_dir".into(),
            build.shims_dir().display().to_string(),
        );
        options.insert("build.make_jobs".into(), build.make_jobs().to_string());
        options.insert("build.optflags".into(), build.optflags.clone());
        options.insert("build.coercion".into(), build.coercion.to_string());
    }
}
