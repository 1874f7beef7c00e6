// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading from multiple sources.
//!
//! # Loader Pipeline
//!
//! ```text
//! ConfigLoader::new()
//!   .add_toml_file_optional("kegenv.toml")
//!   .add_toml_file(--config)
//!   .add_toml_str()
//!   .with_env_prefix("KEGENV")
//!   .set() / .add_overrides(--set)
//!        |
//!        v
//!    build() --> Config (validated)
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use super::Config;
use crate::error::{ConfigError, Result};

/// Separator between section and key in environment overrides.
const ENV_SECTION_SEPARATOR: &str = "__";

/// Builder for loading configuration from multiple sources.
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: Option<String>,
    env_vars: Option<Vec<(String, String)>>,
    required: Vec<PathBuf>,
    files: Vec<(String, PathBuf)>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            env_vars: None,
            required: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Adds a TOML configuration file to the loader.
    ///
    /// The file is read when `build()` is called; a missing file fails the
    /// build with [`ConfigError::NotFound`].
    #[must_use]
    pub fn add_toml_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        use config::{File, FileFormat};
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(true));
        self.required.push(p.to_path_buf());
        self.files.push(("file".to_string(), p.to_path_buf()));
        self
    }

    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<Path>>(mut self, path: P) -> Self {
        use config::{File, FileFormat};
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(false));
        if p.exists() {
            self.files.push(("optional".to_string(), p.to_path_buf()));
        }
        self
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        use config::{File, FileFormat};
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.files
            .push(("string".to_string(), PathBuf::from("<string>")));
        self
    }

    /// Reads `<PREFIX>_<SECTION>__<KEY>` variables from the process environment.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Reads environment overrides from `vars` instead of the process
    /// environment.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Sets a configuration override.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or if the value cannot be converted
    /// to a configuration value.
    pub fn set<T: Into<config::Value>>(mut self, key: &str, value: T) -> Result<Self> {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
        Ok(self)
    }

    /// Applies `KEY=VALUE` overrides such as `build.compiler=gcc`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for an entry without `=` or with
    /// an empty key.
    pub fn add_overrides<I, S>(mut self, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in overrides {
            let raw = raw.as_ref();
            let (key, value) = raw
                .split_once('=')
                .map(|(key, value)| (key.trim(), value.trim()))
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| ConfigError::ParseError {
                    path: "--set".to_string(),
                    message: format!("expected KEY=VALUE, got '{raw}'"),
                })?;
            self = self.set(key, value)?;
        }
        Ok(self)
    }

    /// Builds the configuration from all added sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required configuration file is missing.
    /// - A configuration file has invalid TOML syntax.
    /// - The merged configuration does not match the `Config` structure.
    /// - A value fails [`Config::validate`].
    pub fn build(self) -> Result<Config> {
        if let Some(missing) = self.required.iter().find(|path| !path.exists()) {
            return Err(ConfigError::NotFound(missing.display().to_string()).into());
        }

        let builder = match &self.env_prefix {
            Some(prefix) => {
                let vars = self
                    .env_vars
                    .unwrap_or_else(|| std::env::vars().collect());
                self.builder
                    .add_source(environment_source(prefix, vars))
            }
            None => self.builder,
        };

        let cfg = builder.build().map_err(parse_error)?;
        let config: Config = cfg.try_deserialize().map_err(parse_error)?;
        config.validate()?;
        debug!(
            variant = %config.build.variant,
            compiler = %config.build.compiler,
            "configuration loaded"
        );
        Ok(config)
    }

    #[must_use]
    pub fn loaded_files(&self) -> &[(String, PathBuf)] {
        &self.files
    }

    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, (source, path))| format!("{}. [{}] {}", i + 1, source, path.display()))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment source limited to `<prefix>_<section>__<key>` names.
fn environment_source(prefix: &str, vars: Vec<(String, String)>) -> config::Environment {
    let lead = format!("{prefix}_");
    let selected: config::Map<String, String> = vars
        .into_iter()
        .filter(|(key, _)| {
            key.strip_prefix(&lead)
                .is_some_and(|rest| rest.contains(ENV_SECTION_SEPARATOR))
        })
        .collect();

    config::Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator(ENV_SECTION_SEPARATOR)
        .try_parsing(true)
        .source(Some(selected))
}

fn parse_error(err: config::ConfigError) -> ConfigError {
    let path = match &err {
        config::ConfigError::FileParse { uri: Some(uri), .. } => uri.clone(),
        _ => "<merged>".to_string(),
    };
    ConfigError::ParseError {
        path,
        message: err.to_string(),
    }
}
