// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!   anyhow::Result  (application boundary: cli, cmd, config loading)
//!         ^
//!         |  `?` converts
//!   +-----+------------------+
//!   |                        |
//! EnvError                ConfigError
//!   InvalidCompiler         ParseError
//!   CoercionFailure         InvalidValue
//!                           NotFound
//! ```
//!
//! Failures produced by a caller's action inside a scoped activation are
//! never wrapped in these types; they pass through unchanged.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`EnvError`].
pub type EnvResult<T> = std::result::Result<T, EnvError>;

// --- Environment Errors ---

/// Errors raised while mutating a build environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The compiler identifier is not one of the supported compilers.
    #[error("invalid compiler: '{name}'")]
    InvalidCompiler { name: String },

    /// A dependency name that cannot name a directory under `<prefix>/opt`.
    #[error("invalid dependency name: '{name}'")]
    InvalidDependency { name: String },

    /// A value could not be converted to its string form.
    #[error("cannot store value for '{key}': {reason}")]
    CoercionFailure { key: String, reason: String },
}

impl EnvError {
    pub(crate) fn invalid_compiler(name: impl Into<String>) -> Self {
        Self::InvalidCompiler { name: name.into() }
    }

    pub(crate) fn invalid_dependency(name: impl Into<String>) -> Self {
        Self::InvalidDependency { name: name.into() }
    }

    pub(crate) fn coercion(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CoercionFailure {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration sources.
    #[error("failed to parse config '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Configuration file not found.
    #[error("config file not found: {0}")]
    NotFound(String),
}
