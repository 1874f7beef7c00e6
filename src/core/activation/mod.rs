// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build environment activation.
//!
//! ```text
//!                    EnvActivation (trait)
//!   required: state/state_mut, settings,
//!             compiler_selection, setup_build_environment
//!   provided: get/set/remove, append/prepend(_path), cflags helpers,
//!             select/select_named/clang/llvm/gcc/gcc_4_0, reset,
//!             make_jobs, disable_parallelism, deparallelize,
//!             scoped, with_build_environment
//!                 |                         |
//!                 v                         v
//!          PassthroughEnv             SandboxedEnv
//!          host variables,            minimal set + deps,
//!          resolved executables       cc/c++ shims + KEGENV_CC
//!
//! BuildEnv: enum over both, picked by VariantKind
//! ```

pub mod passthrough;
pub mod sandboxed;
pub mod scope;
pub mod settings;


use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::compiler::{Compiler, CompilerSelection, SELECTOR_VARIABLES};
use crate::core::env::container::Env;
use crate::core::env::value::EnvValue;
use crate::error::{ConfigError, EnvResult};

use passthrough::PassthroughEnv;
use sandboxed::SandboxedEnv;
use scope::ScopeGuard;
use settings::BuildSettings;

/// Variable carrying parallel build flags for `make`.
pub const MAKEFLAGS: &str = "MAKEFLAGS";

/// The compiler flag variables `append_to_cflags` writes to.
pub const CFLAGS_VARIABLES: [&str; 4] = ["CFLAGS", "CXXFLAGS", "OBJCFLAGS", "OBJCXXFLAGS"];

/// Variables cleared by [`EnvActivation::reset`].
const TOOLCHAIN_VARIABLES: [&str; 4] = ["CPP", "CPPFLAGS", "LDFLAGS", "MAKE"];

/// Variables scoped activation restores: the store plus the compiler choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationState {
    env: Env,
    compiler: Option<Compiler>,
}

impl ActivationState {
    #[must_use]
    pub const fn new(env: Env) -> Self {
        Self {
            env,
            compiler: None,
        }
    }

    #[must_use]
    pub const fn env(&self) -> &Env {
        &self.env
    }

    pub const fn env_mut(&mut self) -> &mut Env {
        &mut self.env
    }

    #[must_use]
    pub const fn compiler(&self) -> Option<Compiler> {
        self.compiler
    }
}

/// Operations shared by every build environment variant.
pub trait EnvActivation {
    fn state(&self) -> &ActivationState;

    fn state_mut(&mut self) -> &mut ActivationState;

    fn settings(&self) -> &BuildSettings;

    /// The variable bundle this variant assigns when `compiler` is selected.
    fn compiler_selection(&self, compiler: Compiler) -> CompilerSelection;

    /// Populates the store for a build step.
    ///
    /// # Errors
    ///
    /// Returns an error if a derived value cannot be stored.
    fn setup_build_environment(&mut self) -> EnvResult<()>;

    fn env(&self) -> &Env {
        self.state().env()
    }

    fn env_mut(&mut self) -> &mut Env {
        self.state_mut().env_mut()
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.env().get(key)
    }

    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    fn set<V: EnvValue>(&mut self, key: &str, value: V) -> EnvResult<&mut Self> {
        self.env_mut().set(key, value)?;
        Ok(self)
    }

    fn remove(&mut self, key: &str) -> &mut Self {
        self.env_mut().remove(key);
        self
    }

    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    fn append<V: EnvValue>(&mut self, key: &str, value: V) -> EnvResult<&mut Self> {
        self.env_mut().append(key, value)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    fn prepend<V: EnvValue>(&mut self, key: &str, value: V) -> EnvResult<&mut Self> {
        self.env_mut().prepend(key, value)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    fn append_path<V: EnvValue>(&mut self, key: &str, value: V) -> EnvResult<&mut Self> {
        self.env_mut().append_path(key, value)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    fn prepend_path<V: EnvValue>(&mut self, key: &str, value: V) -> EnvResult<&mut Self> {
        self.env_mut().prepend_path(key, value)?;
        Ok(self)
    }

    /// Appends `flags` to every variable in [`CFLAGS_VARIABLES`].
    ///
    /// # Errors
    ///
    /// Returns an error if `flags` cannot be coerced to a string.
    fn append_to_cflags<V: EnvValue>(&mut self, flags: V) -> EnvResult<&mut Self> {
        for key in CFLAGS_VARIABLES {
            self.env_mut().append(key, &flags)?;
        }
        Ok(self)
    }

    /// Removes `flag` from every variable in [`CFLAGS_VARIABLES`].
    fn remove_from_cflags(&mut self, flag: &str) -> &mut Self {
        for key in CFLAGS_VARIABLES {
            self.env_mut().remove_value(key, flag);
        }
        self
    }

    fn cc(&self) -> Option<&str> {
        self.get("CC")
    }

    fn cxx(&self) -> Option<&str> {
        self.get("CXX")
    }

    fn cflags(&self) -> Option<&str> {
        self.get("CFLAGS")
    }

    /// The most recently selected compiler.
    fn compiler(&self) -> Option<Compiler> {
        self.state().compiler()
    }

    /// Selects `compiler`, overwriting every variable the selector owns.
    fn select(&mut self, compiler: Compiler) -> &mut Self {
        let selection = self.compiler_selection(compiler);
        debug!(
            compiler = %compiler,
            cc = ?selection.assignments().first().and_then(|(_, v)| v.as_deref()),
            "selecting compiler"
        );
        selection.apply(self.env_mut());
        self.state_mut().compiler = Some(compiler);
        self
    }

    /// Selects a compiler by identifier. Nothing changes if it is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EnvError::InvalidCompiler`] for an unsupported
    /// identifier.
    fn select_named(&mut self, name: &str) -> EnvResult<&mut Self> {
        let compiler = name.parse()?;
        Ok(self.select(compiler))
    }

    fn clang(&mut self) -> &mut Self {
        self.select(Compiler::Clang)
    }

    fn llvm(&mut self) -> &mut Self {
        self.select(Compiler::Llvm)
    }

    fn gcc(&mut self) -> &mut Self {
        self.select(Compiler::Gcc)
    }

    fn gcc_4_0(&mut self) -> &mut Self {
        self.select(Compiler::Gcc40)
    }

    /// Removes compiler and flag variables, returning the ones that were set.
    ///
    /// Clears every variable the variant's selection bundle writes, so no
    /// trace of the previous compiler is left behind.
    fn reset(&mut self) -> BTreeMap<String, String> {
        let bundle: Vec<&'static str> = self
            .compiler_selection(self.compiler().unwrap_or_default())
            .assignments()
            .iter()
            .map(|(key, _)| *key)
            .collect();

        let env = self.env_mut();
        let mut removed = BTreeMap::new();
        for key in SELECTOR_VARIABLES
            .into_iter()
            .chain(bundle)
            .chain(CFLAGS_VARIABLES)
            .chain(TOOLCHAIN_VARIABLES)
        {
            if let Some(value) = env.get(key) {
                removed.insert(key.to_string(), value.to_string());
                env.remove(key);
            }
        }
        self.state_mut().compiler = None;
        removed
    }

    /// Number of parallel jobs requested through `MAKEFLAGS` (at least 1).
    fn make_jobs(&self) -> u32 {
        static JOBS: OnceLock<Option<Regex>> = OnceLock::new();
        let Some(regex) = JOBS.get_or_init(|| Regex::new(r"-\w*j(\d+)").ok()) else {
            return 1;
        };

        self.get(MAKEFLAGS)
            .and_then(|flags| regex.captures(flags))
            .and_then(|captures| captures.get(1))
            .and_then(|jobs| jobs.as_str().parse::<u32>().ok())
            .map_or(1, |jobs| jobs.max(1))
    }

    /// Removes `MAKEFLAGS` for the rest of this activation.
    fn disable_parallelism(&mut self) -> &mut Self {
        self.remove(MAKEFLAGS)
    }

    /// Runs `action` with `MAKEFLAGS` removed, then restores its prior value
    /// (or absence) however `action` exits.
    fn deparallelize<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut guard = ScopeGuard::variable(self, MAKEFLAGS);
        guard.disable_parallelism();
        let result = action(&mut *guard);
        drop(guard);
        result
    }

    /// Runs `action` and then restores the store and compiler selection to
    /// their state before the call, however `action` exits.
    fn scoped<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut guard = ScopeGuard::full(self);
        let result = action(&mut *guard);
        drop(guard);
        result
    }

    /// Sets up the build environment, runs `action` in it, and restores the
    /// previous environment afterwards.
    ///
    /// The action's own return value, including any `Result`, is passed back
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the setup step fails; `action` does not run then.
    fn with_build_environment<R>(&mut self, action: impl FnOnce(&mut Self) -> R) -> EnvResult<R>
    where
        Self: Sized,
    {
        self.scoped(|env| -> EnvResult<R> {
            env.setup_build_environment()?;
            Ok(action(env))
        })
    }
}

/// Which environment variant drives a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// Mirrors the host environment.
    #[serde(alias = "std")]
    Passthrough,
    /// Minimal environment built from the dependency lists.
    #[default]
    #[serde(alias = "super")]
    Sandboxed,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => write!(f, "passthrough"),
            Self::Sandboxed => write!(f, "sandboxed"),
        }
    }
}

impl FromStr for VariantKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "passthrough" | "std" => Ok(Self::Passthrough),
            "sandboxed" | "super" => Ok(Self::Sandboxed),
            _ => Err(ConfigError::InvalidValue {
                section: "build".to_string(),
                key: "variant".to_string(),
                message: format!("expected 'passthrough' or 'sandboxed', got '{s}'"),
            }),
        }
    }
}

/// A build environment of either variant.
#[derive(Debug, Clone)]
pub enum BuildEnv {
    Passthrough(PassthroughEnv),
    Sandboxed(SandboxedEnv),
}

impl BuildEnv {
    /// Wraps `env` in the variant named by `settings.variant`.
    #[must_use]
    pub fn new(env: Env, settings: BuildSettings) -> Self {
        match settings.variant {
            VariantKind::Passthrough => Self::Passthrough(PassthroughEnv::new(env, settings)),
            VariantKind::Sandboxed => Self::Sandboxed(SandboxedEnv::new(env, settings)),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::Passthrough(_) => VariantKind::Passthrough,
            Self::Sandboxed(_) => VariantKind::Sandboxed,
        }
    }

    /// The sandboxed variant, for populating its dependency lists.
    pub const fn as_sandboxed_mut(&mut self) -> Option<&mut SandboxedEnv> {
        match self {
            Self::Sandboxed(env) => Some(env),
            Self::Passthrough(_) => None,
        }
    }
}

impl EnvActivation for BuildEnv {
    fn state(&self) -> &ActivationState {
        match self {
            Self::Passthrough(env) => env.state(),
            Self::Sandboxed(env) => env.state(),
        }
    }

    fn state_mut(&mut self) -> &mut ActivationState {
        match self {
            Self::Passthrough(env) => env.state_mut(),
            Self::Sandboxed(env) => env.state_mut(),
        }
    }

    fn settings(&self) -> &BuildSettings {
        match self {
            Self::Passthrough(env) => env.settings(),
            Self::Sandboxed(env) => env.settings(),
        }
    }

    fn compiler_selection(&self, compiler: Compiler) -> CompilerSelection {
        match self {
            Self::Passthrough(env) => env.compiler_selection(compiler),
            Self::Sandboxed(env) => env.compiler_selection(compiler),
        }
    }

    fn setup_build_environment(&mut self) -> EnvResult<()> {
        match self {
            Self::Passthrough(env) => env.setup_build_environment(),
            Self::Sandboxed(env) => env.setup_build_environment(),
        }
    }
}
