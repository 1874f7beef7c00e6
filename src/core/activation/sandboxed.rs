// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sandboxed variant: a minimal environment built from resolved dependencies.
//!
//! ```text
//! deps           [a, b]      keg_only_deps  [k]
//!
//! setup_build_environment()
//!   keep HOME TERM USER LOGNAME LANG TMPDIR SHELL MAKEFLAGS KEGENV_*
//!   PATH              = shims : opt/a/bin : opt/b/bin : /usr/bin:/bin:/usr/sbin:/sbin
//!   PKG_CONFIG_PATH   = opt/a/lib/pkgconfig : opt/a/share/pkgconfig : opt/b/...
//!   CMAKE_PREFIX_PATH = opt/k : <prefix>
//!   ACLOCAL_PATH      = opt/k/share/aclocal : <prefix>/share/aclocal
//!   KEGENV_PREFIX, KEGENV_OPTFLAGS, MAKEFLAGS (if unset)
//!   select(settings.compiler)  CC=cc CXX=c++ KEGENV_CC=<tool>
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use super::settings::BuildSettings;
use super::{ActivationState, EnvActivation, MAKEFLAGS};
use crate::core::compiler::{Compiler, CompilerSelection, Toolchain};
use crate::core::env::container::Env;
use crate::error::{EnvError, EnvResult};

/// Variable naming the real compiler behind the `cc`/`c++` shims.
pub const SHIM_COMPILER_VAR: &str = "KEGENV_CC";

/// Prefix of variables that always survive into the sandbox.
const SANDBOX_VAR_PREFIX: &str = "KEGENV_";

/// Host variables kept when the sandbox is built.
const INHERITED_VARIABLES: [&str; 8] = [
    "HOME", "TERM", "USER", "LOGNAME", "LANG", "TMPDIR", "SHELL", MAKEFLAGS,
];

/// System directories appended after all dependency paths.
const SYSTEM_PATHS: [&str; 4] = ["/usr/bin", "/bin", "/usr/sbin", "/sbin"];

/// Name of a resolved dependency, as installed under `<prefix>/opt`.
///
/// Always a single plain path component, so `opt_dir` stays inside the
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyName(String);

impl DependencyName {
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidDependency`] if `name` is empty, `.` or
    /// `..`, or contains a path separator.
    pub fn new(name: impl Into<String>) -> EnvResult<Self> {
        let name = name.into();
        let is_component = !matches!(name.as_str(), "" | "." | "..")
            && !name.contains(['/', '\\'])
            && !Path::new(&name).is_absolute();
        if is_component {
            Ok(Self(name))
        } else {
            Err(EnvError::invalid_dependency(name))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DependencyName {
    type Err = EnvError;

    fn from_str(name: &str) -> EnvResult<Self> {
        Self::new(name)
    }
}

/// Build environment assembled from an explicit minimal set.
#[derive(Debug, Clone, Default)]
pub struct SandboxedEnv {
    state: ActivationState,
    settings: BuildSettings,
    deps: Vec<DependencyName>,
    keg_only_deps: Vec<DependencyName>,
}

impl SandboxedEnv {
    #[must_use]
    pub fn new(env: Env, settings: BuildSettings) -> Self {
        let env = env.with_policy(settings.coercion);
        Self {
            state: ActivationState::new(env),
            settings,
            deps: Vec::new(),
            keg_only_deps: Vec::new(),
        }
    }

    /// Resolved dependencies, in resolution order.
    #[must_use]
    pub fn deps(&self) -> &[DependencyName] {
        &self.deps
    }

    /// Resolved dependencies that are not linked into the prefix.
    #[must_use]
    pub fn keg_only_deps(&self) -> &[DependencyName] {
        &self.keg_only_deps
    }

    /// Replaces the resolved dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidDependency`] for the first invalid name;
    /// the current list is kept.
    pub fn set_deps<I>(&mut self, deps: I) -> EnvResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.deps = parse_dependencies(deps)?;
        Ok(self)
    }

    /// Replaces the keg-only dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::InvalidDependency`] for the first invalid name;
    /// the current list is kept.
    pub fn set_keg_only_deps<I>(&mut self, deps: I) -> EnvResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.keg_only_deps = parse_dependencies(deps)?;
        Ok(self)
    }

    fn determine_path(&self) -> Vec<PathBuf> {
        std::iter::once(self.settings.shims_dir())
            .chain(
                self.deps
                    .iter()
                    .map(|dep| self.settings.opt_dir(dep.as_str()).join("bin")),
            )
            .chain(SYSTEM_PATHS.into_iter().map(PathBuf::from))
            .collect()
    }

    fn determine_pkg_config_path(&self) -> Vec<PathBuf> {
        self.deps
            .iter()
            .map(|dep| self.settings.opt_dir(dep.as_str()))
            .flat_map(|opt| {
                [
                    opt.join("lib").join("pkgconfig"),
                    opt.join("share").join("pkgconfig"),
                ]
            })
            .collect()
    }

    fn determine_cmake_prefix_path(&self) -> Vec<PathBuf> {
        self.keg_only_deps
            .iter()
            .map(|dep| self.settings.opt_dir(dep.as_str()))
            .chain(std::iter::once(self.settings.prefix.clone()))
            .collect()
    }

    fn determine_aclocal_path(&self) -> Vec<PathBuf> {
        self.keg_only_deps
            .iter()
            .map(|dep| self.settings.opt_dir(dep.as_str()))
            .chain(std::iter::once(self.settings.prefix.clone()))
            .map(|root| root.join("share").join("aclocal"))
            .collect()
    }

    /// Replaces `key` with the path list `entries`, absent when empty.
    fn set_path_list(&mut self, key: &str, entries: Vec<PathBuf>) -> EnvResult<()> {
        self.remove(key);
        for entry in entries {
            self.append_path(key, entry)?;
        }
        Ok(())
    }
}

fn parse_dependencies<I>(names: I) -> EnvResult<Vec<DependencyName>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().parse())
        .collect()
}

impl EnvActivation for SandboxedEnv {
    fn state(&self) -> &ActivationState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ActivationState {
        &mut self.state
    }

    fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    fn compiler_selection(&self, compiler: Compiler) -> CompilerSelection {
        let shims = Toolchain {
            cc: "cc".to_string(),
            cxx: "c++".to_string(),
        };
        CompilerSelection::new(compiler, shims)
            .with_var(SHIM_COMPILER_VAR, Some(compiler.tool_name()))
    }

    fn setup_build_environment(&mut self) -> EnvResult<()> {
        self.reset();
        self.env_mut().retain(|key, _| {
            INHERITED_VARIABLES.iter().any(|kept| *kept == key)
                || key.starts_with(SANDBOX_VAR_PREFIX)
        });

        let path = self.determine_path();
        let pkg_config_path = self.determine_pkg_config_path();
        let cmake_prefix_path = self.determine_cmake_prefix_path();
        let aclocal_path = self.determine_aclocal_path();
        self.set_path_list("PATH", path)?;
        self.set_path_list("PKG_CONFIG_PATH", pkg_config_path)?;
        self.set_path_list("CMAKE_PREFIX_PATH", cmake_prefix_path)?;
        self.set_path_list("ACLOCAL_PATH", aclocal_path)?;

        let prefix = self.settings.prefix.clone();
        let optflags = self.settings.optflags.clone();
        self.set("KEGENV_PREFIX", prefix.as_path())?
            .set("KEGENV_OPTFLAGS", optflags)?;
        if !self.env().contains(MAKEFLAGS) {
            let jobs = self.settings.make_jobs();
            self.set(MAKEFLAGS, format!("-j{jobs}"))?;
        }
        self.select(self.settings.compiler);

        debug!(
            deps = self.deps.len(),
            keg_only_deps = self.keg_only_deps.len(),
            compiler = %self.settings.compiler,
            "sandboxed build environment ready"
        );
        Ok(())
    }
}
