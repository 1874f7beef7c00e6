// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Passthrough variant: the host environment plus explicit changes.
//!
//! ```text
//! setup_build_environment()
//!   reset                          CC.. CFLAGS.. LDFLAGS.. removed
//!   prefix != /usr/local:
//!     PATH              = <prefix>/bin : host PATH
//!     PKG_CONFIG_LIBDIR = <prefix>/lib/pkgconfig : ...
//!     LDFLAGS          += -L<prefix>/lib
//!     CPPFLAGS         += -isystem<prefix>/include
//!   CFLAGS CXXFLAGS OBJCFLAGS OBJCXXFLAGS = optflags
//!   MAKEFLAGS = -j<make_jobs>
//!   select(settings.compiler)      CC/CXX resolved through PATH (which)
//! ```

use std::path::Path;

use tracing::debug;

use super::settings::BuildSettings;
use super::{ActivationState, CFLAGS_VARIABLES, EnvActivation, MAKEFLAGS};
use crate::core::compiler::{Compiler, CompilerSelection, Toolchain};
use crate::core::env::container::Env;
use crate::core::env::current_env;
use crate::error::EnvResult;

/// Prefix whose directories are on the default search paths already.
const SYSTEM_PREFIX: &str = "/usr/local";

/// Build environment that inherits the host's variables.
#[derive(Debug, Clone, Default)]
pub struct PassthroughEnv {
    state: ActivationState,
    settings: BuildSettings,
}

impl PassthroughEnv {
    #[must_use]
    pub fn new(env: Env, settings: BuildSettings) -> Self {
        let env = env.with_policy(settings.coercion);
        Self {
            state: ActivationState::new(env),
            settings,
        }
    }

    /// Wraps a capture of the current process environment.
    #[must_use]
    pub fn from_host(settings: BuildSettings) -> Self {
        Self::new(current_env(), settings)
    }

    /// Finds `tool` on this environment's `PATH`, falling back to the bare name.
    fn resolve_tool(&self, tool: &str) -> String {
        self.get("PATH")
            .and_then(|path| which::which_in(tool, Some(path), Path::new(".")).ok())
            .and_then(|found| found.to_str().map(str::to_owned))
            .unwrap_or_else(|| tool.to_owned())
    }
}

impl EnvActivation for PassthroughEnv {
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
        let toolchain = Toolchain {
            cc: self.resolve_tool(&compiler.tool_name()),
            cxx: self.resolve_tool(&compiler.cxx_tool_name()),
        };
        CompilerSelection::new(compiler, toolchain)
    }

    fn setup_build_environment(&mut self) -> EnvResult<()> {
        let prefix = self.settings.prefix.clone();
        let optflags = self.settings.optflags.clone();
        let jobs = self.settings.make_jobs();

        self.reset();

        if prefix != Path::new(SYSTEM_PREFIX) {
            self.prepend_path("PATH", prefix.join("bin"))?
                .prepend_path("PKG_CONFIG_LIBDIR", prefix.join("lib").join("pkgconfig"))?
                .append("LDFLAGS", format!("-L{}", prefix.join("lib").display()))?
                .append(
                    "CPPFLAGS",
                    format!("-isystem{}", prefix.join("include").display()),
                )?;
        }

        for key in CFLAGS_VARIABLES {
            self.set(key, optflags.as_str())?;
        }
        self.set(MAKEFLAGS, format!("-j{jobs}"))?;
        self.select(self.settings.compiler);

        debug!(
            prefix = %prefix.display(),
            jobs,
            compiler = %self.settings.compiler,
            "passthrough build environment ready"
        );
        Ok(())
    }
}
