// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Settings consumed by `setup_build_environment`.
//!
//! ```text
//! [build]
//! variant    = "passthrough" | "sandboxed"
//! compiler   = "clang"            default selection
//! prefix     = "/usr/local"       opt/<dep>/... lives below it
//! shims_dir  = <prefix>/share/kegenv/shims
//! make_jobs  = <available parallelism>
//! optflags   = "-Os -w -pipe"
//! coercion   = "lenient" | "string-only"
//! ```

use std::num::NonZeroUsize;
use std::path::PathBuf;

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::VariantKind;
use crate::core::compiler::Compiler;
use crate::core::env::value::CoercionPolicy;

/// Optimization flags used when none are configured.
pub const DEFAULT_OPTFLAGS: &str = "-Os -w -pipe";

/// Build settings shared by both environment variants.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    #[builder(default)]
    pub variant: VariantKind,
    #[builder(default)]
    pub compiler: Compiler,
    #[builder(into, default = PathBuf::from("/usr/local"))]
    pub prefix: PathBuf,
    #[builder(into)]
    pub shims_dir: Option<PathBuf>,
    pub make_jobs: Option<u32>,
    #[builder(into, default = DEFAULT_OPTFLAGS.to_string())]
    pub optflags: String,
    #[builder(default)]
    pub coercion: CoercionPolicy,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BuildSettings {
    /// Directory holding the `cc`/`c++` shims of the sandboxed variant.
    #[must_use]
    pub fn shims_dir(&self) -> PathBuf {
        self.shims_dir
            .clone()
            .unwrap_or_else(|| self.prefix.join("share").join("kegenv").join("shims"))
    }

    /// Configured job count, or the host's available parallelism.
    #[must_use]
    pub fn make_jobs(&self) -> u32 {
        self.make_jobs.filter(|jobs| *jobs > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map_or(1, NonZeroUsize::get)
                .try_into()
                .unwrap_or(u32::MAX)
        })
    }

    /// Installation directory of a dependency (`<prefix>/opt/<name>`).
    #[must_use]
    pub fn opt_dir(&self, dependency: &str) -> PathBuf {
        self.prefix.join("opt").join(dependency)
    }
}
