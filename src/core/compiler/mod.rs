// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Compiler selection.
//!
//! ```text
//! Compiler          symbol     tool       CC / CXX              LD
//! Clang             clang      clang      clang / clang++       (removed)
//! Llvm              llvm       llvm-gcc   llvm-gcc / llvm-g++   = CC
//! Gcc               gcc        gcc-4.2    gcc-4.2 / g++-4.2     (removed)
//! Gcc40             gcc_4_0    gcc-4.0    gcc-4.0 / g++-4.0     (removed)
//! Gnu(4.3..=4.9)    gcc-4.N    gcc-4.N    gcc-4.N / g++-4.N     (removed)
//!
//! CompilerSelection::new(compiler, Toolchain { cc, cxx })
//!   CC = OBJC = cc,  CXX = OBJCXX = cxx,  LD = cc | absent
//!   + variant extras (with_var)
//!   --> apply(&mut Env)   infallible, every owned variable overwritten
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::env::container::Env;
use crate::error::EnvError;


/// Variables every selection overwrites or removes.
pub const SELECTOR_VARIABLES: [&str; 5] = ["CC", "CXX", "OBJC", "OBJCXX", "LD"];

/// Minor versions of the standalone GNU 4.x compilers that can be selected.
const GNU_MINOR_VERSIONS: std::ops::RangeInclusive<u8> = 3..=9;

/// A standalone GNU GCC 4.x release (`gcc-4.3` through `gcc-4.9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GnuGccVersion(u8);

impl GnuGccVersion {
    /// Returns the version for `gcc-4.<minor>`, if that release is supported.
    #[must_use]
    pub fn new(minor: u8) -> Option<Self> {
        GNU_MINOR_VERSIONS.contains(&minor).then_some(Self(minor))
    }

    #[must_use]
    pub const fn minor(self) -> u8 {
        self.0
    }
}

/// A selectable compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Compiler {
    #[default]
    Clang,
    /// `llvm-gcc`; links through the compiler driver, so `LD` is set.
    Llvm,
    /// Apple `gcc-4.2`.
    Gcc,
    /// Apple `gcc-4.0`.
    Gcc40,
    Gnu(GnuGccVersion),
}

impl Compiler {
    /// Every selectable compiler, in menu order.
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Clang, Self::Llvm, Self::Gcc, Self::Gcc40]
            .into_iter()
            .chain(GNU_MINOR_VERSIONS.map(|minor| Self::Gnu(GnuGccVersion(minor))))
    }

    /// The executable name of the C compiler, also the name shims dispatch on.
    #[must_use]
    pub fn tool_name(self) -> String {
        match self {
            Self::Clang => "clang".to_string(),
            Self::Llvm => "llvm-gcc".to_string(),
            Self::Gcc => "gcc-4.2".to_string(),
            Self::Gcc40 => "gcc-4.0".to_string(),
            Self::Gnu(version) => format!("gcc-4.{}", version.minor()),
        }
    }

    /// The executable name of the matching C++ compiler.
    #[must_use]
    pub fn cxx_tool_name(self) -> String {
        match self {
            Self::Clang => "clang++".to_string(),
            Self::Llvm => "llvm-g++".to_string(),
            Self::Gcc => "g++-4.2".to_string(),
            Self::Gcc40 => "g++-4.0".to_string(),
            Self::Gnu(version) => format!("g++-4.{}", version.minor()),
        }
    }

    /// Whether selecting this compiler also sets `LD`.
    #[must_use]
    pub const fn needs_linker_override(self) -> bool {
        matches!(self, Self::Llvm)
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clang => write!(f, "clang"),
            Self::Llvm => write!(f, "llvm"),
            Self::Gcc => write!(f, "gcc"),
            Self::Gcc40 => write!(f, "gcc_4_0"),
            Self::Gnu(version) => write!(f, "gcc-4.{}", version.minor()),
        }
    }
}

impl FromStr for Compiler {
    type Err = EnvError;

    /// Accepts symbolic (`gcc_4_0`) and tool (`gcc-4.0`) spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clang" => Ok(Self::Clang),
            "llvm" | "llvm-gcc" | "llvm_gcc" => Ok(Self::Llvm),
            "gcc" | "gcc-4.2" | "gcc_4_2" => Ok(Self::Gcc),
            "gcc_4_0" | "gcc-4.0" => Ok(Self::Gcc40),
            other => other
                .strip_prefix("gcc-4.")
                .or_else(|| other.strip_prefix("gcc_4_"))
                .filter(|minor| minor.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|minor| minor.parse::<u8>().ok())
                .and_then(GnuGccVersion::new)
                .map(Self::Gnu)
                .ok_or_else(|| EnvError::invalid_compiler(other)),
        }
    }
}

impl TryFrom<String> for Compiler {
    type Error = EnvError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Compiler> for String {
    fn from(compiler: Compiler) -> Self {
        compiler.to_string()
    }
}

/// Resolved executables for a compiler selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: String,
    pub cxx: String,
}

/// The full set of assignments one compiler selection makes.
///
/// `None` values remove the variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSelection {
    compiler: Compiler,
    assignments: Vec<(&'static str, Option<String>)>,
}

impl CompilerSelection {
    #[must_use]
    pub fn new(compiler: Compiler, toolchain: Toolchain) -> Self {
        let linker = compiler
            .needs_linker_override()
            .then(|| toolchain.cc.clone());

        Self {
            compiler,
            assignments: vec![
                ("CC", Some(toolchain.cc.clone())),
                ("OBJC", Some(toolchain.cc)),
                ("CXX", Some(toolchain.cxx.clone())),
                ("OBJCXX", Some(toolchain.cxx)),
                ("LD", linker),
            ],
        }
    }

    /// Adds a variant-specific variable to the bundle.
    #[must_use]
    pub fn with_var(mut self, key: &'static str, value: Option<String>) -> Self {
        self.assignments.push((key, value));
        self
    }

    #[must_use]
    pub const fn compiler(&self) -> Compiler {
        self.compiler
    }

    #[must_use]
    pub fn assignments(&self) -> &[(&'static str, Option<String>)] {
        &self.assignments
    }

    /// Writes every assignment into `env`.
    pub fn apply(self, env: &mut Env) {
        for (key, value) in self.assignments {
            env.restore_var(key, value);
        }
    }
}
