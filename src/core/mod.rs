// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules for environment management.
//!
//! ```text
//!              core
//!               |
//!     +---------+-----------+
//!     |         |           |
//!     v         v           v
//!    env     compiler    activation
//!     |         |           |
//!   Env      Compiler    EnvActivation
//!   EnvValue Selection   Passthrough / Sandboxed
//!   Policy               ScopeGuard, BuildSettings
//! ```

pub mod activation;
pub mod compiler;
pub mod env;
