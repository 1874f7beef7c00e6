// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for build environment activation.
//!
//! Drives the public API the way a build driver would: capture a store,
//! pick a variant, run build steps inside scoped activations.

use kegenv::core::activation::passthrough::PassthroughEnv;
use kegenv::core::activation::sandboxed::SandboxedEnv;
use kegenv::core::activation::settings::BuildSettings;
use kegenv::core::activation::{BuildEnv, EnvActivation, VariantKind};
use kegenv::core::compiler::Compiler;
use kegenv::core::env::container::Env;
use kegenv::core::env::types::PATH_LIST_SEPARATOR;
use kegenv::core::env::value::CoercionPolicy;
use kegenv::error::EnvError;

fn host() -> Env {
    let mut env = Env::new();
    env.set("HOME", "/home/builder").unwrap();
    env.set("PATH", "/usr/bin").unwrap();
    env.set("MAKEFLAGS", "-j4").unwrap();
    env
}

fn settings(variant: VariantKind) -> BuildSettings {
    BuildSettings::builder()
        .variant(variant)
        .prefix("/opt/keg")
        .make_jobs(8)
        .build()
}

// =============================================================================
// Build step workflow
// =============================================================================

#[test]
fn build_steps_see_activated_env_and_leave_host_untouched() {
    for variant in [VariantKind::Passthrough, VariantKind::Sandboxed] {
        let mut env = BuildEnv::new(host(), settings(variant));
        let before = env.env().clone();

        let configure = env
            .with_build_environment(|env| {
                env.append_to_cflags("-DNDEBUG").unwrap();
                env.cflags().map(str::to_owned)
            })
            .unwrap();
        assert!(configure.unwrap().ends_with("-DNDEBUG"), "{variant}");

        let install = env
            .with_build_environment(|env| {
                env.deparallelize(|env| (env.get("MAKEFLAGS").is_none(), env.make_jobs()))
            })
            .unwrap();
        assert_eq!(install, (true, 1), "{variant}");

        assert_eq!(env.env(), &before, "{variant}");
        assert_eq!(env.compiler(), None, "{variant}");
    }
}

#[test]
fn failing_build_step_propagates_after_restore() {
    let mut env = SandboxedEnv::new(host(), settings(VariantKind::Sandboxed));
    env.set_deps(["zlib"]).unwrap();

    let outcome = env
        .with_build_environment(|env| -> anyhow::Result<()> {
            env.set("CONFIGURE_CACHE", "1")?;
            anyhow::bail!("configure failed")
        })
        .unwrap();

    assert_eq!(outcome.unwrap_err().to_string(), "configure failed");
    assert_eq!(env.get("CONFIGURE_CACHE"), None);
    assert_eq!(env.get("PATH"), Some("/usr/bin"));
    assert_eq!(env.get("MAKEFLAGS"), Some("-j4"));
    assert_eq!(env.deps().len(), 1);
}

#[test]
fn nested_scopes_restore_in_order() {
    let mut env = PassthroughEnv::new(host(), settings(VariantKind::Passthrough));

    env.scoped(|outer| {
        outer.set("STAGE", "outer").unwrap();
        outer.gcc();
        outer.scoped(|inner| {
            inner.set("STAGE", "inner").unwrap();
            inner.llvm();
            assert_eq!(inner.compiler(), Some(Compiler::Llvm));
        });
        assert_eq!(outer.get("STAGE"), Some("outer"));
        assert_eq!(outer.compiler(), Some(Compiler::Gcc));
        assert_eq!(outer.get("LD"), None);
    });

    assert_eq!(env.get("STAGE"), None);
    assert_eq!(env.compiler(), None);
}

#[test]
fn compiler_switch_inside_activation() {
    let mut env = SandboxedEnv::new(Env::new(), settings(VariantKind::Sandboxed));
    let seen = env
        .with_build_environment(|env| {
            env.select_named("gcc-4.7").unwrap();
            (env.get("KEGENV_CC").map(str::to_owned), env.compiler())
        })
        .unwrap();

    assert_eq!(seen.0.as_deref(), Some("gcc-4.7"));
    assert_eq!(seen.1.map(|c| c.to_string()).as_deref(), Some("gcc-4.7"));
}

#[test]
fn invalid_compiler_is_reported_without_mutation() {
    let mut env = BuildEnv::new(host(), settings(VariantKind::Passthrough));
    env.clang();
    let before = env.state().clone();

    let err = env.select_named("msvc").unwrap_err();

    assert!(matches!(err, EnvError::InvalidCompiler { ref name } if name == "msvc"));
    assert_eq!(env.state(), &before);
}

// =============================================================================
// Store behavior through the activation API
// =============================================================================

#[test]
fn path_helpers_use_platform_separator() {
    let mut env = BuildEnv::new(Env::new(), settings(VariantKind::Sandboxed));
    env.append_path("FOO", "/usr/bin").unwrap();
    env.append_path("FOO", "/bin").unwrap();
    env.prepend_path("FOO", "/opt/keg/bin").unwrap();

    let expected = ["/opt/keg/bin", "/usr/bin", "/bin"].join(PATH_LIST_SEPARATOR);
    assert_eq!(env.get("FOO"), Some(expected.as_str()));
}

#[test]
fn string_only_policy_rejects_numbers() {
    let strict = BuildSettings::builder()
        .coercion(CoercionPolicy::StringOnly)
        .build();
    let mut env = PassthroughEnv::new(Env::new(), strict);

    let err = env.set("JOBS", 4_u32).unwrap_err();
    assert!(matches!(err, EnvError::CoercionFailure { ref key, .. } if key == "JOBS"));
    assert!(!env.env().contains("JOBS"));
    env.set("JOBS", "4").unwrap();

    let mut lenient = PassthroughEnv::default();
    lenient.set("JOBS", 4_u32).unwrap();
    assert_eq!(lenient.get("JOBS"), env.get("JOBS"));
}

#[test]
fn exported_map_is_ready_for_process_spawning() {
    let mut env = BuildEnv::new(host(), settings(VariantKind::Sandboxed));
    let vars = env
        .with_build_environment(|env| env.env().to_map())
        .unwrap();

    let mut command = std::process::Command::new("true");
    command.env_clear().envs(&vars);
    let configured: Vec<_> = command.get_envs().collect();
    assert_eq!(configured.len(), vars.len());
    assert!(vars.contains_key("KEGENV_OPTFLAGS"));
}
