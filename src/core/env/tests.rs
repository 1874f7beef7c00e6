// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the environment module.

use super::current_env;
use crate::core::env::container::Env;
use crate::core::env::types::{EnvFlags, PATH_LIST_SEPARATOR, Separator};
use crate::core::env::value::CoercionPolicy;
use crate::error::EnvError;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[test]
fn test_env_basic_operations() {
    let mut env = Env::new();
    env.set("FOO", "bar").unwrap();
    env.set("EMPTY", "").unwrap();

    assert_eq!(env.get("FOO"), Some("bar"));
    assert_eq!(env.get("EMPTY"), Some(""), "empty is distinct from absent");
    assert_eq!(env.get("NOTEXIST"), None);

    env.remove("FOO");
    assert_eq!(env.get("FOO"), None);
    assert!(!env.contains("FOO"));
    assert!(env.contains("EMPTY"));
}

#[test]
#[cfg(not(windows))]
fn test_env_keys_are_case_sensitive_off_windows() {
    let mut env = Env::new();
    env.set("Path", "/a").unwrap();
    env.set("PATH", "/b").unwrap();

    assert_eq!(env.len(), 2);
    assert_eq!(env.get("Path"), Some("/a"));
}

#[test]
#[cfg(windows)]
fn test_env_keys_are_case_insensitive_on_windows() {
    let mut env = Env::new();
    env.set("Path", "C:\\a").unwrap();
    env.set("PATH", "C:\\b").unwrap();

    assert_eq!(env.len(), 1);
    assert_eq!(env.get("path"), Some("C:\\b"));
}

#[test]
fn test_set_overwrites_prior_value() {
    let mut env = Env::new();
    env.set("KEY", "initial").unwrap();
    env.set("KEY", "replaced").unwrap();
    assert_eq!(env.get("KEY"), Some("replaced"));
}

#[test]
fn test_set_with_flags() {
    let mut env = Env::new();
    env.set("KEY", "initial").unwrap();

    env.set_with_flags("KEY", "appended", EnvFlags::Append, Separator::Space)
        .unwrap();
    env.set_with_flags("KEY", "prepended", EnvFlags::Prepend, Separator::Space)
        .unwrap();
    insta::assert_snapshot!(env.get("KEY").unwrap(), @"prepended initial appended");

    env.set_with_flags("KEY", "replaced", EnvFlags::Replace, Separator::Space)
        .unwrap();
    assert_eq!(env.get("KEY"), Some("replaced"));
}

#[test]
fn test_append_existing_key() {
    let mut env = Env::new();
    env.set("foo", "bar").unwrap();
    env.append("foo", "1").unwrap();
    assert_eq!(env.get("foo"), Some("bar 1"));
}

#[test]
fn test_append_existing_key_empty() {
    let mut env = Env::new();
    env.set("foo", "").unwrap();
    env.append("foo", "1").unwrap();
    assert_eq!(env.get("foo"), Some("1"));
}

#[test]
fn test_append_missing_key() {
    let mut env = Env::new();
    env.append("foo", "1").unwrap();
    assert_eq!(env.get("foo"), Some("1"));
}

#[test]
fn test_append_chains_with_single_spaces() {
    let mut env = Env::new();
    env.append("foo", "v").unwrap().append("foo", "w").unwrap();
    assert_eq!(env.get("foo"), Some("v w"));

    let mut env = Env::new();
    env.set("foo", "old").unwrap();
    env.append("foo", "v").unwrap().append("foo", "w").unwrap();
    assert_eq!(env.get("foo"), Some("old v w"));
}

#[test]
fn test_prepend_existing_key() {
    let mut env = Env::new();
    env.set("foo", "bar").unwrap();
    env.prepend("foo", "1").unwrap();
    assert_eq!(env.get("foo"), Some("1 bar"));
}

#[test]
fn test_prepend_existing_key_empty() {
    let mut env = Env::new();
    env.set("foo", "").unwrap();
    env.prepend("foo", "1").unwrap();
    assert_eq!(env.get("foo"), Some("1"));
}

#[test]
fn test_prepend_missing_key() {
    let mut env = Env::new();
    env.prepend("foo", "1").unwrap();
    assert_eq!(env.get("foo"), Some("1"));
}

#[test]
fn test_append_path() {
    let mut env = Env::new();
    env.append_path("FOO", "/usr/bin").unwrap();
    assert_eq!(env.get("FOO"), Some("/usr/bin"));

    env.append_path("FOO", "/bin").unwrap();
    assert_eq!(
        env.get("FOO").unwrap(),
        format!("/usr/bin{PATH_LIST_SEPARATOR}/bin")
    );
}

#[test]
fn test_prepend_path() {
    let mut env = Env::new();
    env.prepend_path("FOO", "/usr/bin").unwrap();
    assert_eq!(env.get("FOO"), Some("/usr/bin"));

    env.prepend_path("FOO", "/bin").unwrap();
    assert_eq!(
        env.get("FOO").unwrap(),
        format!("/bin{PATH_LIST_SEPARATOR}/usr/bin")
    );
}

#[test]
fn test_path_helpers_accept_paths_and_skip_empty_entries() {
    let mut env = Env::new();
    env.set("FOO", "").unwrap();
    env.append_path("FOO", PathBuf::from("/opt/bin")).unwrap();
    env.prepend_path("FOO", "").unwrap();
    env.append_path("FOO", "").unwrap();

    assert_eq!(env.get("FOO"), Some("/opt/bin"));
}

#[test]
fn test_append_coerces_value_to_string() {
    let mut env = Env::new();
    env.append("foo", 42).unwrap();
    assert_eq!(env.get("foo"), Some("42"));
}

#[test]
fn test_prepend_coerces_value_to_string() {
    let mut env = Env::new();
    env.prepend("foo", 42).unwrap();
    assert_eq!(env.get("foo"), Some("42"));
}

#[test]
fn test_set_coerces_value_to_string() {
    let mut env = Env::new();
    env.set("JOBS", 8_u32).unwrap().set("VERBOSE", true).unwrap();
    assert_eq!(env.get("JOBS"), Some("8"));
    assert_eq!(env.get("VERBOSE"), Some("true"));
}

#[test]
fn test_string_only_policy_rejects_non_string_values() {
    let mut env = Env::new().with_policy(CoercionPolicy::StringOnly);
    env.set("foo", "bar").unwrap();

    let err = env.append("foo", 42).unwrap_err();
    assert!(matches!(err, EnvError::CoercionFailure { ref key, .. } if key == "foo"));
    assert_eq!(env.get("foo"), Some("bar"), "failed append leaves value intact");

    env.append("foo", "42").unwrap();
    assert_eq!(env.get("foo"), Some("bar 42"));
}

#[test]
#[cfg(unix)]
fn test_non_utf8_path_is_a_coercion_failure() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let mut env = Env::new();
    let path = std::path::Path::new(OsStr::from_bytes(b"/opt/\xff/bin"));

    let err = env.append_path("PATH", path).unwrap_err();
    assert!(matches!(err, EnvError::CoercionFailure { .. }));
    assert!(!env.contains("PATH"));
}

#[test]
fn test_remove_value() {
    let mut env = Env::new();
    env.set("CFLAGS", "-Os -w -pipe -w").unwrap();

    env.remove_value("CFLAGS", "-w");
    assert_eq!(env.get("CFLAGS"), Some("-Os -pipe"));

    env.remove_value("CFLAGS", "-Os").remove_value("CFLAGS", "-pipe");
    assert!(!env.contains("CFLAGS"), "emptied list is deleted");

    env.remove_value("MISSING", "-w");
    assert!(env.is_empty());
}

#[test]
fn test_remove_value_without_match_leaves_variable() {
    let mut env = Env::new();
    env.set("CFLAGS", "").unwrap();
    env.set("CXXFLAGS", "-O2   -g").unwrap();
    let before = env.clone();

    env.remove_value("CFLAGS", "-x").remove_value("CXXFLAGS", "-x");

    assert_eq!(env.get("CFLAGS"), Some(""));
    assert_eq!(env.get("CXXFLAGS"), Some("-O2   -g"));
    assert_eq!(env, before);
}

#[test]
fn test_env_structural_equality() {
    let mut env1 = Env::new();
    env1.set("A", "1").unwrap();
    let mut env2 = Env::new().with_policy(CoercionPolicy::StringOnly);
    env2.set("A", "1").unwrap();

    assert_eq!(env1, env2);

    env2.set("B", "2").unwrap();
    assert_ne!(env1, env2);
}

#[test]
fn test_env_copy_on_write() {
    let mut env1 = Env::new();
    env1.set("KEY1", "value1").unwrap();

    // Clone shares data initially
    let mut env2 = env1.clone();
    assert_eq!(env1, env2);

    // Modifying env2 triggers copy-on-write, doesn't affect env1
    env2.set("KEY2", "value2").unwrap();

    assert_eq!(env1.get("KEY2"), None);
    assert_eq!(env2.get("KEY1"), Some("value1"));
    assert_eq!(env2.get("KEY2"), Some("value2"));
}

#[test]
fn test_retain() {
    let mut env = Env::new();
    env.set("HOME", "/home/me").unwrap();
    env.set("CFLAGS", "-O2").unwrap();
    env.set("KEGENV_CC", "clang").unwrap();

    env.retain(|key, _| key == "HOME" || key.starts_with("KEGENV_"));

    insta::assert_snapshot!(
        format!("{:?}", env.to_map()),
        @r#"{"HOME": "/home/me", "KEGENV_CC": "clang"}"#
    );
}

#[test]
fn test_current_env() {
    // Behavioral test - PATH should exist
    let env = current_env();
    assert!(
        env.get("PATH").is_some() || env.get("Path").is_some(),
        "PATH should exist in current environment"
    );
}

#[test]
fn test_env_from_map() {
    let mut map = BTreeMap::new();
    map.insert("KEY1".to_string(), "value1".to_string());
    map.insert("KEY2".to_string(), "value2".to_string());

    let env = Env::from_map(map.clone());

    assert_eq!(env.len(), 2);
    assert_eq!(env.to_map(), map);
    assert_eq!(
        env.iter().map(|(k, _)| k).collect::<Vec<_>>(),
        ["KEY1", "KEY2"]
    );
}
