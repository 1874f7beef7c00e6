// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment variable struct and copy-on-write implementation.
//!
//! # Architecture
//!
//! ```text
//! Env (copy-on-write)
//! data: Arc<EnvData>, clone shares the Arc until Arc::make_mut()
//! policy: CoercionPolicy applied by every assignment
//!
//! set / append / prepend            Separator::Space
//! append_path / prepend_path        Separator::PathList
//! missing or empty old value  -->   new value alone, no separator
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use super::types::{EnvData, EnvFlags, EnvKey, Separator};
use super::value::{CoercionPolicy, EnvValue, coerce};
use crate::error::EnvResult;

/// A set of environment variables with copy-on-write semantics.
///
/// Cloning is cheap: clones share data until one of them is modified, which
/// is what makes snapshots for scoped activation inexpensive.
///
/// Two stores are equal when they hold the same keys with the same values;
/// the coercion policy does not take part in the comparison.
///
/// # Thread Safety
/// `Env` is `Send` and `Sync` due to its use of `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Env {
    data: Arc<EnvData>,
    policy: CoercionPolicy,
}

impl PartialEq for Env {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) || self.data == other.data
    }
}

impl Eq for Env {}

impl Env {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment from a map of variables.
    #[must_use]
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        let data = EnvData::from_vars(vars.into_iter().map(|(k, v)| (EnvKey::new(k), v)).collect());
        Self {
            data: Arc::new(data),
            policy: CoercionPolicy::default(),
        }
    }

    /// Returns this environment with a different coercion policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CoercionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    /// Sets an environment variable, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EnvError::CoercionFailure`] if `value` has no
    /// string form under this store's policy.
    pub fn set<V: EnvValue>(&mut self, key: impl Into<String>, value: V) -> EnvResult<&mut Self> {
        self.set_with_flags(key, value, EnvFlags::Replace, Separator::Space)
    }

    /// Sets an environment variable with specific flags.
    ///
    /// `Append` and `Prepend` join with `separator`, except when the variable
    /// is missing or empty: then the new value is stored alone.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EnvError::CoercionFailure`] if `value` has no
    /// string form under this store's policy. The store is left unchanged.
    pub fn set_with_flags<V: EnvValue>(
        &mut self,
        key: impl Into<String>,
        value: V,
        flags: EnvFlags,
        separator: Separator,
    ) -> EnvResult<&mut Self> {
        let key = key.into();
        let value = coerce(self.policy, &key, &value)?;
        let key = EnvKey::new(key);
        let vars = Arc::make_mut(&mut self.data).vars_mut();

        let value = match (flags, vars.get(&key)) {
            (EnvFlags::Append, Some(existing)) if !existing.is_empty() => {
                format!("{existing}{}{value}", separator.as_str())
            }
            (EnvFlags::Prepend, Some(existing)) if !existing.is_empty() => {
                format!("{value}{}{existing}", separator.as_str())
            }
            _ => value,
        };
        vars.insert(key, value);

        Ok(self)
    }

    /// Appends `value` to a space-separated list variable.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    pub fn append<V: EnvValue>(&mut self, key: impl Into<String>, value: V) -> EnvResult<&mut Self> {
        self.set_with_flags(key, value, EnvFlags::Append, Separator::Space)
    }

    /// Prepends `value` to a space-separated list variable.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    pub fn prepend<V: EnvValue>(&mut self, key: impl Into<String>, value: V) -> EnvResult<&mut Self> {
        self.set_with_flags(key, value, EnvFlags::Prepend, Separator::Space)
    }

    /// Appends an entry to a `PATH`-like variable. Empty entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    pub fn append_path<V: EnvValue>(
        &mut self,
        key: impl Into<String>,
        value: V,
    ) -> EnvResult<&mut Self> {
        self.modify_path(key.into(), value, EnvFlags::Append)
    }

    /// Prepends an entry to a `PATH`-like variable. Empty entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be coerced to a string.
    pub fn prepend_path<V: EnvValue>(
        &mut self,
        key: impl Into<String>,
        value: V,
    ) -> EnvResult<&mut Self> {
        self.modify_path(key.into(), value, EnvFlags::Prepend)
    }

    fn modify_path<V: EnvValue>(
        &mut self,
        key: String,
        value: V,
        flags: EnvFlags,
    ) -> EnvResult<&mut Self> {
        let entry = coerce(self.policy, &key, &value)?;
        if entry.is_empty() {
            return Ok(self);
        }
        self.set_with_flags(key, entry, flags, Separator::PathList)
    }

    /// Removes every space-separated occurrence of `value` from a list
    /// variable, deleting the variable once nothing is left.
    ///
    /// A variable that does not contain `value` is left as it is.
    pub fn remove_value(&mut self, key: &str, value: &str) -> &mut Self {
        let Some(current) = self.get(key) else {
            return self;
        };
        if !current.split_whitespace().any(|entry| entry == value) {
            return self;
        }

        let remaining = current
            .split_whitespace()
            .filter(|entry| *entry != value)
            .collect::<Vec<_>>()
            .join(" ");

        if remaining.is_empty() {
            self.remove(key)
        } else {
            let vars = Arc::make_mut(&mut self.data).vars_mut();
            vars.insert(EnvKey::new(key), remaining);
            self
        }
    }

    /// Gets an environment variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .vars()
            .get(&EnvKey::new(key))
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.vars().contains_key(&EnvKey::new(key))
    }

    /// Removes an environment variable.
    pub fn remove(&mut self, key: &str) -> &mut Self {
        let key = EnvKey::new(key);
        if self.data.vars().contains_key(&key) {
            Arc::make_mut(&mut self.data).vars_mut().remove(&key);
        }
        self
    }

    /// Stores an already-textual value, or removes the variable for `None`.
    ///
    /// Used to put back values previously read from a store, so no coercion
    /// applies.
    pub fn restore_var(&mut self, key: &str, value: Option<String>) -> &mut Self {
        match value {
            Some(value) => {
                Arc::make_mut(&mut self.data)
                    .vars_mut()
                    .insert(EnvKey::new(key), value);
                self
            }
            None => self.remove(key),
        }
    }

    /// Keeps only the variables for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) -> &mut Self {
        Arc::make_mut(&mut self.data)
            .vars_mut()
            .retain(|k, v| keep(k.as_str(), v));
        self
    }

    /// Returns all environment variables as a map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    /// Returns an iterator over environment variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data
            .vars()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.vars().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.vars().len()
    }
}
