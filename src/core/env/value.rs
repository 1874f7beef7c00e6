// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversion of typed values into stored environment strings.
//!
//! ```text
//! EnvValue::KIND
//!   Text     str, String, Cow<str>, char, Path, PathBuf, OsStr, OsString
//!   Coerced  integers, bool
//!
//! CoercionPolicy
//!   Lenient     Text + Coerced accepted (42 -> "42")
//!   StringOnly  Coerced rejected with CoercionFailure
//! ```
//!
//! Accepting numbers is a compatibility choice: build scripts routinely pass
//! job counts and version numbers straight into flag lists. Stores that want
//! the stricter contract opt into [`CoercionPolicy::StringOnly`].

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{EnvError, EnvResult};

/// Whether a value type is string-like or only has a canonical string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Already textual; stored as-is.
    Text,
    /// Non-string value converted through its `Display` form.
    Coerced,
}

/// How a store treats values whose kind is [`ValueKind::Coerced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoercionPolicy {
    /// Convert non-string values to their canonical string form.
    #[default]
    Lenient,
    /// Reject non-string values.
    StringOnly,
}

impl std::fmt::Display for CoercionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::StringOnly => write!(f, "string-only"),
        }
    }
}

/// A value that can be assigned to an environment variable.
pub trait EnvValue {
    const KIND: ValueKind;

    /// Returns the string form, or the reason there is none.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the value has no UTF-8 form.
    fn to_env_string(&self) -> Result<Cow<'_, str>, String>;
}

impl<T: EnvValue + ?Sized> EnvValue for &T {
    const KIND: ValueKind = T::KIND;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        (**self).to_env_string()
    }
}

impl EnvValue for str {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        Ok(Cow::Borrowed(self))
    }
}

impl EnvValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl EnvValue for Cow<'_, str> {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        Ok(Cow::Borrowed(self.as_ref()))
    }
}

impl EnvValue for char {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        Ok(Cow::Owned(self.to_string()))
    }
}

impl EnvValue for OsStr {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        self.to_str()
            .map(Cow::Borrowed)
            .ok_or_else(|| format!("{} is not valid UTF-8", self.display()))
    }
}

impl EnvValue for OsString {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        self.as_os_str().to_env_string()
    }
}

impl EnvValue for Path {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        self.as_os_str().to_env_string()
    }
}

impl EnvValue for PathBuf {
    const KIND: ValueKind = ValueKind::Text;

    fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
        self.as_os_str().to_env_string()
    }
}

macro_rules! impl_coerced_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl EnvValue for $ty {
                const KIND: ValueKind = ValueKind::Coerced;

                fn to_env_string(&self) -> Result<Cow<'_, str>, String> {
                    Ok(Cow::Owned(self.to_string()))
                }
            }
        )+
    };
}

impl_coerced_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool);

/// Converts `value` to the string stored under `key`.
///
/// # Errors
///
/// Returns [`EnvError::CoercionFailure`] if the value has no UTF-8 form, or
/// if it is a non-string value and `policy` is [`CoercionPolicy::StringOnly`].
pub fn coerce<V: EnvValue + ?Sized>(
    policy: CoercionPolicy,
    key: &str,
    value: &V,
) -> EnvResult<String> {
    if V::KIND == ValueKind::Coerced {
        if policy == CoercionPolicy::StringOnly {
            return Err(EnvError::coercion(
                key,
                "non-string value rejected by the string-only coercion policy",
            ));
        }
        trace!(key, "coercing non-string value to its string form");
    }

    value
        .to_env_string()
        .map(Cow::into_owned)
        .map_err(|reason| EnvError::coercion(key, reason))
}
