// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Drop guard behind scoped activation and deparallelization.
//!
//! ```text
//! ScopeGuard::full(target)         snapshot = ActivationState (vars + compiler)
//! ScopeGuard::variable(target, k)  snapshot = previous value of k (or absent)
//!        |
//!        v
//!   action(&mut *guard)
//!        |
//!        v
//!   Drop: restore snapshot, exactly once (return, Err, or unwinding)
//! ```

use std::ops::{Deref, DerefMut};

use tracing::trace;

use super::{ActivationState, EnvActivation};

/// What a guard puts back when it is dropped.
#[derive(Debug)]
enum Snapshot {
    Full(ActivationState),
    Variable {
        key: &'static str,
        value: Option<String>,
    },
}

/// Borrows an activation for the length of a scope and restores it on drop.
pub struct ScopeGuard<'a, E: EnvActivation> {
    target: &'a mut E,
    snapshot: Option<Snapshot>,
}

impl<'a, E: EnvActivation> ScopeGuard<'a, E> {
    /// Snapshots the whole activation state of `target`.
    pub fn full(target: &'a mut E) -> Self {
        let state = target.state().clone();
        trace!(vars = state.env().len(), "entering scoped activation");
        Self {
            target,
            snapshot: Some(Snapshot::Full(state)),
        }
    }

    /// Snapshots a single variable of `target`.
    pub fn variable(target: &'a mut E, key: &'static str) -> Self {
        let value = target.get(key).map(str::to_owned);
        trace!(key, present = value.is_some(), "saving variable for scope");
        Self {
            target,
            snapshot: Some(Snapshot::Variable { key, value }),
        }
    }
}

impl<E: EnvActivation> Deref for ScopeGuard<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &*self.target
    }
}

impl<E: EnvActivation> DerefMut for ScopeGuard<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut *self.target
    }
}

impl<E: EnvActivation> Drop for ScopeGuard<'_, E> {
    fn drop(&mut self) {
        match self.snapshot.take() {
            Some(Snapshot::Full(state)) => {
                *self.target.state_mut() = state;
                trace!(
                    vars = self.target.state().env().len(),
                    "restored environment after scoped activation"
                );
            }
            Some(Snapshot::Variable { key, value }) => {
                self.target.env_mut().restore_var(key, value);
                trace!(key, "restored variable after scope");
            }
            None => {}
        }
    }
}
