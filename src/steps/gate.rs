//! Validation gate: per-step blocking status

use std::collections::{BTreeSet, HashMap};

use super::types::StepKey;

#[derive(Debug, Clone, Default)]
struct StepValidity {
    /// Aggregate flag reported for the whole step
    step_blocking: bool,
    /// Individual fields currently reporting a blocking error
    blocking_fields: BTreeSet<String>,
}

impl StepValidity {
    fn is_blocking(&self) -> bool {
        self.step_blocking || !self.blocking_fields.is_empty()
    }
}

/// Tracks which steps hold blocking validation errors.
///
/// Unknown steps are treated as not blocking. Status may be reported before a
/// step is mounted; it is kept until [`forget`](Self::forget) is called for the
/// key, which the container does on every permanent unmount (mounted or not).
/// Keys that are reported but never unmounted stay in the map.
#[derive(Debug, Default, Clone)]
pub struct ValidationGate {
    states: HashMap<StepKey, StepValidity>,
}

impl ValidationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step-level blocking flag. Returns whether it changed.
    pub fn set_blocking(&mut self, key: &StepKey, is_blocking: bool) -> bool {
        let state = self.states.entry(key.clone()).or_default();
        if state.step_blocking == is_blocking {
            return false;
        }
        state.step_blocking = is_blocking;
        tracing::debug!(step = %key, blocking = is_blocking, "step validity changed");
        true
    }

    /// Set the blocking state of a single field inside a step. Returns whether it changed.
    pub fn set_field_blocking(&mut self, key: &StepKey, field: &str, is_blocking: bool) -> bool {
        let state = self.states.entry(key.clone()).or_default();
        let changed = if is_blocking {
            state.blocking_fields.insert(field.to_string())
        } else {
            state.blocking_fields.remove(field)
        };
        if changed {
            tracing::debug!(step = %key, field, blocking = is_blocking, "field validity changed");
        }
        changed
    }

    pub fn is_blocking(&self, key: &str) -> bool {
        self.states.get(key).is_some_and(StepValidity::is_blocking)
    }

    /// Fields currently blocking `key`, sorted by name
    pub fn blocking_fields(&self, key: &str) -> Vec<&str> {
        self.states
            .get(key)
            .map(|state| state.blocking_fields.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether forward navigation may leave `key`
    pub fn can_advance_from(&self, key: &str, allow_incomplete: bool) -> bool {
        allow_incomplete || !self.is_blocking(key)
    }

    /// Drop all validity history for a key. Returns whether anything was stored.
    pub fn forget(&mut self, key: &str) -> bool {
        self.states.remove(key).is_some()
    }

    /// Number of keys with stored validity
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
