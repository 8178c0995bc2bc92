//! Type definitions for the step navigation engine

use std::borrow::Borrow;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::label::humanize_key;

/// Stable identity of a step, assigned at declaration time and independent
/// of the step's position.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, JsonSchema,
)]
#[serde(transparent)]
#[ts(export)]
pub struct StepKey(String);

impl StepKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StepKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for StepKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&StepKey> for StepKey {
    fn from(key: &StepKey) -> Self {
        key.clone()
    }
}

/// One panel of a multi-step form as tracked by the registry.
///
/// Validity is not stored here: the [`ValidationGate`](super::ValidationGate)
/// owns it and the projector joins the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub(crate) key: StepKey,
    pub(crate) label: String,
    /// Position in the container's declaration order (not among mounted siblings)
    pub(crate) declared_index: usize,
    /// Registration sequence, breaks ties between equal declared indices
    pub(crate) sequence: u64,
    /// Dense position among attached steps; `None` while detached
    pub(crate) ordinal: Option<usize>,
    pub(crate) attached: bool,
    pub(crate) visited: bool,
}

impl Step {
    pub(crate) fn new(key: StepKey, declared_index: usize, sequence: u64) -> Self {
        Self {
            label: humanize_key(key.as_str()),
            key,
            declared_index,
            sequence,
            ordinal: None,
            attached: true,
            visited: false,
        }
    }

    pub fn key(&self) -> &StepKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn declared_index(&self) -> usize {
        self.declared_index
    }

    pub fn ordinal(&self) -> Option<usize> {
        self.ordinal
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Sort key for declaration order: declared index, then first registration wins
    pub(crate) fn order_key(&self) -> (usize, u64) {
        (self.declared_index, self.sequence)
    }
}

/// Outcome of a mount notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterOutcome {
    /// A new step record was created
    Inserted,
    /// A conditionally hidden step was shown again
    Reattached,
    /// The key was already attached; nothing changed
    AlreadyAttached,
}

/// Navigation state machine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavState {
    /// No attached step exists yet (or all of them were hidden)
    #[default]
    Uninitialized,
    /// Exactly one step is current
    Active(StepKey),
}

impl NavState {
    pub fn active_key(&self) -> Option<&StepKey> {
        match self {
            NavState::Uninitialized => None,
            NavState::Active(key) => Some(key),
        }
    }
}
