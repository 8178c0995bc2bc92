//! Presentation projector: read-only view model for the external renderer

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::{MultiStepConfig, TabStyle};

use super::gate::ValidationGate;
use super::navigation::NavigationController;
use super::registry::StepRegistry;
use super::types::StepKey;

/// Display data for one attached step (one tab)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StepView {
    pub key: StepKey,
    pub label: String,
    pub ordinal: usize,
    pub is_active: bool,
    /// Visited and not blocking
    pub is_complete: bool,
    pub is_blocked: bool,
    pub is_visited: bool,
}

/// Configuration echoed back to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ConfigEcho {
    pub tab_style: TabStyle,
    pub hide_progress_labels: bool,
    pub allow_incomplete: bool,
}

impl From<&MultiStepConfig> for ConfigEcho {
    fn from(config: &MultiStepConfig) -> Self {
        Self {
            tab_style: config.tab_style,
            hide_progress_labels: config.hide_progress_labels,
            allow_incomplete: config.allow_incomplete,
        }
    }
}

/// Everything a renderer needs to draw tabs and navigation buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ViewModel {
    pub steps: Vec<StepView>,
    pub active_key: Option<StepKey>,
    pub active_ordinal: Option<usize>,
    pub total_steps: usize,
    /// Whether a "previous" button should be offered
    pub has_previous: bool,
    /// Whether a "next" button should be offered
    pub has_next: bool,
    /// Labels are hidden only for the progress style with `hide_progress_labels`
    pub show_labels: bool,
    pub config: ConfigEcho,
}

impl ViewModel {
    pub fn active(&self) -> Option<&StepView> {
        self.steps.iter().find(|step| step.is_active)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.label.as_str()).collect()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.key.as_str()).collect()
    }
}

/// Derive the view model from current state. Nothing is cached.
pub fn project(
    registry: &StepRegistry,
    gate: &ValidationGate,
    navigation: &NavigationController,
) -> ViewModel {
    let active_key = navigation.active_key();
    let config = navigation.config();

    let steps: Vec<StepView> = registry
        .ordered_attached()
        .enumerate()
        .map(|(ordinal, step)| {
            let blocked = gate.is_blocking(step.key().as_str());
            StepView {
                key: step.key().clone(),
                label: step.label().to_string(),
                ordinal,
                is_active: active_key == Some(step.key()),
                is_complete: step.is_visited() && !blocked,
                is_blocked: blocked,
                is_visited: step.is_visited(),
            }
        })
        .collect();

    let active_ordinal = steps.iter().position(|step| step.is_active);
    let total_steps = steps.len();

    ViewModel {
        has_previous: active_ordinal.is_some_and(|ordinal| ordinal > 0),
        has_next: active_ordinal.is_some_and(|ordinal| ordinal + 1 < total_steps),
        active_key: active_key.cloned(),
        active_ordinal,
        total_steps,
        show_labels: !(config.tab_style == TabStyle::Progress && config.hide_progress_labels),
        config: ConfigEcho::from(config),
        steps,
    }
}
