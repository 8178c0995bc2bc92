//! Scripted replay of collaborator notifications
//!
//! A replay script is the sequence of events a host renderer would send to a
//! multi-step container (mounts, hides, validation changes, button presses),
//! written as YAML or JSON. Running it yields one frame per event with the
//! outcome and the resulting view model.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{MultiStepConfig, MultiStepOverrides};
use crate::diagnostics::{DiagnosticsSink, NodeKind, TracingSink};
use crate::steps::{MultiStep, NavigationError, RegisterOutcome, StepKey, ViewModel};

/// One notification or user action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// A step node mounted (or re-appeared)
    Mount {
        key: String,
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Conditional hide
    Hide { key: String },
    /// Permanent teardown
    Unmount { key: String },
    /// Position change in the declaration order
    Move { key: String, index: usize },
    /// Aggregate validation status for a step
    Validation { step: String, blocking: bool },
    /// Validation status for a single field
    Field {
        step: String,
        field: String,
        blocking: bool,
    },
    /// An immediate child node of the container attached
    Child {
        node: String,
        #[serde(rename = "type")]
        node_type: String,
    },
    Next,
    Previous,
    GoTo { key: String },
    /// Container options changed
    Configure(MultiStepOverrides),
}

/// What an event did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// State changed
    Applied,
    /// Valid event with nothing to do
    Ignored,
    /// Navigation moved to a new step
    Moved { to: StepKey },
    /// Navigation refused
    Refused { reason: String },
    /// Structural misuse was reported
    Warned { message: String },
}

impl From<Result<StepKey, NavigationError>> for Outcome {
    fn from(result: Result<StepKey, NavigationError>) -> Self {
        match result {
            Ok(to) => Outcome::Moved { to },
            Err(err) => Outcome::Refused {
                reason: err.to_string(),
            },
        }
    }
}

fn changed(flag: bool) -> Outcome {
    if flag {
        Outcome::Applied
    } else {
        Outcome::Ignored
    }
}

/// Events plus the container options they run against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default, skip_serializing_if = "MultiStepOverrides::is_empty")]
    pub options: MultiStepOverrides,
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

impl ReplayScript {
    pub fn from_yaml(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("Failed to parse replay script as YAML")
    }

    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Failed to parse replay script as JSON")
    }

    /// Load a script, choosing the format by file extension (JSON or YAML)
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&source),
            _ => Self::from_yaml(&source),
        }
    }
}

/// State after one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayFrame {
    pub index: usize,
    pub event: ReplayEvent,
    pub outcome: Outcome,
    pub view: ViewModel,
}

/// Drives a [`MultiStep`] from replay events
#[derive(Debug)]
pub struct Replay {
    multistep: MultiStep,
}

impl Replay {
    /// Start a replay with plugin defaults overlaid by the script's options
    pub fn new(defaults: &MultiStepConfig, script: &ReplayScript) -> Self {
        Self::with_sink(defaults, script, Box::new(TracingSink))
    }

    pub fn with_sink(
        defaults: &MultiStepConfig,
        script: &ReplayScript,
        sink: Box<dyn DiagnosticsSink>,
    ) -> Self {
        let config = defaults.with_overrides(&script.options);
        Self {
            multistep: MultiStep::with_sink(config, sink),
        }
    }

    pub fn multistep(&self) -> &MultiStep {
        &self.multistep
    }

    /// Apply one event to the container
    pub fn apply(&mut self, event: &ReplayEvent) -> Outcome {
        let ms = &mut self.multistep;
        match event {
            ReplayEvent::Mount { key, index, label } => {
                let outcome = match label {
                    Some(label) => ms.on_step_mount_labeled(key.as_str(), *index, label.as_str()),
                    None => ms.on_step_mount(key.as_str(), *index),
                };
                changed(outcome != RegisterOutcome::AlreadyAttached)
            }
            ReplayEvent::Hide { key } => changed(ms.on_step_unmount_conditional(key)),
            ReplayEvent::Unmount { key } => changed(ms.on_step_unmount_permanent(key)),
            ReplayEvent::Move { key, index } => changed(ms.on_step_moved(key, *index)),
            ReplayEvent::Validation { step, blocking } => {
                changed(ms.on_field_validation_changed(step.as_str(), *blocking))
            }
            ReplayEvent::Field {
                step,
                field,
                blocking,
            } => changed(ms.on_field_state_changed(step.as_str(), field, *blocking)),
            ReplayEvent::Child { node, node_type } => {
                match ms.on_child_attached(node, &NodeKind::from_type_name(node_type)) {
                    Some(misuse) => Outcome::Warned {
                        message: misuse.to_string(),
                    },
                    None => Outcome::Ignored,
                }
            }
            ReplayEvent::Next => ms.try_next().into(),
            ReplayEvent::Previous => ms.try_previous().into(),
            ReplayEvent::GoTo { key } => ms.try_go_to(key).into(),
            ReplayEvent::Configure(overrides) => {
                let updated = ms.config().with_overrides(overrides);
                let differs = updated != *ms.config();
                ms.update_config(updated);
                changed(differs)
            }
        }
    }

    /// Run every event in order, capturing a frame after each
    pub fn run(&mut self, events: &[ReplayEvent]) -> Vec<ReplayFrame> {
        events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                let outcome = self.apply(event);
                tracing::debug!(index, ?event, ?outcome, "replayed event");
                ReplayFrame {
                    index,
                    event: event.clone(),
                    outcome,
                    view: self.multistep.view_model(),
                }
            })
            .collect()
    }
}

/// Convenience: run a whole script against plugin defaults
pub fn run_script(defaults: &MultiStepConfig, script: &ReplayScript) -> Vec<ReplayFrame> {
    Replay::new(defaults, script).run(&script.events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TabStyle;

    const SCRIPT: &str = r"
options:
  tabStyle: progress
events:
  - event: mount
    key: stepOne
    index: 0
  - event: mount
    key: stepTwo
    index: 1
  - event: field
    step: stepOne
    field: name
    blocking: true
  - event: next
  - event: field
    step: stepOne
    field: name
    blocking: false
  - event: next
";

    #[test]
    fn test_parse_yaml_script() {
        let script = ReplayScript::from_yaml(SCRIPT).unwrap();
        assert_eq!(script.options.tab_style, Some(TabStyle::Progress));
        assert_eq!(script.events.len(), 6);
        assert_eq!(script.events[3], ReplayEvent::Next);
    }

    #[test]
    fn test_run_script_frames() {
        let script = ReplayScript::from_yaml(SCRIPT).unwrap();
        let frames = run_script(&MultiStepConfig::default(), &script);
        assert_eq!(frames.len(), 6);
        assert!(matches!(frames[3].outcome, Outcome::Refused { .. }));
        assert_eq!(frames[3].view.active_key, Some(StepKey::from("stepOne")));
        assert_eq!(
            frames[5].outcome,
            Outcome::Moved {
                to: StepKey::from("stepTwo")
            }
        );
        assert_eq!(frames[5].view.config.tab_style, TabStyle::Progress);
    }

    #[test]
    fn test_parse_json_script() {
        let script = ReplayScript::from_json(
            r#"{"events": [{"event": "mount", "key": "a", "index": 0}, {"event": "go_to", "key": "a"}, {"event": "configure", "allowIncomplete": true}]}"#,
        )
        .unwrap();
        assert_eq!(
            script.events[2],
            ReplayEvent::Configure(MultiStepOverrides {
                allow_incomplete: Some(true),
                ..MultiStepOverrides::default()
            })
        );
        let frames = run_script(&MultiStepConfig::default(), &script);
        assert_eq!(frames[2].outcome, Outcome::Applied);
        assert!(frames[2].view.config.allow_incomplete);
    }

    #[test]
    fn test_repeated_mount_is_ignored() {
        let events = vec![
            ReplayEvent::Mount {
                key: "a".into(),
                index: 0,
                label: None,
            },
            ReplayEvent::Mount {
                key: "a".into(),
                index: 0,
                label: None,
            },
        ];
        let mut replay = Replay::new(&MultiStepConfig::default(), &ReplayScript::default());
        let frames = replay.run(&events);
        assert_eq!(frames[0].outcome, Outcome::Applied);
        assert_eq!(frames[1].outcome, Outcome::Ignored);
    }

    #[test]
    fn test_child_event_warns() {
        let script = ReplayScript::from_yaml(
            "events:\n  - event: child\n    node: email\n    type: text\n",
        )
        .unwrap();
        let frames = run_script(&MultiStepConfig::default(), &script);
        assert!(matches!(frames[0].outcome, Outcome::Warned { .. }));
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let json_path = temp_dir.path().join("script.json");
        std::fs::write(&json_path, r#"{"events": [{"event": "next"}]}"#).unwrap();
        assert_eq!(
            ReplayScript::load(&json_path).unwrap().events,
            vec![ReplayEvent::Next]
        );

        let yaml_path = temp_dir.path().join("script.yaml");
        std::fs::write(&yaml_path, "events:\n  - event: previous\n").unwrap();
        assert_eq!(
            ReplayScript::load(&yaml_path).unwrap().events,
            vec![ReplayEvent::Previous]
        );

        assert!(ReplayScript::load(&temp_dir.path().join("missing.yaml")).is_err());
    }
}
