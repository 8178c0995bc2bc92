//! Structural misuse diagnostics
//!
//! Placement problems (a step outside a multi-step container, or a non-step
//! child directly inside one) are reported to an injectable sink instead of a
//! global console. Each offending node is reported once; rendering goes on.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Node type names as they appear in form declarations
pub const MULTI_STEP_TYPE: &str = "multi-step";
pub const STEP_TYPE: &str = "step";

/// Kind of a node in the host form tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    MultiStep,
    Step,
    /// Any other input, by type name (e.g. "text")
    Input(String),
}

impl NodeKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            MULTI_STEP_TYPE => NodeKind::MultiStep,
            STEP_TYPE => NodeKind::Step,
            other => NodeKind::Input(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::MultiStep => MULTI_STEP_TYPE,
            NodeKind::Step => STEP_TYPE,
            NodeKind::Input(name) => name,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A misplaced node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralMisuse {
    #[error(
        "Invalid use of step node '{node}'. A step must be an immediate child of a multi-step container."
    )]
    StepOutsideContainer { node: String },

    #[error(
        "Invalid input location for '{node}' (type '{kind}'). A multi-step container should only have step nodes as immediate children. Failure to wrap child inputs in a step can lead to undesired behaviors."
    )]
    NonStepChild { node: String, kind: String },
}

impl StructuralMisuse {
    pub fn node(&self) -> &str {
        match self {
            StructuralMisuse::StepOutsideContainer { node } => node,
            StructuralMisuse::NonStepChild { node, .. } => node,
        }
    }
}

/// Receives structural misuse reports
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, misuse: &StructuralMisuse);
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<S> {
    fn report(&self, misuse: &StructuralMisuse) {
        (**self).report(misuse);
    }
}

/// Default sink: emits a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, misuse: &StructuralMisuse) {
        tracing::warn!(node = misuse.node(), "{}", misuse);
    }
}

/// Sink that keeps reports in memory, for tests and embedding hosts
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<StructuralMisuse>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<StructuralMisuse> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticsSink for MemorySink {
    fn report(&self, misuse: &StructuralMisuse) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(misuse.clone());
    }
}

/// Checks node placement at attachment time and reports each offender once
pub struct StructureValidator {
    sink: Box<dyn DiagnosticsSink>,
    reported: HashSet<String>,
}

impl fmt::Debug for StructureValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructureValidator")
            .field("reported", &self.reported)
            .finish_non_exhaustive()
    }
}

impl Default for StructureValidator {
    fn default() -> Self {
        Self::new(Box::new(TracingSink))
    }
}

impl StructureValidator {
    pub fn new(sink: Box<dyn DiagnosticsSink>) -> Self {
        Self {
            sink,
            reported: HashSet::new(),
        }
    }

    /// Classify a node attachment. Returns the misuse, if any; the sink only
    /// hears about a given node the first time.
    pub fn check_attachment(
        &mut self,
        node: &str,
        kind: &NodeKind,
        parent: Option<&NodeKind>,
    ) -> Option<StructuralMisuse> {
        let inside_container = matches!(parent, Some(NodeKind::MultiStep));
        let misuse = match kind {
            NodeKind::Step if !inside_container => StructuralMisuse::StepOutsideContainer {
                node: node.to_string(),
            },
            NodeKind::Step => return None,
            other if inside_container => StructuralMisuse::NonStepChild {
                node: node.to_string(),
                kind: other.type_name().to_string(),
            },
            _ => return None,
        };

        if self.reported.insert(node.to_string()) {
            self.sink.report(&misuse);
        }
        Some(misuse)
    }

    /// Whether `node` has already been reported
    pub fn has_reported(&self, node: &str) -> bool {
        self.reported.contains(node)
    }

    /// Forget a node so a later re-attachment is checked afresh
    pub fn forget(&mut self, node: &str) {
        self.reported.remove(node);
    }
}
