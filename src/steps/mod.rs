//! Multi-step navigation engine
//!
//! A [`MultiStep`] container owns three pieces of state and is the only thing
//! that mutates them:
//!
//! ```text
//! MultiStep
//!   ├── StepRegistry          (membership, declaration order, ordinals)
//!   ├── ValidationGate        (per-step blocking status)
//!   └── NavigationController  (active step, configuration snapshot)
//! ```
//!
//! The host renderer sends notifications (`on_step_mount`,
//! `on_step_unmount_conditional`, `on_field_validation_changed`, ...), calls
//! `next`/`previous`/`go_to` from its buttons, and draws from `view_model()`.
//!
//! ```rust
//! use multistep::{MultiStep, MultiStepConfig};
//!
//! let mut wizard = MultiStep::new(MultiStepConfig::default());
//! wizard.on_step_mount("contact", 0);
//! wizard.on_step_mount("payment", 1);
//!
//! wizard.on_field_validation_changed("contact", true);
//! assert!(!wizard.next());
//!
//! wizard.on_field_validation_changed("contact", false);
//! assert!(wizard.next());
//! assert_eq!(wizard.active_key().map(|k| k.as_str()), Some("payment"));
//! ```

use crate::config::MultiStepConfig;
use crate::diagnostics::{
    DiagnosticsSink, NodeKind, StructuralMisuse, StructureValidator, TracingSink,
};

pub mod error;
pub mod gate;
pub mod label;
pub mod navigation;
pub mod projector;
pub mod registry;
pub mod types;

pub use error::NavigationError;
pub use gate::ValidationGate;
pub use label::humanize_key;
pub use navigation::NavigationController;
pub use projector::{project, ConfigEcho, StepView, ViewModel};
pub use registry::StepRegistry;
pub use types::*;


/// The enclosing scope of one multi-step form
#[derive(Debug)]
pub struct MultiStep {
    registry: StepRegistry,
    gate: ValidationGate,
    navigation: NavigationController,
    structure: StructureValidator,
}

impl Default for MultiStep {
    fn default() -> Self {
        Self::new(MultiStepConfig::default())
    }
}

impl MultiStep {
    /// Create a container that reports misuse through `tracing`
    pub fn new(config: MultiStepConfig) -> Self {
        Self::with_sink(config, Box::new(TracingSink))
    }

    /// Create a container with a custom diagnostics sink
    pub fn with_sink(config: MultiStepConfig, sink: Box<dyn DiagnosticsSink>) -> Self {
        Self {
            registry: StepRegistry::new(),
            gate: ValidationGate::new(),
            navigation: NavigationController::new(config),
            structure: StructureValidator::new(sink),
        }
    }

    // ─── Tree notifications ─────────────────────────────────────────────────

    /// A step node appeared at `declared_index` in the declaration order
    pub fn on_step_mount(&mut self, key: impl Into<StepKey>, declared_index: usize) -> RegisterOutcome {
        let key = key.into();
        let outcome = self.registry.register(key.clone(), declared_index);
        tracing::debug!(step = %key, declared_index, ?outcome, "step mounted");
        if outcome != RegisterOutcome::AlreadyAttached {
            self.navigation.reconcile(&mut self.registry, None);
        }
        outcome
    }

    /// Like [`on_step_mount`](Self::on_step_mount) with an explicit tab label
    pub fn on_step_mount_labeled(
        &mut self,
        key: impl Into<StepKey>,
        declared_index: usize,
        label: impl Into<String>,
    ) -> RegisterOutcome {
        let key = key.into();
        let outcome = self.on_step_mount(key.clone(), declared_index);
        self.registry.set_label(key.as_str(), label);
        outcome
    }

    /// A step node changed position in the declaration order
    pub fn on_step_moved(&mut self, key: &str, declared_index: usize) -> bool {
        let moved = self.registry.relocate(key, declared_index);
        if moved {
            tracing::debug!(step = key, declared_index, "step moved");
        }
        moved
    }

    /// A step was hidden by conditional rendering; its record survives
    pub fn on_step_unmount_conditional(&mut self, key: &str) -> bool {
        let anchor = self.anchor_for(key);
        let detached = self.registry.detach(key);
        if detached {
            tracing::debug!(step = key, "step hidden");
            self.navigation.reconcile(&mut self.registry, anchor.as_ref());
        }
        detached
    }

    /// A step was torn down for good.
    ///
    /// Validity reported for the key is dropped even if it never mounted.
    pub fn on_step_unmount_permanent(&mut self, key: &str) -> bool {
        let anchor = self.anchor_for(key);
        self.gate.forget(key);
        let removed = self.registry.remove(key).is_some();
        if removed {
            tracing::debug!(step = key, "step removed");
            self.navigation.reconcile(&mut self.registry, anchor.as_ref());
        }
        removed
    }

    /// An immediate child node of this container was attached
    pub fn on_child_attached(&mut self, node: &str, kind: &NodeKind) -> Option<StructuralMisuse> {
        self.structure
            .check_attachment(node, kind, Some(&NodeKind::MultiStep))
    }

    // ─── Validation notifications ───────────────────────────────────────────

    /// Aggregate validation status of a step changed
    pub fn on_field_validation_changed(&mut self, step: impl Into<StepKey>, is_blocking: bool) -> bool {
        self.gate.set_blocking(&step.into(), is_blocking)
    }

    /// Validation status of one field inside a step changed
    pub fn on_field_state_changed(
        &mut self,
        step: impl Into<StepKey>,
        field: &str,
        is_blocking: bool,
    ) -> bool {
        self.gate
            .set_field_blocking(&step.into(), field, is_blocking)
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    pub fn try_next(&mut self) -> Result<StepKey, NavigationError> {
        self.navigation.go_next(&mut self.registry, &self.gate)
    }

    pub fn try_previous(&mut self) -> Result<StepKey, NavigationError> {
        self.navigation.go_previous(&mut self.registry)
    }

    pub fn try_go_to(&mut self, key: &str) -> Result<StepKey, NavigationError> {
        self.navigation.go_to(key, &mut self.registry, &self.gate)
    }

    /// Advance one step. Returns false when blocked or already at the end.
    pub fn next(&mut self) -> bool {
        self.try_next().is_ok()
    }

    /// Go back one step. Returns false only at the first step.
    pub fn previous(&mut self) -> bool {
        self.try_previous().is_ok()
    }

    /// Jump to `key`. Returns false when it is hidden, unknown, or blocked.
    pub fn go_to(&mut self, key: &str) -> bool {
        self.try_go_to(key).is_ok()
    }

    // ─── Read side ──────────────────────────────────────────────────────────

    pub fn view_model(&self) -> ViewModel {
        project(&self.registry, &self.gate, &self.navigation)
    }

    pub fn active_key(&self) -> Option<&StepKey> {
        self.navigation.active_key()
    }

    pub fn state(&self) -> &NavState {
        self.navigation.state()
    }

    pub fn config(&self) -> &MultiStepConfig {
        self.navigation.config()
    }

    /// Replace the configuration snapshot (e.g. when container props change)
    pub fn update_config(&mut self, config: MultiStepConfig) {
        tracing::debug!(?config, "multi-step configuration updated");
        self.navigation.set_config(config);
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &ValidationGate {
        &self.gate
    }

    /// Where the active pointer should land if `key` leaves while active
    fn anchor_for(&self, key: &str) -> Option<StepKey> {
        self.registry
            .predecessor(key)
            .map(|step| step.key().clone())
    }
}
