//! Navigation controller: the active-step state machine

use crate::config::MultiStepConfig;

use super::error::NavigationError;
use super::gate::ValidationGate;
use super::registry::StepRegistry;
use super::types::{NavState, StepKey};

/// Owns the active step pointer and the configuration snapshot.
///
/// Only forward motion consults the gate, and only for the step being left.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    state: NavState,
    config: MultiStepConfig,
}

impl NavigationController {
    pub fn new(config: MultiStepConfig) -> Self {
        Self {
            state: NavState::Uninitialized,
            config,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn active_key(&self) -> Option<&StepKey> {
        self.state.active_key()
    }

    pub fn config(&self) -> &MultiStepConfig {
        &self.config
    }

    pub(crate) fn set_config(&mut self, config: MultiStepConfig) {
        self.config = config;
    }

    /// Advance to the next attached step
    pub fn go_next(
        &mut self,
        registry: &mut StepRegistry,
        gate: &ValidationGate,
    ) -> Result<StepKey, NavigationError> {
        let current = self.current()?;
        let next = registry
            .successor(current.as_str())
            .map(|step| step.key().clone())
            .ok_or_else(|| NavigationError::NoSuccessor(current.clone()))?;

        if !gate.can_advance_from(current.as_str(), self.config.allow_incomplete) {
            tracing::debug!(step = %current, "forward navigation blocked");
            return Err(NavigationError::Blocked(current));
        }

        self.activate(next.clone(), registry);
        Ok(next)
    }

    /// Go back to the previous attached step; never gated
    pub fn go_previous(&mut self, registry: &mut StepRegistry) -> Result<StepKey, NavigationError> {
        let current = self.current()?;
        let previous = registry
            .predecessor(current.as_str())
            .map(|step| step.key().clone())
            .ok_or_else(|| NavigationError::NoPredecessor(current.clone()))?;

        self.activate(previous.clone(), registry);
        Ok(previous)
    }

    /// Jump directly to `target`.
    ///
    /// Forward jumps to steps that were never visited are gated on the current
    /// step. Backward jumps and jumps to visited steps are not. A forward jump
    /// marks every attached step it passes over as visited.
    pub fn go_to(
        &mut self,
        target: &str,
        registry: &mut StepRegistry,
        gate: &ValidationGate,
    ) -> Result<StepKey, NavigationError> {
        let current = self.current()?;
        let target_step = registry
            .get(target)
            .filter(|step| step.is_attached())
            .ok_or_else(|| NavigationError::NotAttached(StepKey::from(target)))?;

        if target_step.key() == &current {
            return Ok(current);
        }

        let target_key = target_step.key().clone();
        let forward_span = match (
            registry.get(current.as_str()).and_then(|step| step.ordinal()),
            target_step.ordinal(),
        ) {
            (Some(from), Some(to)) if to > from => Some((from, to)),
            _ => None,
        };

        if forward_span.is_some()
            && !target_step.is_visited()
            && !gate.can_advance_from(current.as_str(), self.config.allow_incomplete)
        {
            tracing::debug!(step = %current, target = %target_key, "jump blocked");
            return Err(NavigationError::Blocked(current));
        }

        // Steps jumped over count as navigated past
        if let Some((from, to)) = forward_span {
            let passed: Vec<StepKey> = registry
                .ordered_attached()
                .filter(|step| step.ordinal().is_some_and(|ordinal| ordinal > from && ordinal < to))
                .map(|step| step.key().clone())
                .collect();
            for key in &passed {
                registry.mark_visited(key.as_str());
            }
        }

        self.activate(target_key.clone(), registry);
        Ok(target_key)
    }

    /// Repair the active pointer after the attached set changed.
    ///
    /// `anchor` is the nearest attached step that preceded the departed step,
    /// captured before the registry was mutated. Returns whether the state
    /// changed.
    pub fn reconcile(&mut self, registry: &mut StepRegistry, anchor: Option<&StepKey>) -> bool {
        if let NavState::Active(key) = &self.state {
            if registry.is_attached(key.as_str()) {
                return false;
            }
        }

        let target = anchor
            .filter(|key| registry.is_attached(key.as_str()))
            .cloned()
            .or_else(|| registry.first_attached().map(|step| step.key().clone()));

        match target {
            Some(key) => {
                if let NavState::Active(previous) = &self.state {
                    tracing::debug!(from = %previous, to = %key, "active step re-targeted");
                }
                self.activate(key, registry);
                true
            }
            None => {
                let changed = self.state != NavState::Uninitialized;
                if changed {
                    tracing::debug!("no attached steps remain");
                }
                self.state = NavState::Uninitialized;
                changed
            }
        }
    }

    fn current(&self) -> Result<StepKey, NavigationError> {
        self.state
            .active_key()
            .cloned()
            .ok_or(NavigationError::Uninitialized)
    }

    fn activate(&mut self, key: StepKey, registry: &mut StepRegistry) {
        registry.mark_visited(key.as_str());
        tracing::debug!(step = %key, "step activated");
        self.state = NavState::Active(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(allow_incomplete: bool) -> (NavigationController, StepRegistry, ValidationGate) {
        let mut registry = StepRegistry::new();
        registry.register("a".into(), 0);
        registry.register("b".into(), 1);
        registry.register("c".into(), 2);
        let mut navigation = NavigationController::new(MultiStepConfig {
            allow_incomplete,
            ..MultiStepConfig::default()
        });
        navigation.reconcile(&mut registry, None);
        (navigation, registry, ValidationGate::new())
    }

    fn active(navigation: &NavigationController) -> Option<&str> {
        navigation.active_key().map(StepKey::as_str)
    }

    #[test]
    fn test_starts_uninitialized() {
        let navigation = NavigationController::new(MultiStepConfig::default());
        assert_eq!(navigation.state(), &NavState::Uninitialized);
    }

    #[test]
    fn test_reconcile_activates_first_attached() {
        let (navigation, registry, _) = setup(false);
        assert_eq!(active(&navigation), Some("a"));
        assert!(registry.get("a").is_some_and(|s| s.is_visited()));
    }

    #[test]
    fn test_go_next_and_previous() {
        let (mut navigation, mut registry, gate) = setup(false);
        assert_eq!(
            navigation.go_next(&mut registry, &gate),
            Ok(StepKey::from("b"))
        );
        assert!(registry.get("b").is_some_and(|s| s.is_visited()));
        assert_eq!(navigation.go_previous(&mut registry), Ok(StepKey::from("a")));
        assert_eq!(
            navigation.go_previous(&mut registry),
            Err(NavigationError::NoPredecessor(StepKey::from("a")))
        );
    }

    #[test]
    fn test_go_next_at_last_step_fails() {
        let (mut navigation, mut registry, gate) = setup(false);
        navigation.go_next(&mut registry, &gate).unwrap();
        navigation.go_next(&mut registry, &gate).unwrap();
        assert_eq!(
            navigation.go_next(&mut registry, &gate),
            Err(NavigationError::NoSuccessor(StepKey::from("c")))
        );
        assert_eq!(active(&navigation), Some("c"));
    }

    #[test]
    fn test_go_next_blocked_by_gate() {
        let (mut navigation, mut registry, mut gate) = setup(false);
        gate.set_blocking(&StepKey::from("a"), true);
        let err = navigation.go_next(&mut registry, &gate).unwrap_err();
        assert!(err.is_blocked());
        assert_eq!(active(&navigation), Some("a"));
        assert!(!registry.get("b").is_some_and(|s| s.is_visited()));
    }

    #[test]
    fn test_go_next_allow_incomplete_ignores_gate() {
        let (mut navigation, mut registry, mut gate) = setup(true);
        gate.set_blocking(&StepKey::from("a"), true);
        assert!(navigation.go_next(&mut registry, &gate).is_ok());
        assert_eq!(active(&navigation), Some("b"));
    }

    #[test]
    fn test_go_previous_is_never_gated() {
        let (mut navigation, mut registry, mut gate) = setup(false);
        navigation.go_next(&mut registry, &gate).unwrap();
        gate.set_blocking(&StepKey::from("b"), true);
        assert!(navigation.go_previous(&mut registry).is_ok());
    }

    #[test]
    fn test_go_to_forward_unvisited_is_gated() {
        let (mut navigation, mut registry, mut gate) = setup(false);
        gate.set_blocking(&StepKey::from("a"), true);
        assert_eq!(
            navigation.go_to("c", &mut registry, &gate),
            Err(NavigationError::Blocked(StepKey::from("a")))
        );
        gate.set_blocking(&StepKey::from("a"), false);
        assert!(navigation.go_to("c", &mut registry, &gate).is_ok());
        assert_eq!(active(&navigation), Some("c"));
    }

    #[test]
    fn test_go_to_visited_step_bypasses_gate() {
        let (mut navigation, mut registry, mut gate) = setup(false);
        navigation.go_next(&mut registry, &gate).unwrap();
        navigation.go_previous(&mut registry).unwrap();
        gate.set_blocking(&StepKey::from("a"), true);
        assert!(navigation.go_to("b", &mut registry, &gate).is_ok());
        assert_eq!(active(&navigation), Some("b"));
    }

    #[test]
    fn test_go_to_forward_marks_skipped_steps_visited() {
        let (mut navigation, mut registry, gate) = setup(false);
        navigation.go_to("c", &mut registry, &gate).unwrap();
        assert!(registry.get("b").is_some_and(|s| s.is_visited()));
        assert!(registry.get("c").is_some_and(|s| s.is_visited()));
    }

    #[test]
    fn test_go_to_blocked_jump_marks_nothing() {
        let (mut navigation, mut registry, mut gate) = setup(false);
        gate.set_blocking(&StepKey::from("a"), true);
        assert!(navigation.go_to("c", &mut registry, &gate).is_err());
        assert!(!registry.get("b").is_some_and(|s| s.is_visited()));
    }

    #[test]
    fn test_go_to_backward_bypasses_gate() {
        let (mut navigation, mut registry, mut gate) = setup(false);
        navigation.go_to("c", &mut registry, &gate).unwrap();
        gate.set_blocking(&StepKey::from("c"), true);
        assert!(navigation.go_to("a", &mut registry, &gate).is_ok());
    }

    #[test]
    fn test_go_to_detached_or_unknown_fails() {
        let (mut navigation, mut registry, gate) = setup(false);
        registry.detach("b");
        assert_eq!(
            navigation.go_to("b", &mut registry, &gate),
            Err(NavigationError::NotAttached(StepKey::from("b")))
        );
        assert_eq!(
            navigation.go_to("nope", &mut registry, &gate),
            Err(NavigationError::NotAttached(StepKey::from("nope")))
        );
        assert_eq!(active(&navigation), Some("a"));
    }

    #[test]
    fn test_go_to_current_is_ok() {
        let (mut navigation, mut registry, gate) = setup(false);
        assert_eq!(
            navigation.go_to("a", &mut registry, &gate),
            Ok(StepKey::from("a"))
        );
    }

    #[test]
    fn test_navigation_when_uninitialized() {
        let mut navigation = NavigationController::new(MultiStepConfig::default());
        let mut registry = StepRegistry::new();
        let gate = ValidationGate::new();
        assert_eq!(
            navigation.go_next(&mut registry, &gate),
            Err(NavigationError::Uninitialized)
        );
        assert_eq!(
            navigation.go_previous(&mut registry),
            Err(NavigationError::Uninitialized)
        );
    }

    #[test]
    fn test_reconcile_prefers_anchor() {
        let (mut navigation, mut registry, gate) = setup(false);
        navigation.go_next(&mut registry, &gate).unwrap();
        navigation.go_next(&mut registry, &gate).unwrap();
        let anchor = registry.predecessor("c").map(|s| s.key().clone());
        registry.detach("c");
        assert!(navigation.reconcile(&mut registry, anchor.as_ref()));
        assert_eq!(active(&navigation), Some("b"));
    }

    #[test]
    fn test_reconcile_falls_back_to_first_attached() {
        let (mut navigation, mut registry, _) = setup(false);
        let anchor = registry.predecessor("a").map(|s| s.key().clone());
        assert!(anchor.is_none());
        registry.detach("a");
        assert!(navigation.reconcile(&mut registry, anchor.as_ref()));
        assert_eq!(active(&navigation), Some("b"));
    }

    #[test]
    fn test_reconcile_without_attached_steps_resets() {
        let (mut navigation, mut registry, _) = setup(false);
        for key in ["a", "b", "c"] {
            registry.detach(key);
        }
        assert!(navigation.reconcile(&mut registry, None));
        assert_eq!(navigation.state(), &NavState::Uninitialized);
        registry.register("b".into(), 1);
        navigation.reconcile(&mut registry, None);
        assert_eq!(active(&navigation), Some("b"));
    }

    #[test]
    fn test_reconcile_noop_when_active_still_attached() {
        let (mut navigation, mut registry, _) = setup(false);
        registry.detach("c");
        assert!(!navigation.reconcile(&mut registry, None));
        assert_eq!(active(&navigation), Some("a"));
    }
}
