//! Step registry: membership, declaration order and dense ordinals

use indexmap::IndexMap;

use super::types::{RegisterOutcome, Step, StepKey};

/// Ordered collection of step records.
///
/// The map is kept sorted by `(declared_index, sequence)`. Detached steps keep
/// their slot so that re-attaching restores their relative position.
#[derive(Debug, Default, Clone)]
pub struct StepRegistry {
    steps: IndexMap<StepKey, Step>,
    next_sequence: u64,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new step or re-attach a hidden one at `declared_index`.
    ///
    /// No-op when the key is already attached.
    pub fn register(&mut self, key: StepKey, declared_index: usize) -> RegisterOutcome {
        match self.steps.get(&key).map(Step::is_attached) {
            Some(true) => RegisterOutcome::AlreadyAttached,
            Some(false) => {
                if let Some(mut step) = self.steps.shift_remove(&key) {
                    step.attached = true;
                    step.declared_index = declared_index;
                    self.place(step);
                }
                self.reflow();
                RegisterOutcome::Reattached
            }
            None => {
                let step = Step::new(key, declared_index, self.next_sequence);
                self.next_sequence += 1;
                self.place(step);
                self.reflow();
                RegisterOutcome::Inserted
            }
        }
    }

    /// Hide a step without forgetting it. Returns false if it was not attached.
    pub fn detach(&mut self, key: &str) -> bool {
        match self.steps.get_mut(key) {
            Some(step) if step.attached => {
                step.attached = false;
                self.reflow();
                true
            }
            _ => false,
        }
    }

    /// Permanently delete a step record
    pub fn remove(&mut self, key: &str) -> Option<Step> {
        let removed = self.steps.shift_remove(key);
        if removed.is_some() {
            self.reflow();
        }
        removed
    }

    /// Move a step (attached or hidden) to a new declared position
    pub fn relocate(&mut self, key: &str, declared_index: usize) -> bool {
        match self.steps.get(key) {
            Some(step) if step.declared_index != declared_index => {}
            _ => return false,
        }
        if let Some(mut step) = self.steps.shift_remove(key) {
            step.declared_index = declared_index;
            self.place(step);
            self.reflow();
        }
        true
    }

    /// Attached steps in ordinal order. Cheap to clone and restart.
    pub fn ordered_attached(&self) -> impl Iterator<Item = &Step> + Clone + '_ {
        self.steps.values().filter(|step| step.attached)
    }

    /// All records, hidden ones included, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Step> + '_ {
        self.steps.values()
    }

    pub fn get(&self, key: &str) -> Option<&Step> {
        self.steps.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.steps.contains_key(key)
    }

    pub fn is_attached(&self, key: &str) -> bool {
        self.steps.get(key).is_some_and(Step::is_attached)
    }

    pub fn first_attached(&self) -> Option<&Step> {
        self.ordered_attached().next()
    }

    pub fn attached_len(&self) -> usize {
        self.ordered_attached().count()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Nearest attached step after `key` in declaration order
    pub fn successor(&self, key: &str) -> Option<&Step> {
        let position = self.steps.get_index_of(key)?;
        self.steps
            .values()
            .skip(position + 1)
            .find(|step| step.attached)
    }

    /// Nearest attached step before `key` in declaration order.
    ///
    /// Works for hidden keys too, which is what reconciliation relies on.
    pub fn predecessor(&self, key: &str) -> Option<&Step> {
        let position = self.steps.get_index_of(key)?;
        self.steps
            .values()
            .take(position)
            .rev()
            .find(|step| step.attached)
    }

    pub fn set_label(&mut self, key: &str, label: impl Into<String>) -> bool {
        match self.steps.get_mut(key) {
            Some(step) => {
                step.label = label.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn mark_visited(&mut self, key: &str) {
        if let Some(step) = self.steps.get_mut(key) {
            step.visited = true;
        }
    }

    fn place(&mut self, step: Step) {
        let order = step.order_key();
        let position = self
            .steps
            .values()
            .position(|existing| existing.order_key() > order)
            .unwrap_or(self.steps.len());
        self.steps.shift_insert(position, step.key.clone(), step);
    }

    fn reflow(&mut self) {
        let mut ordinal = 0;
        for step in self.steps.values_mut() {
            if step.attached {
                step.ordinal = Some(ordinal);
                ordinal += 1;
            } else {
                step.ordinal = None;
            }
        }
        tracing::trace!(
            attached = ordinal,
            total = self.steps.len(),
            "reflowed step ordinals"
        );
    }
}
