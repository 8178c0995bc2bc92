//! multistep - navigation engine for multi-step forms
//!
//! Tracks an ordered set of step panels, keeps exactly one of them active,
//! gates forward navigation on validation state, and stays consistent while
//! steps are conditionally hidden, shown, removed or reordered.

pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod render;
pub mod replay;
pub mod steps;

pub use config::{Config, MultiStepConfig, MultiStepOverrides, TabStyle};
pub use diagnostics::{DiagnosticsSink, MemorySink, NodeKind, StructuralMisuse, TracingSink};
pub use steps::{MultiStep, NavigationError, StepKey, StepView, ViewModel};
