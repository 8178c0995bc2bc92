//! Plain-text renderer for the step view model
//!
//! A reference consumer of [`ViewModel`]: draws a tab row or progress bar and
//! the previous/next buttons, the way a host UI would from the same data.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::{json, Value};

use crate::config::TabStyle;
use crate::steps::{StepView, ViewModel};

const TABS_TEMPLATE: &str =
    "{{#each steps}}[{{marker}}{{label}}{{flag}}]{{#unless @last}} {{/unless}}{{/each}}";

const PROGRESS_TEMPLATE: &str = "{{#each steps}}({{marker}}){{#if label}} {{label}}{{/if}}{{#unless @last}} -- {{/unless}}{{/each}}";

const BUTTONS_TEMPLATE: &str =
    "{{#if previous}}< Previous{{/if}}{{#if both}}   {{/if}}{{#if next}}Next >{{/if}}";

/// Handlebars-based text renderer
pub struct TextRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // Plain text output, nothing to escape
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }

    /// Render the tab row (or progress bar) followed by a buttons line
    pub fn render(&self, view: &ViewModel) -> Result<String> {
        if view.steps.is_empty() {
            return Ok("(no steps)".to_string());
        }

        let (template, context) = match view.config.tab_style {
            TabStyle::Tab => (TABS_TEMPLATE, tabs_context(view)),
            TabStyle::Progress => (PROGRESS_TEMPLATE, progress_context(view)),
        };

        let bar = self
            .handlebars
            .render_template(template, &context)
            .context("Failed to render step bar")?;
        let buttons = self
            .handlebars
            .render_template(
                BUTTONS_TEMPLATE,
                &json!({
                    "previous": view.has_previous,
                    "next": view.has_next,
                    "both": view.has_previous && view.has_next,
                }),
            )
            .context("Failed to render navigation buttons")?;

        if buttons.is_empty() {
            Ok(bar)
        } else {
            Ok(format!("{bar}\n{buttons}"))
        }
    }
}

fn tabs_context(view: &ViewModel) -> Value {
    let steps: Vec<Value> = view
        .steps
        .iter()
        .map(|step| {
            json!({
                "marker": if step.is_active { "*" } else if step.is_complete { "+" } else { "" },
                "label": step.label,
                "flag": if step.is_blocked { " !" } else { "" },
            })
        })
        .collect();
    json!({ "steps": steps })
}

fn progress_context(view: &ViewModel) -> Value {
    let steps: Vec<Value> = view
        .steps
        .iter()
        .map(|step| {
            json!({
                "marker": progress_marker(step),
                "label": if view.show_labels { step.label.as_str() } else { "" },
            })
        })
        .collect();
    json!({ "steps": steps })
}

fn progress_marker(step: &StepView) -> &'static str {
    if step.is_active {
        "*"
    } else if step.is_blocked {
        "!"
    } else if step.is_complete {
        "x"
    } else {
        " "
    }
}
