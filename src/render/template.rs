//! Handlebars rendering of step views

use std::path::Path;

use handlebars::Handlebars;
use tracing::debug;

use crate::error::StepError;

/// Renders Handlebars templates from strings or files
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    strict: bool,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// In strict mode a missing context key is a render error instead of ""
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn render_str(
        &self,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<String, StepError> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(self.strict);
        Ok(hbs.render_template(template, context)?)
    }

    /// Read a template from disk and render it
    pub async fn render_file(
        &self,
        location: &Path,
        context: &serde_json::Value,
    ) -> Result<String, StepError> {
        let template = match tokio::fs::read_to_string(location).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StepError::NotFound(format!(
                    "template {} could not be found",
                    location.display()
                )));
            }
            Err(e) => return Err(StepError::Io(e)),
        };

        debug!(template = %location.display(), "rendering template");
        self.render_str(&template, context)
    }
}
