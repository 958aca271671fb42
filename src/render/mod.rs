//! Step renderers: turn a resolved step into page content
//!
//! [`HtmlPageRenderer`] renders Handlebars views into regions of an in-memory
//! [`Page`]. [`RecordingRenderer`] captures requests without rendering.

mod html;
pub mod page;
pub mod template;

pub use html::HtmlPageRenderer;
pub use page::{Page, ResourceKind, ResourceTag};
pub use template::TemplateEngine;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::StepError;

/// Everything a renderer needs to show one step
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Resolved location of the view template
    pub view_uri: String,
    /// Data the view is rendered with
    pub context: serde_json::Value,
    /// Region whose content is replaced, e.g. `#content-holder`
    pub destination: String,
    /// Resolved stylesheet locations
    pub style_uris: Vec<String>,
    /// Resolved script locations
    pub script_uris: Vec<String>,
}

/// Summary of a completed render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    pub destination: String,
    /// Resources previously attached for the region and now removed
    pub removed_resources: usize,
    /// Resources attached for the new content
    pub attached_resources: usize,
}

/// Renders step views into a destination region
#[async_trait]
pub trait StepRenderer: Send + Sync {
    /// Replace the destination's content and swap its tagged resources
    async fn render(&self, request: RenderRequest) -> Result<RenderOutcome, StepError>;
}

/// Renderer that records requests instead of rendering them
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    /// Requests received, oldest first
    pub requests: Arc<Mutex<Vec<RenderRequest>>>,
    /// When set, every render fails with `StepError::Render(message)`
    pub fail_with: Option<String>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer whose renders always fail
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Get the recorded requests
    pub fn recorded(&self) -> Vec<RenderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<RenderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl StepRenderer for RecordingRenderer {
    async fn render(&self, request: RenderRequest) -> Result<RenderOutcome, StepError> {
        if let Some(ref message) = self.fail_with {
            return Err(StepError::Render(message.clone()));
        }

        let outcome = RenderOutcome {
            destination: request.destination.clone(),
            removed_resources: 0,
            attached_resources: request.style_uris.len() + request.script_uris.len(),
        };
        self.requests.lock().unwrap().push(request);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> RenderRequest {
        RenderRequest {
            view_uri: "mem://intro/intro.html".to_string(),
            context: serde_json::json!({"user": "sam"}),
            destination: "#content-holder".to_string(),
            style_uris: vec!["mem://intro/intro.css".to_string()],
            script_uris: vec![],
        }
    }

    #[tokio::test]
    async fn test_recording_renderer_records() {
        let renderer = RecordingRenderer::new();
        let outcome = renderer.render(make_request()).await.unwrap();

        assert_eq!(outcome.attached_resources, 1);
        assert_eq!(renderer.recorded().len(), 1);
        assert_eq!(renderer.last().unwrap().context["user"], "sam");
    }

    #[tokio::test]
    async fn test_failing_renderer() {
        let renderer = RecordingRenderer::failing("view exploded");
        let err = renderer.render(make_request()).await.unwrap_err();
        assert!(matches!(err, StepError::Render(ref m) if m == "view exploded"));
        assert!(renderer.recorded().is_empty());
    }
}
