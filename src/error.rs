//! Error types shared by the sequencer, repositories, renderers and presenter

use thiserror::Error;

/// Errors that can occur while navigating, loading or rendering steps
#[derive(Error, Debug)]
pub enum StepError {
    /// Manifest, descriptor or template file is missing
    #[error("not found: {0}")]
    NotFound(String),

    /// Manifest or descriptor JSON is malformed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Navigation would move the cursor outside the step list
    #[error("step index {index} is out of range for {len} steps")]
    OutOfRange { index: i64, len: usize },

    /// Named step is not part of the step list
    #[error("unknown step '{0}'")]
    UnknownStep(String),

    /// Advance requested while already on the final step
    #[error("no more steps remaining")]
    NoMoreSteps,

    /// A view, style or script entry could not be resolved to a location
    #[error("could not find resource '{0}'")]
    ResourceNotFound(String),

    /// The step manifest lists no steps
    #[error("step manifest is empty")]
    EmptyManifest,

    /// Template rendering failed
    #[error("render failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StepError {
    /// Check if this error was raised by cursor navigation
    pub fn is_navigation_error(&self) -> bool {
        matches!(
            self,
            StepError::OutOfRange { .. } | StepError::UnknownStep(_) | StepError::NoMoreSteps
        )
    }

    /// Create an out of range error for a signed index
    pub fn out_of_range(index: i64, len: usize) -> Self {
        StepError::OutOfRange { index, len }
    }
}

impl From<handlebars::RenderError> for StepError {
    fn from(err: handlebars::RenderError) -> Self {
        StepError::Render(err.to_string())
    }
}
