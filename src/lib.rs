//! stepdeck - step-by-step wizard presenter for late-loaded HTML step plugins
//!
//! A wizard is an ordered list of steps. Each step is a directory under
//! `steps/` with a `step.json` descriptor naming a Handlebars view plus the
//! stylesheets and scripts it needs. The [`Presenter`] keeps the cursor,
//! resolves resources through a [`StepRepository`] and renders through a
//! [`StepRenderer`].

pub mod config;
pub mod error;
pub mod logging;
pub mod presenter;
pub mod render;
pub mod repository;
pub mod steps;

pub use error::StepError;
pub use presenter::Presenter;
pub use render::{HtmlPageRenderer, RenderOutcome, RenderRequest, StepRenderer};
pub use repository::{FsStepRepository, InMemoryStepRepository, StepRepository};
pub use steps::{StepDescriptor, StepSequencer};
