//! Presenter: moves the user between wizard steps and renders them
//!
//! The presenter owns the one [`StepSequencer`] for a wizard session. It is
//! created lazily from the repository's manifest on first use; concurrent first
//! callers share a single load.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::error::StepError;
use crate::render::{RenderOutcome, RenderRequest, StepRenderer};
use crate::repository::{split_resource_name, StepRepository};
use crate::steps::{StepDescriptor, StepSequencer};

/// Default region step views are rendered into
pub const STEP_HOLDER: &str = "#content-holder";

/// Wires the sequencer, repository and renderer together
pub struct Presenter {
    repository: Arc<dyn StepRepository>,
    renderer: Arc<dyn StepRenderer>,
    destination: String,
    sequencer: OnceCell<Mutex<StepSequencer>>,
}

impl Presenter {
    pub fn new(repository: Arc<dyn StepRepository>, renderer: Arc<dyn StepRenderer>) -> Self {
        Self {
            repository,
            renderer,
            destination: STEP_HOLDER.to_string(),
            sequencer: OnceCell::new(),
        }
    }

    /// Render into a different region
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Use a known step list instead of loading the manifest
    pub fn with_steps(mut self, steps: Vec<String>) -> Result<Self, StepError> {
        let sequencer = StepSequencer::new(steps)?;
        self.sequencer = OnceCell::new_with(Some(Mutex::new(sequencer)));
        Ok(self)
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Whether the sequencer has been created yet
    pub fn is_loaded(&self) -> bool {
        self.sequencer.initialized()
    }

    /// Get the sequencer, loading the step manifest on first use
    ///
    /// A failed load leaves the presenter unloaded so a later call retries.
    pub async fn sequencer(&self) -> Result<&Mutex<StepSequencer>, StepError> {
        self.sequencer
            .get_or_try_init(|| async {
                let names = self.repository.list_step_names().await?;
                info!(count = names.len(), "loaded step manifest");
                Ok::<_, StepError>(Mutex::new(StepSequencer::new(names)?))
            })
            .await
    }

    pub async fn current_step_name(&self) -> Result<String, StepError> {
        let sequencer = self.sequencer().await?.lock().await;
        Ok(sequencer.current_step_name().to_string())
    }

    /// Descriptor of the current step without rendering it
    pub async fn current_step_descriptor(&self) -> Result<Option<StepDescriptor>, StepError> {
        let sequencer = self.sequencer().await?.lock().await;
        sequencer
            .current_step_descriptor(self.repository.as_ref())
            .await
    }

    /// Current step name with progress markers, e.g. `intro > [select_data] > finish`
    pub async fn format_progress(&self) -> Result<String, StepError> {
        let sequencer = self.sequencer().await?.lock().await;
        Ok(sequencer.format_progress())
    }

    /// Advance to the next step and render it
    ///
    /// Fails with `NoMoreSteps` on the final step, leaving the cursor in place.
    pub async fn render_next(&self, context: &serde_json::Value) -> Result<RenderOutcome, StepError> {
        let name = {
            let mut sequencer = self.sequencer().await?.lock().await;
            if sequencer.is_at_end() {
                return Err(StepError::NoMoreSteps);
            }
            sequencer.advance()?;
            sequencer.current_step_name().to_string()
        };
        self.render_by_name(&name, context).await
    }

    /// Go back one step and render it
    pub async fn render_previous(
        &self,
        context: &serde_json::Value,
    ) -> Result<RenderOutcome, StepError> {
        let name = {
            let mut sequencer = self.sequencer().await?.lock().await;
            sequencer.retreat()?;
            sequencer.current_step_name().to_string()
        };
        self.render_by_name(&name, context).await
    }

    /// Render the current step without moving
    pub async fn render_current(
        &self,
        context: &serde_json::Value,
    ) -> Result<RenderOutcome, StepError> {
        let name = self.current_step_name().await?;
        self.render_by_name(&name, context).await
    }

    /// Jump to a named step and render it
    pub async fn render_named(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> Result<RenderOutcome, StepError> {
        {
            let mut sequencer = self.sequencer().await?.lock().await;
            sequencer.seek_by_name(name)?;
        }
        self.render_by_name(name, context).await
    }

    /// Resolve a descriptor's resources and hand them to the renderer
    ///
    /// Nothing is rendered if any view, style or script entry fails to resolve.
    pub async fn render_step(
        &self,
        descriptor: &StepDescriptor,
        context: &serde_json::Value,
    ) -> Result<RenderOutcome, StepError> {
        let view_uri = self.resolve(descriptor, &descriptor.view)?;
        let style_uris = descriptor
            .styles
            .iter()
            .map(|entry| self.resolve(descriptor, entry))
            .collect::<Result<Vec<_>, _>>()?;
        let script_uris = descriptor
            .scripts
            .iter()
            .map(|entry| self.resolve(descriptor, entry))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(step = %descriptor.name, view = %view_uri, "rendering step");
        self.renderer
            .render(RenderRequest {
                view_uri,
                context: context.clone(),
                destination: self.destination.clone(),
                style_uris,
                script_uris,
            })
            .await
    }

    async fn render_by_name(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> Result<RenderOutcome, StepError> {
        let descriptor = self
            .repository
            .get_step_descriptor(name)
            .await?
            .ok_or_else(|| {
                StepError::NotFound(format!("could not retrieve step information for '{}'", name))
            })?;
        self.render_step(&descriptor, context).await
    }

    fn resolve(&self, descriptor: &StepDescriptor, entry: &str) -> Result<String, StepError> {
        let (step, resource) = split_resource_name(&descriptor.name, entry);
        self.repository
            .resolve_resource_uri(step, resource)
            .ok_or_else(|| {
                warn!(step = %descriptor.name, resource = entry, "could not resolve resource");
                StepError::ResourceNotFound(entry.to_string())
            })
    }
}
