//! In-memory step repository

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{split_resource_name, StepRepository};
use crate::error::StepError;
use crate::steps::StepDescriptor;

/// HashMap-backed repository; records every call for assertions
#[derive(Debug, Default, Clone)]
pub struct InMemoryStepRepository {
    manifest: Vec<String>,
    descriptors: HashMap<String, Option<StepDescriptor>>,
    resources: HashSet<(String, String)>,
    manifest_error: Option<String>,
    /// Record of repository calls, e.g. `list_step_names` or `get_step_descriptor:intro`
    pub call_log: Arc<Mutex<Vec<String>>>,
}

impl InMemoryStepRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step to the manifest and make its own resources resolvable
    pub fn with_step(mut self, descriptor: StepDescriptor) -> Self {
        let resources: Vec<(String, String)> = descriptor
            .resources()
            .map(|entry| {
                let (step, resource) = split_resource_name(&descriptor.name, entry);
                (step.to_string(), resource.to_string())
            })
            .collect();
        self.resources.extend(resources);
        self.manifest.push(descriptor.name.clone());
        self.descriptors
            .insert(descriptor.name.clone(), Some(descriptor));
        self
    }

    /// Append a step whose descriptor is present but empty
    pub fn with_missing_descriptor(mut self, name: &str) -> Self {
        self.manifest.push(name.to_string());
        self.descriptors.insert(name.to_string(), None);
        self
    }

    /// Replace the manifest order
    pub fn with_manifest(mut self, names: Vec<String>) -> Self {
        self.manifest = names;
        self
    }

    /// Make `list_step_names` fail with a parse error
    pub fn with_malformed_manifest(mut self, message: &str) -> Self {
        self.manifest_error = Some(message.to_string());
        self
    }

    pub fn with_resource(mut self, step: &str, resource: &str) -> Self {
        self.resources
            .insert((step.to_string(), resource.to_string()));
        self
    }

    pub fn without_resource(mut self, step: &str, resource: &str) -> Self {
        self.resources
            .remove(&(step.to_string(), resource.to_string()));
        self
    }

    /// Get the call log
    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of times the manifest was loaded
    pub fn manifest_loads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.as_str() == "list_step_names")
            .count()
    }

    fn log_call(&self, call: String) {
        self.call_log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StepRepository for InMemoryStepRepository {
    async fn list_step_names(&self) -> Result<Vec<String>, StepError> {
        self.log_call("list_step_names".to_string());
        if let Some(ref message) = self.manifest_error {
            return Err(StepError::ParseError(message.clone()));
        }
        Ok(self.manifest.clone())
    }

    async fn get_step_descriptor(&self, name: &str) -> Result<Option<StepDescriptor>, StepError> {
        self.log_call(format!("get_step_descriptor:{}", name));
        self.descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| StepError::NotFound(format!("no step info for '{}'", name)))
    }

    fn resolve_resource_uri(&self, step_name: &str, resource_name: &str) -> Option<String> {
        self.resources
            .contains(&(step_name.to_string(), resource_name.to_string()))
            .then(|| format!("mem://{}/{}", step_name, resource_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_step_builds_manifest_in_order() {
        let repo = InMemoryStepRepository::new()
            .with_step(StepDescriptor::new("intro", "intro.html"))
            .with_step(StepDescriptor::new("finish", "finish.html"));

        assert_eq!(repo.list_step_names().await.unwrap(), vec!["intro", "finish"]);
        assert_eq!(repo.manifest_loads(), 1);
    }

    #[test]
    fn test_step_resources_resolve() {
        let repo = InMemoryStepRepository::new().with_step(
            StepDescriptor::new("intro", "intro.html")
                .with_style("intro.css")
                .with_script("shared/forms.js"),
        );

        assert_eq!(
            repo.resolve_resource_uri("intro", "intro.css").as_deref(),
            Some("mem://intro/intro.css")
        );
        assert!(repo.resolve_resource_uri("shared", "forms.js").is_some());
        assert!(repo.resolve_resource_uri("intro", "forms.js").is_none());
    }

    #[test]
    fn test_without_resource() {
        let repo = InMemoryStepRepository::new()
            .with_step(StepDescriptor::new("intro", "intro.html"))
            .without_resource("intro", "intro.html");
        assert!(repo.resolve_resource_uri("intro", "intro.html").is_none());
    }

    #[tokio::test]
    async fn test_malformed_manifest() {
        let repo = InMemoryStepRepository::new().with_malformed_manifest("expected array");
        let err = repo.list_step_names().await.unwrap_err();
        assert!(matches!(err, StepError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_unknown_descriptor_is_not_found() {
        let repo = InMemoryStepRepository::new();
        let err = repo.get_step_descriptor("intro").await.unwrap_err();
        assert!(matches!(err, StepError::NotFound(_)));
        assert_eq!(repo.calls(), vec!["get_step_descriptor:intro"]);
    }
}
