//! Filesystem step repository
//!
//! Layout under the install root:
//! ```text
//! steps/
//!   steps.json            ordered list of step names
//!   intro/
//!     step.json           step descriptor
//!     intro.html
//!     intro.css
//! ```

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{is_safe_relative, StepRepository};
use crate::error::StepError;
use crate::steps::StepDescriptor;

pub const DEFAULT_STEPS_DIR: &str = "steps";
pub const DEFAULT_MANIFEST_FILE: &str = "steps.json";
pub const DEFAULT_DESCRIPTOR_FILE: &str = "step.json";

/// Reads step metadata from a directory outside the application bundle
#[derive(Debug, Clone)]
pub struct FsStepRepository {
    steps_root: PathBuf,
    manifest_file: String,
    descriptor_file: String,
}

impl FsStepRepository {
    /// Create a repository reading `<install_root>/steps`
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self::with_steps_root(install_root.into().join(DEFAULT_STEPS_DIR))
    }

    /// Create a repository reading step directories directly under `steps_root`
    pub fn with_steps_root(steps_root: impl Into<PathBuf>) -> Self {
        Self {
            steps_root: steps_root.into(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_string(),
        }
    }

    pub fn with_manifest_file(mut self, file: impl Into<String>) -> Self {
        self.manifest_file = file.into();
        self
    }

    pub fn with_descriptor_file(mut self, file: impl Into<String>) -> Self {
        self.descriptor_file = file.into();
        self
    }

    pub fn steps_root(&self) -> &Path {
        &self.steps_root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.steps_root.join(&self.manifest_file)
    }

    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.steps_root.join(name).join(&self.descriptor_file)
    }
}

#[async_trait]
impl StepRepository for FsStepRepository {
    async fn list_step_names(&self) -> Result<Vec<String>, StepError> {
        let path = self.manifest_path();
        let names: Vec<String> = read_json(&path).await?;
        debug!(path = %path.display(), count = names.len(), "loaded step manifest");
        Ok(names)
    }

    async fn get_step_descriptor(&self, name: &str) -> Result<Option<StepDescriptor>, StepError> {
        if !is_safe_relative(name) || name.contains(['/', '\\']) {
            return Err(StepError::NotFound(format!("invalid step name '{}'", name)));
        }

        let path = self.descriptor_path(name);
        let contents = read_to_string(&path, "step info").await?;
        let descriptor = StepDescriptor::from_json(&contents)
            .map_err(|e| StepError::ParseError(format!("{}: {}", path.display(), e)))?;

        if let Some(ref d) = descriptor {
            if d.name != name {
                return Err(StepError::ParseError(format!(
                    "{}: descriptor names step '{}', expected '{}'",
                    path.display(),
                    d.name,
                    name
                )));
            }
        }

        debug!(step = name, present = descriptor.is_some(), "loaded step descriptor");
        Ok(descriptor)
    }

    fn resolve_resource_uri(&self, step_name: &str, resource_name: &str) -> Option<String> {
        if !is_safe_relative(step_name) || !is_safe_relative(resource_name) {
            debug!(step = step_name, resource = resource_name, "rejected resource path");
            return None;
        }

        let path = self.steps_root.join(step_name).join(resource_name);
        if !path.is_file() {
            debug!(path = %path.display(), "resource does not exist");
            return None;
        }

        Some(
            path.canonicalize()
                .unwrap_or(path)
                .to_string_lossy()
                .to_string(),
        )
    }
}

/// Load and decode a JSON file
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StepError> {
    let contents = read_to_string(path, "JSON").await?;
    serde_json::from_str(&contents)
        .map_err(|e| StepError::ParseError(format!("{}: {}", path.display(), e)))
}

async fn read_to_string(path: &Path, what: &str) -> Result<String, StepError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StepError::NotFound(format!(
            "could not find {} at {}",
            what,
            path.display()
        ))),
        Err(e) => Err(StepError::Io(e)),
    }
}

/// Directory that holds late-loaded steps for an executable in `exe_dir`
///
/// Inside a macOS bundle (`/Applications/Wizard.app/Contents/MacOS`) the root
/// is the directory containing the bundle. Elsewhere it is `exe_dir` itself.
pub fn discover_install_root(exe_dir: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    for component in exe_dir.components() {
        if let Component::Normal(part) = component {
            if part.to_string_lossy().contains(".app") {
                return root;
            }
        }
        root.push(component.as_os_str());
    }
    root
}
