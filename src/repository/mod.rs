//! Step repositories: where step manifests, descriptors and resources come from
//!
//! The presenter only talks to the [`StepRepository`] trait. Two implementations
//! ship with the crate:
//! - [`FsStepRepository`] reads the plugin-style `steps/` directory
//! - [`InMemoryStepRepository`] keeps everything in memory for tests and embedding

mod fs;
mod memory;

pub use fs::{discover_install_root, read_json, FsStepRepository};
pub use memory::InMemoryStepRepository;

use async_trait::async_trait;

use crate::error::StepError;
use crate::steps::StepDescriptor;

/// Read-only source of step metadata and resource locations
#[async_trait]
pub trait StepRepository: Send + Sync {
    /// Ordered names of the installed steps
    async fn list_step_names(&self) -> Result<Vec<String>, StepError>;

    /// Descriptor for a single step; `Ok(None)` when the descriptor is present but empty
    async fn get_step_descriptor(&self, name: &str) -> Result<Option<StepDescriptor>, StepError>;

    /// Fully qualified location of a step resource, or `None` if it cannot be resolved
    fn resolve_resource_uri(&self, step_name: &str, resource_name: &str) -> Option<String>;
}

/// Split a descriptor entry into the owning step and the resource name
///
/// `"other_step/widget.css"` refers to another step's directory; a bare
/// `"widget.css"` belongs to `current_step`.
pub fn split_resource_name<'a>(current_step: &'a str, entry: &'a str) -> (&'a str, &'a str) {
    match entry.split_once('/') {
        Some((step, resource)) if !step.is_empty() => (step, resource),
        _ => (current_step, entry),
    }
}

/// True if `segment` is a plain relative path that cannot escape its directory
pub(crate) fn is_safe_relative(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('/')
        && !segment.starts_with('\\')
        && segment
            .split(['/', '\\'])
            .all(|part| !part.is_empty() && part != ".." && part != ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_resource_name_bare() {
        assert_eq!(
            split_resource_name("select_data", "select_data.css"),
            ("select_data", "select_data.css")
        );
    }

    #[test]
    fn test_split_resource_name_qualified() {
        assert_eq!(
            split_resource_name("select_data", "shared/forms.js"),
            ("shared", "forms.js")
        );
    }

    #[test]
    fn test_split_resource_name_leading_slash_stays_bare() {
        assert_eq!(split_resource_name("intro", "/etc"), ("intro", "/etc"));
    }

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative("intro.html"));
        assert!(is_safe_relative("img/logo.png"));
        assert!(!is_safe_relative(""));
        assert!(!is_safe_relative("../secrets.json"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative("a//b"));
    }
}
