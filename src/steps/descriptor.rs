//! Typed step descriptor loaded from `step.json`

use serde::{Deserialize, Serialize};

use crate::error::StepError;

/// Renderable resources of a single wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDescriptor {
    /// Step name (matches the entry in the step manifest)
    pub name: String,
    /// Handlebars view rendered into the destination region
    pub view: String,
    /// Stylesheets attached while this step is shown
    pub styles: Vec<String>,
    /// Scripts attached while this step is shown
    pub scripts: Vec<String>,
}

impl StepDescriptor {
    pub fn new(name: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            view: view.into(),
            styles: Vec::new(),
            scripts: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.styles.push(style.into());
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.scripts.push(script.into());
        self
    }

    /// Parse a descriptor; a JSON `null` document is a missing descriptor
    pub fn from_json(json: &str) -> Result<Option<Self>, StepError> {
        serde_json::from_str::<Option<Self>>(json).map_err(|e| StepError::ParseError(e.to_string()))
    }

    /// All resource entries in render order: view, styles, scripts
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.view.as_str())
            .chain(self.styles.iter().map(String::as_str))
            .chain(self.scripts.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let json = r#"{
            "name": "select_data",
            "view": "select_data.html",
            "styles": ["select_data.css"],
            "scripts": ["select_data.js", "shared/forms.js"]
        }"#;

        let descriptor = StepDescriptor::from_json(json).unwrap().unwrap();
        assert_eq!(descriptor.name, "select_data");
        assert_eq!(descriptor.view, "select_data.html");
        assert_eq!(descriptor.styles, vec!["select_data.css"]);
        assert_eq!(descriptor.scripts.len(), 2);
    }

    #[test]
    fn test_styles_and_scripts_are_required() {
        let json = r#"{"name": "intro", "view": "intro.html"}"#;
        let err = StepDescriptor::from_json(json).unwrap_err();
        assert!(matches!(err, StepError::ParseError(_)));

        let json = r#"{"name": "intro", "view": "intro.html", "styles": []}"#;
        let err = StepDescriptor::from_json(json).unwrap_err();
        assert!(matches!(err, StepError::ParseError(_)));
    }

    #[test]
    fn test_empty_styles_and_scripts() {
        let json = r#"{"name": "intro", "view": "intro.html", "styles": [], "scripts": []}"#;
        let descriptor = StepDescriptor::from_json(json).unwrap().unwrap();
        assert!(descriptor.styles.is_empty());
        assert!(descriptor.scripts.is_empty());
    }

    #[test]
    fn test_null_is_missing_descriptor() {
        assert_eq!(StepDescriptor::from_json("null").unwrap(), None);
    }

    #[test]
    fn test_missing_view_is_parse_error() {
        let err = StepDescriptor::from_json(r#"{"name": "intro"}"#).unwrap_err();
        assert!(matches!(err, StepError::ParseError(_)));
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let json = r#"{
            "name": "intro",
            "view": "intro.html",
            "styles": [],
            "scripts": [],
            "layout": "wide"
        }"#;
        let err = StepDescriptor::from_json(json).unwrap_err();
        assert!(matches!(err, StepError::ParseError(_)));
    }

    #[test]
    fn test_resources_order() {
        let descriptor = StepDescriptor::new("intro", "intro.html")
            .with_style("intro.css")
            .with_script("intro.js");
        let resources: Vec<&str> = descriptor.resources().collect();
        assert_eq!(resources, vec!["intro.html", "intro.css", "intro.js"]);
    }
}
