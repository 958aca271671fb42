//! In-memory page model: named content regions plus late-loaded head resources

use std::collections::BTreeMap;

use handlebars::{html_escape, Handlebars};
use once_cell::sync::Lazy;

use crate::error::StepError;

const LATE_CSS_TEMPLATE: &str =
    r#"<link href="{{ href }}" rel="stylesheet" class="late-css-{{ region }}">"#;
const LATE_JS_TEMPLATE: &str =
    r#"<script src="{{ href }}" type="text/javascript" class="late-js-{{ region }}"></script>"#;

static TAG_TEMPLATES: Lazy<Result<Handlebars<'static>, String>> = Lazy::new(|| {
    let mut hbs = Handlebars::new();
    hbs.register_template_string("late_css", LATE_CSS_TEMPLATE)
        .map_err(|e| e.to_string())?;
    hbs.register_template_string("late_js", LATE_JS_TEMPLATE)
        .map_err(|e| e.to_string())?;
    Ok(hbs)
});

/// Region identifier without the leading `#` selector marker
pub fn region_key(destination: &str) -> &str {
    destination.trim_start_matches('#')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Style,
    Script,
}

/// A `<link>` or `<script>` attached on behalf of one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTag {
    pub kind: ResourceKind,
    pub href: String,
    pub region: String,
    pub html: String,
}

impl ResourceTag {
    pub fn new(kind: ResourceKind, href: &str, destination: &str) -> Result<Self, StepError> {
        let region = region_key(destination).to_string();
        let templates = (*TAG_TEMPLATES).as_ref().map_err(|e| StepError::Render(e.clone()))?;
        let name = match kind {
            ResourceKind::Style => "late_css",
            ResourceKind::Script => "late_js",
        };
        let html = templates.render(
            name,
            &serde_json::json!({ "href": href, "region": region }),
        )?;

        Ok(Self {
            kind,
            href: href.to_string(),
            region,
            html,
        })
    }
}

#[derive(Debug, Clone, Default)]
struct Region {
    html: String,
    hidden: bool,
}

/// Host document the HTML renderer draws into
#[derive(Debug, Clone, Default)]
pub struct Page {
    title: String,
    regions: BTreeMap<String, Region>,
    head: Vec<ResourceTag>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Content of a region, if it has been rendered
    pub fn region_html(&self, destination: &str) -> Option<&str> {
        self.regions
            .get(region_key(destination))
            .map(|region| region.html.as_str())
    }

    pub fn set_region_html(&mut self, destination: &str, html: String) {
        self.region_mut(destination).html = html;
    }

    /// Hide a region while its content is swapped; creates the region if needed
    pub fn hide_region(&mut self, destination: &str) {
        self.region_mut(destination).hidden = true;
    }

    pub fn show_region(&mut self, destination: &str) {
        self.region_mut(destination).hidden = false;
    }

    /// Whether a region is hidden; unknown regions are not
    pub fn is_region_hidden(&self, destination: &str) -> bool {
        self.regions
            .get(region_key(destination))
            .is_some_and(|region| region.hidden)
    }

    fn region_mut(&mut self, destination: &str) -> &mut Region {
        self.regions
            .entry(region_key(destination).to_string())
            .or_default()
    }

    pub fn attach(&mut self, tag: ResourceTag) {
        self.head.push(tag);
    }

    /// Remove every resource attached for a region, returning how many were removed
    pub fn remove_resources(&mut self, destination: &str) -> usize {
        let region = region_key(destination);
        let before = self.head.len();
        self.head.retain(|tag| tag.region != region);
        before - self.head.len()
    }

    pub fn resources(&self) -> &[ResourceTag] {
        &self.head
    }

    pub fn resources_for<'a>(&'a self, destination: &'a str) -> impl Iterator<Item = &'a ResourceTag> {
        let region = region_key(destination);
        self.head.iter().filter(move |tag| tag.region == region)
    }

    /// Serialise the page as a complete HTML document
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str(&format!("<title>{}</title>\n", html_escape(&self.title)));
        for tag in &self.head {
            out.push_str(&tag.html);
            out.push('\n');
        }
        out.push_str("</head>\n<body>\n");
        for (id, region) in &self.regions {
            let hidden = if region.hidden { " hidden" } else { "" };
            out.push_str(&format!(
                "<div id=\"{}\"{}>\n{}\n</div>\n",
                html_escape(id),
                hidden,
                region.html
            ));
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}
