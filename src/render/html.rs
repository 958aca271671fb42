use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::page::{Page, ResourceKind, ResourceTag};
use super::template::TemplateEngine;
use super::{RenderOutcome, RenderRequest, StepRenderer};
use crate::error::StepError;

/// Renders step views from disk into a shared [`Page`]
#[derive(Debug, Clone)]
pub struct HtmlPageRenderer {
    engine: TemplateEngine,
    page: Arc<Mutex<Page>>,
}

impl HtmlPageRenderer {
    pub fn new(page: Page) -> Self {
        Self {
            engine: TemplateEngine::new(),
            page: Arc::new(Mutex::new(page)),
        }
    }

    pub fn with_engine(mut self, engine: TemplateEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Shared handle to the page being rendered into
    pub fn page(&self) -> Arc<Mutex<Page>> {
        Arc::clone(&self.page)
    }

    /// Current page serialised as HTML
    pub async fn page_html(&self) -> String {
        self.page.lock().await.to_html()
    }
}

fn view_path(view_uri: &str) -> PathBuf {
    PathBuf::from(view_uri.strip_prefix("file://").unwrap_or(view_uri))
}

#[async_trait]
impl StepRenderer for HtmlPageRenderer {
    async fn render(&self, request: RenderRequest) -> Result<RenderOutcome, StepError> {
        let html = self
            .engine
            .render_file(&view_path(&request.view_uri), &request.context)
            .await?;

        let mut tags = Vec::with_capacity(request.style_uris.len() + request.script_uris.len());
        for href in &request.style_uris {
            tags.push(ResourceTag::new(ResourceKind::Style, href, &request.destination)?);
        }
        for href in &request.script_uris {
            tags.push(ResourceTag::new(ResourceKind::Script, href, &request.destination)?);
        }
        let attached_resources = tags.len();

        let mut page = self.page.lock().await;
        let removed_resources = page.remove_resources(&request.destination);
        page.hide_region(&request.destination);
        page.set_region_html(&request.destination, html);
        for tag in tags {
            page.attach(tag);
        }
        page.show_region(&request.destination);
        drop(page);

        info!(
            destination = %request.destination,
            view = %request.view_uri,
            removed = removed_resources,
            attached = attached_resources,
            "rendered step view"
        );

        Ok(RenderOutcome {
            destination: request.destination,
            removed_resources,
            attached_resources,
        })
    }
}
