//! Content pipeline: load, optionally render, deliver
//!
//! Drives the source loader and, for Markdown, the render cache, then hands
//! the outcome to the renderer. Every run ends in exactly one
//! `set_content` call: the final HTML, a render fallback message, or the
//! stringified error. Nothing is retried.

use crate::config::{EmbedConfig, Format};
use crate::error::InsetResult;
use crate::render::RenderCache;
use crate::source::SourceLoader;
use crate::store::KeyValueStore;
use crate::transport::Transport;
use std::sync::Arc;
use tracing::debug;

/// Destination for the final content of one embedding
pub trait Renderer {
    /// Receive the HTML (or error text); called exactly once per run
    fn set_content(&mut self, html: &str);
}

/// Orchestrates one embedding end to end
pub struct ContentPipeline {
    loader: SourceLoader,
    render_cache: RenderCache,
}

impl ContentPipeline {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        config: &EmbedConfig,
    ) -> Self {
        Self {
            loader: SourceLoader::new(store.clone(), transport.clone(), &config.prefix),
            render_cache: RenderCache::new(store, transport, &config.prefix),
        }
    }

    /// Override the Markdown rendering endpoint
    pub fn with_render_endpoint(mut self, endpoint: &str) -> Self {
        self.render_cache = self.render_cache.with_endpoint(endpoint);
        self
    }

    /// Run one embedding, delivering the result to `renderer`
    pub async fn run(&self, src: &str, format: Format, renderer: &mut dyn Renderer) {
        let html = match self.resolve(src, format).await {
            Ok(html) => html,
            Err(e) => {
                debug!("Embedding {} failed: {}", src, e);
                e.to_string()
            }
        };
        renderer.set_content(&html);
    }

    async fn resolve(&self, src: &str, format: Format) -> InsetResult<String> {
        let content = self.loader.load(src).await?;
        match format {
            Format::Html => Ok(content.data),
            Format::Markdown => self.render_cache.render(&content, src).await,
        }
    }
}
