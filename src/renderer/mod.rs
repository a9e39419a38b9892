//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (Chromium via chromiumoxide). A context owns one
//! browser instance for the duration of a run and must be closed by
//! whoever launched it.

pub mod chromium;

pub use chromium::{find_chromium, ChromiumRenderer};

use crate::config::BrowserSettings;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Result of navigating to a URL.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Returned by `RenderContext::navigate` when the engine itself gave up
/// waiting, so callers can report it as a timeout rather than a load error.
#[derive(Debug, Error)]
#[error("the browser timed out waiting for the page")]
pub struct NavigationTimedOut;

/// A browser engine that can start an isolated rendering session.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Launch a fresh browser instance configured with the given fingerprint.
    async fn launch(&self, settings: &BrowserSettings) -> Result<Box<dyn RenderContext>>;
}

/// An open browser session with a single page.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and wait until the page's network is idle.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult>;
    /// Count the elements currently matching a CSS selector.
    async fn count_matches(&self, selector: &str) -> Result<usize>;
    /// Scroll the document to its bottom edge.
    async fn scroll_to_bottom(&self) -> Result<()>;
    /// Get the full rendered HTML.
    async fn get_html(&self) -> Result<String>;
    /// Release the page and the browser instance.
    async fn close(self: Box<Self>) -> Result<()>;
}
