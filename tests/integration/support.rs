//! Shared fixtures: an in-memory renderer and test configuration

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use listing_relay::config::{BrowserSettings, Config};
use listing_relay::renderer::{NavigationResult, NavigationTimedOut, RenderContext, Renderer};
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const LISTING_URL: &str = "https://shop.example.com/collection/zapatillas";

/// Serves fixed HTML instead of launching a browser
///
/// `initial_html` is what container probes see while waiting;
/// `rendered_html` is the document after scrolling, which is what gets
/// extracted. Keeping them apart lets a test simulate a page that
/// re-renders between the wait and the extraction.
#[derive(Clone)]
pub struct StaticRenderer {
    initial_html: String,
    rendered_html: String,
    fail_launch: bool,
    navigation: Navigation,
    pub launches: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
}

impl StaticRenderer {
    pub fn new(html: &str) -> Self {
        Self {
            initial_html: html.to_string(),
            rendered_html: html.to_string(),
            fail_launch: false,
            navigation: Navigation::Load,
            launches: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn rerendering(initial_html: &str, rendered_html: &str) -> Self {
        let mut renderer = Self::new(initial_html);
        renderer.rendered_html = rendered_html.to_string();
        renderer
    }

    pub fn failing_launch() -> Self {
        let mut renderer = Self::new("");
        renderer.fail_launch = true;
        renderer
    }

    pub fn failing_navigation() -> Self {
        let mut renderer = Self::new("");
        renderer.navigation = Navigation::Fail;
        renderer
    }

    /// Navigation that never completes
    pub fn hanging_navigation() -> Self {
        let mut renderer = Self::new(THREE_CARDS);
        renderer.navigation = Navigation::Hang;
        renderer
    }

    /// Navigation the engine abandons with its own timeout
    pub fn engine_timeout() -> Self {
        let mut renderer = Self::new(THREE_CARDS);
        renderer.navigation = Navigation::EngineTimeout;
        renderer
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn launch(&self, _settings: &BrowserSettings) -> Result<Box<dyn RenderContext>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            bail!("no browser in this environment");
        }

        Ok(Box::new(StaticContext {
            renderer: self.clone(),
            scrolled: AtomicBool::new(false),
        }))
    }
}

#[derive(Clone, Copy)]
enum Navigation {
    Load,
    Fail,
    Hang,
    EngineTimeout,
}

struct StaticContext {
    renderer: StaticRenderer,
    scrolled: AtomicBool,
}

fn count_in(html: &str, selector: &str) -> Result<usize> {
    let selector =
        Selector::parse(selector).map_err(|e| anyhow!("invalid selector {selector}: {e}"))?;
    let document = Html::parse_document(html);
    let count = document.select(&selector).count();
    Ok(count)
}

#[async_trait]
impl RenderContext for StaticContext {
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult> {
        match self.renderer.navigation {
            Navigation::Load => {}
            Navigation::Fail => bail!("net::ERR_NAME_NOT_RESOLVED at {url}"),
            Navigation::Hang => std::future::pending::<()>().await,
            Navigation::EngineTimeout => return Err(NavigationTimedOut.into()),
        }
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 1,
        })
    }

    async fn count_matches(&self, selector: &str) -> Result<usize> {
        count_in(&self.renderer.initial_html, selector)
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.scrolled.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn get_html(&self) -> Result<String> {
        if self.scrolled.load(Ordering::SeqCst) {
            Ok(self.renderer.rendered_html.clone())
        } else {
            Ok(self.renderer.initial_html.clone())
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.renderer.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Configuration pointing at a mock webhook, with waits shortened for tests
pub fn test_config(webhook_url: &str) -> Config {
    let mut config = Config::default();
    config.target.url = LISTING_URL.to_string();
    config.delivery.webhook_url = webhook_url.to_string();
    config.delivery.timeout_secs = 5;
    config.browser.selector_timeout_ms = 300;
    config.browser.scroll_settle_ms = 0;
    config
}

/// Three cards in DOM order; the second has no rating
pub const THREE_CARDS: &str = r#"
<html><body>
  <div class="product-card">
    <a href="/product/1"><img src="/img/1.jpg"></a>
    <h3>Zapatilla Uno</h3>
    <span class="price">S/ 99.90</span>
    <span class="rating">4.2</span>
  </div>
  <div class="product-card">
    <a href="/product/2"><img data-src="https://cdn.example.com/2.jpg"></a>
    <h3>Zapatilla Dos</h3>
    <span class="price">S/ 119.90</span>
    <span class="original-price">S/ 159.90</span>
    <span class="discount">-25%</span>
  </div>
  <div class="product-card">
    <a href="/product/3"><img src="/img/3.jpg"></a>
    <h3>Zapatilla Tres</h3>
    <span class="price">S/ 139.90</span>
    <span class="rating">3.8</span>
  </div>
</body></html>
"#;
