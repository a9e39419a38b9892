//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, NavigationTimedOut, RenderContext, Renderer};
use crate::config::BrowserSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, NavigateParams};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Launch flags that keep Chromium usable inside containers and CI runners.
const HARDENING_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
];

/// Lifecycle event Chromium emits once the frame has had no network
/// activity for a short quiet period.
const NETWORK_IDLE: &str = "networkIdle";

/// Find the Chromium binary path.
///
/// Returns `None` when nothing is found, leaving detection to chromiumoxide.
pub fn find_chromium(configured: Option<&str>) -> Option<PathBuf> {
    // 1. Explicit path from config or CHROME_PATH
    if let Some(p) = configured {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!("Configured Chromium path does not exist: {}", p);
    }

    // 2. System PATH
    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one headless Chromium per run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumRenderer;

impl ChromiumRenderer {
    pub fn new() -> Self {
        Self
    }

    fn browser_config(settings: &BrowserSettings) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg(format!("--lang={}", settings.locale))
            .window_size(settings.viewport_width, settings.viewport_height)
            // CDP commands default to a 30s deadline; the caller's navigation
            // budget must be the only bound on a page load
            .request_timeout(Duration::from_millis(settings.navigation_timeout_ms))
            .viewport(Viewport {
                width: settings.viewport_width,
                height: settings.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            });

        for arg in HARDENING_ARGS {
            builder = builder.arg(arg);
        }

        if let Some(path) = find_chromium(settings.chromium_path.as_deref()) {
            tracing::debug!("Using Chromium at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn launch(&self, settings: &BrowserSettings) -> Result<Box<dyn RenderContext>> {
        let config = Self::browser_config(settings)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Pump CDP events until the connection closes
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match open_page(&browser, settings).await {
            Ok(page) => page,
            Err(e) => {
                // Don't leak the process when the first page can't be set up
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(e);
            }
        };

        Ok(Box::new(ChromiumContext {
            browser,
            page,
            handler,
        }))
    }
}

/// Opens a blank page carrying the configured user agent and locale.
async fn open_page(browser: &Browser, settings: &BrowserSettings) -> Result<Page> {
    let page = browser
        .new_page("about:blank")
        .await
        .context("failed to create new page")?;

    let user_agent = SetUserAgentOverrideParams::builder()
        .user_agent(settings.user_agent.clone())
        .accept_language(settings.locale.clone())
        .build()
        .map_err(|e| anyhow::anyhow!("invalid user agent override: {e}"))?;

    page.set_user_agent(user_agent)
        .await
        .context("failed to set user agent")?;

    Ok(page)
}

/// Keeps a CDP deadline distinguishable from other load failures.
fn load_error(err: CdpError, url: &str) -> anyhow::Error {
    match err {
        CdpError::Timeout => NavigationTimedOut.into(),
        other => anyhow::Error::new(other).context(format!("failed to load {url}")),
    }
}

/// A running Chromium instance with its single page.
pub struct ChromiumContext {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult> {
        let start = Instant::now();

        // Subscribe before navigating so the idle event cannot be missed
        let mut lifecycle = self
            .page
            .event_listener::<EventLifecycleEvent>()
            .await
            .context("failed to subscribe to lifecycle events")?;

        let navigated = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| load_error(e, url))?
            .result;

        if let Some(error_text) = navigated.error_text {
            anyhow::bail!("failed to load {url}: {error_text}");
        }

        loop {
            match lifecycle.next().await {
                Some(event)
                    if event.name == NETWORK_IDLE
                        && event.frame_id == navigated.frame_id
                        && navigated
                            .loader_id
                            .as_ref()
                            .map_or(true, |loader| *loader == event.loader_id) =>
                {
                    break
                }
                Some(_) => {}
                None => anyhow::bail!("browser connection closed while loading {url}"),
            }
        }

        let final_url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult {
            final_url,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn count_matches(&self, selector: &str) -> Result<usize> {
        let literal = serde_json::to_string(selector)?;
        let result = self
            .page
            .evaluate(format!("document.querySelectorAll({literal}).length"))
            .await
            .context("selector probe failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert probe result: {e:?}"))
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .context("scroll failed")?;
        Ok(())
    }

    async fn get_html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumContext {
            mut browser,
            page,
            handler,
        } = *self;

        let _ = page.close().await;
        let closed = browser.close().await.context("failed to close Chromium");
        // Reap the child even if the close command failed; Browser's drop kills it otherwise
        let _ = browser.wait().await;
        handler.abort();

        closed.map(|_| ())
    }
}
