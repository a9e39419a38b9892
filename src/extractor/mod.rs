//! Extractor module for rendering the listing page and reading products
//!
//! This module contains the extraction side of a run, including:
//! - Driving a browser session through navigation, waiting, and scrolling
//! - Compiled selector rules with per-field fallbacks
//! - Parsing the rendered HTML into product records

mod parser;
mod rules;

pub use parser::extract_products;
pub use rules::{CandidateSelector, ExtractionRules, FieldRule, FieldRules, ValueSource};

use crate::config::{BrowserSettings, TargetConfig};
use crate::model::ProductRecord;
use crate::renderer::{NavigationTimedOut, RenderContext, Renderer};
use crate::ExtractionError;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use url::Url;

/// Delay between container probes while waiting for the listing to render
const CONTAINER_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Renders the listing page and extracts its products
///
/// This is the main entry point for the extraction side. It will:
/// 1. Launch a headless browser with the configured fingerprint
/// 2. Navigate and wait for network idle, bounded by the navigation timeout
/// 3. Wait for any product container to appear, bounded by the selector timeout
/// 4. Scroll to the bottom and pause so lazy-loaded content can render
/// 5. Read every card from the rendered HTML
///
/// The browser session is closed before returning, on success and on
/// every failure path.
///
/// # Arguments
///
/// * `renderer` - The browser engine to launch
/// * `target` - The listing page to scrape
/// * `browser` - Fingerprint and wait bounds
/// * `rules` - Compiled container and field selectors
///
/// # Returns
///
/// * `Ok(Vec<ProductRecord>)` - Records in page order; may be empty
/// * `Err(ExtractionError)` - Launch, navigation, wait, or evaluation failed
pub async fn scrape_listing(
    renderer: &dyn Renderer,
    target: &TargetConfig,
    browser: &BrowserSettings,
    rules: &ExtractionRules,
) -> Result<Vec<ProductRecord>, ExtractionError> {
    tracing::info!("Launching headless browser");
    let mut session = renderer
        .launch(browser)
        .await
        .map_err(|e| ExtractionError::Launch(format!("{e:#}")))?;

    let result = drive_session(session.as_mut(), target, browser, rules).await;

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser cleanly: {:#}", e);
    }

    match &result {
        Ok(products) => tracing::info!("Extracted {} products", products.len()),
        Err(e) => tracing::error!("Scraping failed: {}", e),
    }

    result
}

async fn drive_session(
    session: &mut dyn RenderContext,
    target: &TargetConfig,
    browser: &BrowserSettings,
    rules: &ExtractionRules,
) -> Result<Vec<ProductRecord>, ExtractionError> {
    tracing::info!("Navigating to: {}", target.url);
    let navigation = match timeout(
        Duration::from_millis(browser.navigation_timeout_ms),
        session.navigate(&target.url),
    )
    .await
    {
        Ok(Ok(navigation)) => navigation,
        Ok(Err(e)) if !e.is::<NavigationTimedOut>() => {
            return Err(ExtractionError::Navigation {
                url: target.url.clone(),
                message: format!("{e:#}"),
            })
        }
        // Our deadline, or the engine's own
        _ => {
            return Err(ExtractionError::NavigationTimeout {
                url: target.url.clone(),
                timeout_ms: browser.navigation_timeout_ms,
            })
        }
    };
    tracing::debug!(
        "Loaded {} in {}ms",
        navigation.final_url,
        navigation.load_time_ms
    );

    tracing::info!("Waiting for products...");
    wait_for_containers(&*session, rules, browser.selector_timeout_ms).await?;

    tracing::info!("Scrolling to trigger lazy loading");
    if let Err(e) = session.scroll_to_bottom().await {
        tracing::warn!("Scroll failed, continuing with current content: {:#}", e);
    }
    sleep(Duration::from_millis(browser.scroll_settle_ms)).await;

    tracing::info!("Extracting products");
    let html = session
        .get_html()
        .await
        .map_err(|e| ExtractionError::Evaluation(format!("{e:#}")))?;

    let base_url = Url::parse(&navigation.final_url).map_err(|source| ExtractionError::PageUrl {
        url: navigation.final_url.clone(),
        source,
    })?;

    Ok(extract_products(&html, &base_url, rules))
}

/// Polls until any container candidate matches, or the deadline passes
///
/// A failed probe is treated as "not yet": the document may still be
/// replacing itself while client-side rendering runs.
async fn wait_for_containers(
    session: &dyn RenderContext,
    rules: &ExtractionRules,
    timeout_ms: u64,
) -> Result<(), ExtractionError> {
    let query = rules.container_query();

    let poll = async {
        loop {
            match session.count_matches(&query).await {
                Ok(count) if count > 0 => {
                    tracing::debug!("{} product containers present", count);
                    return;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Container probe failed, retrying: {:#}", e),
            }
            sleep(CONTAINER_POLL_INTERVAL).await;
        }
    };

    timeout(Duration::from_millis(timeout_ms), poll)
        .await
        .map_err(|_| ExtractionError::ContainersNotFound {
            selectors: query.clone(),
            timeout_ms,
        })
}
