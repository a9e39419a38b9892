//! Run pipeline: extract, check, deliver
//!
//! Control flows one way. A fatal extraction error stops the run before
//! any envelope is built, and an empty extraction stops it before any
//! request is made.

use crate::config::Config;
use crate::delivery::WebhookClient;
use crate::extractor::{scrape_listing, ExtractionRules};
use crate::model::{DeliveryEnvelope, ProductRecord};
use crate::renderer::Renderer;
use crate::RelayError;
use chrono::Utc;

/// Runs one scrape-and-deliver cycle
///
/// # Arguments
///
/// * `config` - A validated run configuration
/// * `renderer` - The browser engine used for extraction
///
/// # Returns
///
/// * `Ok(usize)` - Number of products the webhook accepted
/// * `Err(RelayError)` - The run failed; the process should exit non-zero
pub async fn run(config: &Config, renderer: &dyn Renderer) -> crate::Result<usize> {
    let started_at = Utc::now();
    let (rules, client) = prepare(config)?;

    let products = extract_non_empty(config, renderer, &rules).await?;
    let count = products.len();

    if client.deliver(products, started_at).await {
        Ok(count)
    } else {
        Err(RelayError::DeliveryFailed {
            endpoint: client.endpoint().to_string(),
        })
    }
}

/// Extracts and wraps the batch without sending it
///
/// Used for dry runs; the returned envelope is exactly what `run` would POST.
pub async fn preview(
    config: &Config,
    renderer: &dyn Renderer,
) -> crate::Result<DeliveryEnvelope> {
    let started_at = Utc::now();
    let (rules, client) = prepare(config)?;

    let products = extract_non_empty(config, renderer, &rules).await?;
    Ok(client.envelope(products, started_at))
}

/// Compiles the rules and builds the client before the browser starts
fn prepare(config: &Config) -> Result<(ExtractionRules, WebhookClient), RelayError> {
    let rules = ExtractionRules::compile(&config.selectors)?;
    let client = WebhookClient::new(config).map_err(|e| {
        tracing::error!("Cannot prepare webhook client: {}", e);
        RelayError::DeliveryFailed {
            endpoint: config.delivery.webhook_url.clone(),
        }
    })?;
    Ok((rules, client))
}

/// Zero products is an anomaly at this level, not a valid empty batch
async fn extract_non_empty(
    config: &Config,
    renderer: &dyn Renderer,
    rules: &ExtractionRules,
) -> Result<Vec<ProductRecord>, RelayError> {
    let products = scrape_listing(renderer, &config.target, &config.browser, rules).await?;

    if products.is_empty() {
        tracing::warn!("No products found on {}", config.target.url);
        return Err(RelayError::NoProducts {
            url: config.target.url.clone(),
        });
    }

    Ok(products)
}
