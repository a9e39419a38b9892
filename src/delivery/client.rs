//! Webhook client
//!
//! This module handles the single POST of a run, including:
//! - Building an HTTP client with the relay's user agent and timeout
//! - Wrapping products into a `DeliveryEnvelope`
//! - Classifying the outcome (status, timeout, transport)

use crate::config::Config;
use crate::model::{DeliveryEnvelope, EnvelopeMetadata, ProductRecord};
use crate::DeliveryFailure;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// POSTs product batches to the configured webhook
///
/// Exactly one request is made per delivery; failures are reported, never
/// retried.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
    source: String,
    category: String,
    scraper_version: String,
}

impl WebhookClient {
    /// Builds a client from the run configuration
    ///
    /// # Returns
    ///
    /// * `Ok(WebhookClient)` - Ready to deliver
    /// * `Err(DeliveryFailure::Client)` - The HTTP client could not be built
    ///
    /// # Example
    ///
    /// ```no_run
    /// use listing_relay::config::Config;
    /// use listing_relay::delivery::WebhookClient;
    ///
    /// let client = WebhookClient::new(&Config::default()).unwrap();
    /// println!("Delivering to {}", client.endpoint());
    /// ```
    pub fn new(config: &Config) -> Result<Self, DeliveryFailure> {
        let delivery = &config.delivery;

        let client = Client::builder()
            .user_agent(delivery.user_agent.clone())
            .timeout(Duration::from_secs(delivery.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(DeliveryFailure::Client)?;

        Ok(Self {
            client,
            endpoint: delivery.webhook_url.clone(),
            timeout_secs: delivery.timeout_secs,
            source: config.target.source.clone(),
            category: config.target.category.clone(),
            scraper_version: delivery.scraper_version.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Wraps products into an envelope stamped now
    ///
    /// # Arguments
    ///
    /// * `products` - Records in page order
    /// * `started_at` - When the run began, recorded as `metadata.execution_time`
    pub fn envelope(
        &self,
        products: Vec<ProductRecord>,
        started_at: DateTime<Utc>,
    ) -> DeliveryEnvelope {
        DeliveryEnvelope::new(
            self.source.clone(),
            self.category.clone(),
            products,
            EnvelopeMetadata {
                scraper_version: self.scraper_version.clone(),
                execution_time: started_at,
            },
        )
    }

    /// Delivers a batch and reports whether the webhook accepted it
    ///
    /// Never returns an error: every failure is logged here and reported as
    /// `false`.
    pub async fn deliver(&self, products: Vec<ProductRecord>, started_at: DateTime<Utc>) -> bool {
        let envelope = self.envelope(products, started_at);

        tracing::info!(
            "Sending {} products to {}",
            envelope.total_products,
            self.endpoint
        );

        match self.send(&envelope).await {
            Ok(()) => {
                tracing::info!("Webhook accepted {} products", envelope.total_products);
                true
            }
            Err(DeliveryFailure::Timeout { timeout_secs }) => {
                tracing::error!("Timed out after {}s sending to webhook", timeout_secs);
                false
            }
            Err(DeliveryFailure::Status { status, body }) => {
                tracing::error!("Webhook returned HTTP {}: {}", status, body);
                false
            }
            Err(e) => {
                tracing::error!("Error sending to webhook: {}", e);
                false
            }
        }
    }

    /// Sends one envelope and classifies the outcome
    ///
    /// | Outcome | Result |
    /// |---------|--------|
    /// | HTTP 200 | `Ok(())`, body ignored |
    /// | Any other status | `Status` with the response body |
    /// | Request timeout | `Timeout` |
    /// | Connection, TLS, or other transport fault | `Transport` |
    pub async fn send(&self, envelope: &DeliveryEnvelope) -> Result<(), DeliveryFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(envelope)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => format!("<unreadable body: {}>", e),
        };

        Err(DeliveryFailure::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn classify(&self, error: reqwest::Error) -> DeliveryFailure {
        if error.is_timeout() {
            DeliveryFailure::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            DeliveryFailure::Transport(error)
        }
    }
}
