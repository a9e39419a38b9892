//! listing-relay: scrape a rendered product listing and hand it to a webhook
//!
//! One run drives a headless Chromium to a retail listing page, extracts the
//! product cards with prioritized selector rules, and POSTs the batch as a
//! single JSON envelope to an automation endpoint.

pub mod config;
pub mod delivery;
pub mod extractor;
pub mod model;
pub mod pipeline;
pub mod renderer;

use thiserror::Error;

/// Top-level outcome of a failed run
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("No products were extracted from {url}")]
    NoProducts { url: String },

    #[error("Delivery to {endpoint} failed")]
    DeliveryFailed { endpoint: String },
}

/// Fatal failures while rendering or reading the listing page
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("No product container matching '{selectors}' appeared within {timeout_ms}ms")]
    ContainersNotFound { selectors: String, timeout_ms: u64 },

    #[error("Page evaluation failed: {0}")]
    Evaluation(String),

    #[error("Invalid page URL {url}: {source}")]
    PageUrl {
        url: String,
        #[source]
        source: ::url::ParseError,
    },
}

/// Reasons a webhook delivery did not succeed
#[derive(Debug, Error)]
pub enum DeliveryFailure {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for listing-relay runs
pub type Result<T> = std::result::Result<T, RelayError>;

// Re-export commonly used types
pub use config::Config;
pub use delivery::WebhookClient;
pub use extractor::{scrape_listing, ExtractionRules};
pub use model::{DeliveryEnvelope, ProductRecord, NOT_AVAILABLE};
pub use renderer::{ChromiumRenderer, RenderContext, Renderer};
