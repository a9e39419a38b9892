use serde::Deserialize;

/// Main configuration structure for listing-relay
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the values the relay was originally tuned with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub browser: BrowserSettings,
    pub delivery: DeliveryConfig,
    pub selectors: SelectorConfig,
}

/// The listing page to scrape and the tags it is published under
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Listing page URL
    pub url: String,

    /// Origin tag written into the envelope's `source`
    pub source: String,

    /// Listing tag written into the envelope's `category`
    pub category: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "https://www.falabella.com.pe/falabella-pe/collection/ver-todo-zapatillas-y-zapatos-hombre?sortBy=derived.price.search%2Casc".to_string(),
            source: "falabella".to_string(),
            category: "zapatillas-zapatos-hombre".to_string(),
        }
    }
}

/// Headless browser fingerprint and wait bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "viewport-width")]
    pub viewport_width: u32,

    #[serde(rename = "viewport-height")]
    pub viewport_height: u32,

    /// BCP 47 locale, sent as `--lang` and `Accept-Language`
    pub locale: String,

    /// Upper bound for the initial page load (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Upper bound for the first product container to appear (milliseconds)
    #[serde(rename = "selector-timeout-ms")]
    pub selector_timeout_ms: u64,

    /// Pause after scrolling so lazy-loaded content can render (milliseconds)
    #[serde(rename = "scroll-settle-ms")]
    pub scroll_settle_ms: u64,

    /// Explicit Chromium executable; auto-detected when unset
    #[serde(rename = "chromium-path")]
    pub chromium_path: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            viewport_width: 1920,
            viewport_height: 1080,
            locale: "es-PE".to_string(),
            navigation_timeout_ms: 60_000,
            selector_timeout_ms: 30_000,
            scroll_settle_ms: 2_000,
            chromium_path: None,
        }
    }
}

/// Webhook endpoint and envelope provenance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    #[serde(rename = "webhook-url")]
    pub webhook_url: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Written into `metadata.scraper_version`
    #[serde(rename = "scraper-version")]
    pub scraper_version: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            webhook_url: "http://localhost:5678/webhook/listing-relay".to_string(),
            user_agent: "Falabella-Scraper/1.0".to_string(),
            timeout_secs: 30,
            scraper_version: "1.0".to_string(),
        }
    }
}

/// Candidate CSS selectors, each list in priority order
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub containers: Vec<String>,
    pub name: Vec<String>,
    pub price: Vec<String>,
    #[serde(rename = "original-price")]
    pub original_price: Vec<String>,
    pub discount: Vec<String>,
    pub image: Vec<String>,
    pub link: Vec<String>,
    pub rating: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self {
            containers: list(&[
                ".product-item",
                ".search-results-item",
                ".product-card",
                "[data-testid=\"product-card\"]",
            ]),
            name: list(&[
                ".product-name",
                ".search-results-4-grid__information__name",
                "h3",
                ".title",
            ]),
            price: list(&[
                ".price",
                ".search-results-4-grid__pod-price",
                ".price-value",
                "[data-price]",
            ]),
            original_price: list(&[".original-price", ".list-price", ".price-old"]),
            discount: list(&[".discount", ".discount-percentage", ".badge-discount"]),
            image: list(&["img"]),
            link: list(&["a[href]"]),
            rating: list(&[".rating", ".stars", ".review-rating"]),
        }
    }
}
