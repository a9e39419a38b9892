use crate::config::types::{BrowserSettings, Config, DeliveryConfig, SelectorConfig, TargetConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_browser_settings(&config.browser)?;
    validate_delivery_config(&config.delivery)?;
    validate_selector_config(&config.selectors)?;
    Ok(())
}

/// Validates the listing page and its tags
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    validate_http_url("target url", &config.url)?;
    require_non_empty("source", &config.source)?;
    require_non_empty("category", &config.category)?;
    Ok(())
}

/// Validates the browser fingerprint and wait bounds
fn validate_browser_settings(config: &BrowserSettings) -> Result<(), ConfigError> {
    require_non_empty("browser user_agent", &config.user_agent)?;
    require_non_empty("locale", &config.locale)?;

    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if config.navigation_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "navigation_timeout_ms must be > 0".to_string(),
        ));
    }

    if config.selector_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "selector_timeout_ms must be > 0".to_string(),
        ));
    }

    if let Some(path) = &config.chromium_path {
        require_non_empty("chromium_path", path)?;
    }

    Ok(())
}

/// Validates the webhook endpoint and envelope provenance
fn validate_delivery_config(config: &DeliveryConfig) -> Result<(), ConfigError> {
    validate_http_url("webhook url", &config.webhook_url)?;
    require_non_empty("delivery user_agent", &config.user_agent)?;
    require_non_empty("scraper_version", &config.scraper_version)?;

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector list is populated and parses as CSS
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    let lists: [(&str, &[String]); 8] = [
        ("containers", config.containers.as_slice()),
        ("name", config.name.as_slice()),
        ("price", config.price.as_slice()),
        ("original-price", config.original_price.as_slice()),
        ("discount", config.discount.as_slice()),
        ("image", config.image.as_slice()),
        ("link", config.link.as_slice()),
        ("rating", config.rating.as_slice()),
    ];

    for (field, selectors) in lists {
        if selectors.is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector list '{}' must contain at least one selector",
                field
            )));
        }

        for selector in selectors {
            Selector::parse(selector).map_err(|e| {
                ConfigError::InvalidSelector(format!("'{}' in '{}': {}", selector, field, e))
            })?;
        }
    }

    Ok(())
}

/// Requires an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
