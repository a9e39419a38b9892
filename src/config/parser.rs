use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable naming the webhook endpoint
pub const WEBHOOK_URL_ENV: &str = "N8N_WEBHOOK_URL";

/// Environment variable naming the listing page
pub const TARGET_URL_ENV: &str = "LISTING_RELAY_TARGET_URL";

/// Environment variable naming the Chromium executable
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// Loads the configuration for one run
///
/// Starts from the built-in defaults, layers the TOML file on top when a
/// path is given, then applies environment overrides and validates the
/// result.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use listing_relay::config::load_config;
///
/// let config = load_config(None).unwrap();
/// println!("Webhook: {}", config.delivery.webhook_url);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            parse_config(&content)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate(&config)?;

    Ok(config)
}

/// Parses TOML content into a configuration without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Applies environment overrides using the given lookup
///
/// Empty values are ignored so an exported-but-blank variable does not
/// wipe out a configured endpoint.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(url) = non_empty(WEBHOOK_URL_ENV) {
        config.delivery.webhook_url = url;
    }

    if let Some(url) = non_empty(TARGET_URL_ENV) {
        config.target.url = url;
    }

    if let Some(path) = non_empty(CHROME_PATH_ENV) {
        config.browser.chromium_path = Some(path);
    }
}
