//! Configuration module for listing-relay
//!
//! This module handles loading, layering, and validating the run
//! configuration: built-in defaults, an optional TOML file, and
//! environment overrides.
//!
//! # Example
//!
//! ```no_run
//! use listing_relay::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("relay.toml"))).unwrap();
//! println!("Scraping: {}", config.target.url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserSettings, Config, DeliveryConfig, SelectorConfig, TargetConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, parse_config, CHROME_PATH_ENV, TARGET_URL_ENV,
    WEBHOOK_URL_ENV,
};
pub use validation::validate;
