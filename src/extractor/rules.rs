//! Compiled extraction rules
//!
//! Every lookup on the page is an ordered list of candidate selectors,
//! evaluated until one yields a value. Containers and each product field
//! carry their own independent list.

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Selector};
use url::Url;

/// Attributes holding an image URL, eager before lazy
const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src"];

/// Attributes holding a link target
const LINK_ATTRIBUTES: &[&str] = &["href"];

/// A CSS selector alongside the text it was compiled from
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    pub source: String,
    pub selector: Selector,
}

impl CandidateSelector {
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(source)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {}", source, e)))?;
        Ok(Self {
            source: source.to_string(),
            selector,
        })
    }
}

/// How a matched element is turned into a field value
#[derive(Debug, Clone, Copy)]
pub enum ValueSource {
    /// Text content with whitespace collapsed
    Text,
    /// First usable attribute, resolved to an absolute http(s) URL
    Url(&'static [&'static str]),
}

/// Prioritized selectors for one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub candidates: Vec<CandidateSelector>,
    pub value: ValueSource,
}

impl FieldRule {
    fn compile(sources: &[String], value: ValueSource) -> Result<Self, ConfigError> {
        let candidates = sources
            .iter()
            .map(|s| CandidateSelector::parse(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { candidates, value })
    }

    /// Reads this field from a product card
    ///
    /// Candidates are tried in order; the first one with an element that
    /// yields a usable value wins. Returns `None` when nothing matches.
    ///
    /// A candidate is not settled by its first matching element. Every
    /// element it matches is read in document order, so an `img` whose
    /// `src` is a placeholder gives way to a later `img` in the same card,
    /// and an element with blank text gives way to the next element or
    /// candidate instead of producing the sentinel.
    pub fn probe(&self, card: ElementRef<'_>, base_url: &Url) -> Option<String> {
        self.candidates.iter().find_map(|candidate| {
            card.select(&candidate.selector)
                .find_map(|element| self.value.read(element, base_url))
        })
    }
}

impl ValueSource {
    fn read(&self, element: ElementRef<'_>, base_url: &Url) -> Option<String> {
        match self {
            ValueSource::Text => element_text(element),
            ValueSource::Url(attributes) => attributes.iter().find_map(|attr| {
                element
                    .value()
                    .attr(attr)
                    .and_then(|raw| resolve_url(raw, base_url))
            }),
        }
    }
}

/// Per-field rules for a product card
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub name: FieldRule,
    pub price: FieldRule,
    pub original_price: FieldRule,
    pub discount: FieldRule,
    pub image: FieldRule,
    pub link: FieldRule,
    pub rating: FieldRule,
}

/// The full rule set for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub containers: Vec<CandidateSelector>,
    pub fields: FieldRules,
}

impl ExtractionRules {
    /// Compiles the configured selector lists
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionRules)` - All selectors compiled
    /// * `Err(ConfigError)` - A list was empty or a selector did not parse
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        if config.containers.is_empty() {
            return Err(ConfigError::Validation(
                "at least one container selector is required".to_string(),
            ));
        }

        let containers = config
            .containers
            .iter()
            .map(|s| CandidateSelector::parse(s))
            .collect::<Result<Vec<_>, _>>()?;

        let fields = FieldRules {
            name: FieldRule::compile(&config.name, ValueSource::Text)?,
            price: FieldRule::compile(&config.price, ValueSource::Text)?,
            original_price: FieldRule::compile(&config.original_price, ValueSource::Text)?,
            discount: FieldRule::compile(&config.discount, ValueSource::Text)?,
            image: FieldRule::compile(&config.image, ValueSource::Url(IMAGE_ATTRIBUTES))?,
            link: FieldRule::compile(&config.link, ValueSource::Url(LINK_ATTRIBUTES))?,
            rating: FieldRule::compile(&config.rating, ValueSource::Text)?,
        };

        Ok(Self { containers, fields })
    }

    /// A single selector matching any candidate container, used while waiting
    pub fn container_query(&self) -> String {
        self.containers
            .iter()
            .map(|c| c.source.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Text content of an element, whitespace collapsed; `None` if blank
fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Resolves an attribute value to an absolute http(s) URL
///
/// Returns None if the value should be skipped:
/// - empty values
/// - data: URIs (lazy-load placeholders)
/// - javascript: links and fragment-only anchors
/// - values that don't resolve to HTTP(S)
fn resolve_url(raw: &str, base_url: &Url) -> Option<String> {
    let raw = raw.trim();

    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let lowered = raw.to_ascii_lowercase();
    if lowered.starts_with("data:") || lowered.starts_with("javascript:") {
        return None;
    }

    match base_url.join(raw) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
