//! HTML parser for turning a rendered listing into product records
//!
//! This module handles reading a rendered document:
//! - Picking the container selector for the whole run
//! - Reading every field of every card with its own fallback list
//! - Numbering records in page order

use crate::extractor::rules::{ExtractionRules, FieldRules};
use crate::model::{ProductRecord, NOT_AVAILABLE};
use scraper::{ElementRef, Html};
use url::Url;

/// Extracts product records from rendered HTML
///
/// # Container Selection
///
/// Container candidates are tried in priority order and the first one that
/// matches at least one element is used for every card; candidates are
/// never mixed within one run.
///
/// # Field Fallbacks
///
/// | Field | When no candidate matches |
/// |-------|---------------------------|
/// | name, price | `"N/A"` |
/// | everything else | `None` |
///
/// # Arguments
///
/// * `html` - The rendered document
/// * `base_url` - The page URL, for resolving relative image and link URLs
/// * `rules` - The compiled extraction rules
///
/// # Returns
///
/// Records numbered `1..=N` in document order; empty when no container matches.
///
/// # Example
///
/// ```
/// use listing_relay::config::SelectorConfig;
/// use listing_relay::extractor::{extract_products, ExtractionRules};
/// use url::Url;
///
/// let html = r#"<div class="product-card"><h3>Runner</h3><span class="price">S/ 99</span></div>"#;
/// let rules = ExtractionRules::compile(&SelectorConfig::default()).unwrap();
/// let base_url = Url::parse("https://shop.example.com/").unwrap();
/// let products = extract_products(html, &base_url, &rules);
/// assert_eq!(products[0].name, "Runner");
/// ```
pub fn extract_products(html: &str, base_url: &Url, rules: &ExtractionRules) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);

    let matched = rules.containers.iter().find_map(|candidate| {
        let cards: Vec<ElementRef<'_>> = document.select(&candidate.selector).collect();
        if cards.is_empty() {
            None
        } else {
            Some((candidate.source.as_str(), cards))
        }
    });

    let Some((container, cards)) = matched else {
        tracing::debug!("No container candidate matched the rendered document");
        return Vec::new();
    };

    tracing::debug!("Using container selector '{}' ({} cards)", container, cards.len());

    let products: Vec<ProductRecord> = cards
        .into_iter()
        .enumerate()
        .map(|(index, card)| read_card(index + 1, card, base_url, &rules.fields))
        .collect();

    let incomplete = products
        .iter()
        .filter(|p| p.is_missing_name() || p.is_missing_price())
        .count();
    if incomplete > 0 {
        tracing::debug!(
            "{} of {} cards have no name or price",
            incomplete,
            products.len()
        );
    }

    products
}

/// Reads one card; each field falls back on its own
fn read_card(id: usize, card: ElementRef<'_>, base_url: &Url, fields: &FieldRules) -> ProductRecord {
    let required = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    ProductRecord {
        id,
        name: required(fields.name.probe(card, base_url)),
        price: required(fields.price.probe(card, base_url)),
        original_price: fields.original_price.probe(card, base_url),
        discount: fields.discount.probe(card, base_url),
        image: fields.image.probe(card, base_url),
        link: fields.link.probe(card, base_url),
        rating: fields.rating.probe(card, base_url),
    }
}
