//! End-to-end runs: in-memory renderer, wiremock webhook

use crate::support::{test_config, StaticRenderer, LISTING_URL, THREE_CARDS};
use listing_relay::config::Config;
use listing_relay::extractor::{scrape_listing, ExtractionRules};
use listing_relay::{pipeline, ExtractionError, RelayError};
use std::sync::atomic::Ordering;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn webhook(status: u16, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/relay"))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer) -> Config {
    test_config(&format!("{}/webhook/relay", server.uri()))
}

#[tokio::test]
async fn test_full_run_delivers_products_in_page_order() {
    let server = webhook(200, 1).await;
    let renderer = StaticRenderer::new(THREE_CARDS);

    let delivered = pipeline::run(&config_for(&server), &renderer)
        .await
        .expect("run should succeed");

    assert_eq!(delivered, 3);
    assert!(renderer.was_closed());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    assert_eq!(body["total_products"], 3);
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 3);

    let ids: Vec<u64> = products.iter().map(|p| p["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let names: Vec<&str> = products.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Zapatilla Uno", "Zapatilla Dos", "Zapatilla Tres"]);

    assert_eq!(products[0]["rating"], "4.2");
    assert!(products[1]["rating"].is_null());
    assert_eq!(products[2]["rating"], "3.8");

    assert_eq!(products[1]["originalPrice"], "S/ 159.90");
    assert_eq!(products[1]["discount"], "-25%");
    assert_eq!(products[1]["image"], "https://cdn.example.com/2.jpg");
    assert_eq!(products[0]["image"], "https://shop.example.com/img/1.jpg");
    assert_eq!(products[2]["link"], "https://shop.example.com/product/3");
}

#[tokio::test]
async fn test_container_timeout_aborts_before_delivery() {
    let server = webhook(200, 0).await;
    let renderer = StaticRenderer::new("<html><body><p>Cargando...</p></body></html>");

    let result = pipeline::run(&config_for(&server), &renderer).await;

    assert!(matches!(
        result,
        Err(RelayError::Extraction(ExtractionError::ContainersNotFound { timeout_ms: 300, .. }))
    ));
    assert!(renderer.was_closed());
}

#[tokio::test]
async fn test_empty_extraction_never_calls_webhook() {
    let server = webhook(200, 0).await;
    // A card is visible while waiting, then the page re-renders without any
    let renderer = StaticRenderer::rerendering(
        r#"<div class="product-card"><h3>Placeholder</h3></div>"#,
        "<html><body><p>Sin resultados</p></body></html>",
    );

    let result = pipeline::run(&config_for(&server), &renderer).await;

    match result {
        Err(RelayError::NoProducts { url }) => assert_eq!(url, LISTING_URL),
        other => panic!("expected NoProducts, got {other:?}"),
    }
    assert!(renderer.was_closed());
}

#[tokio::test]
async fn test_webhook_rejection_fails_the_run() {
    let server = webhook(500, 1).await;
    let renderer = StaticRenderer::new(THREE_CARDS);

    let result = pipeline::run(&config_for(&server), &renderer).await;

    assert!(matches!(result, Err(RelayError::DeliveryFailed { .. })));
}

#[tokio::test]
async fn test_navigation_failure_closes_browser() {
    let server = webhook(200, 0).await;
    let renderer = StaticRenderer::failing_navigation();

    let result = pipeline::run(&config_for(&server), &renderer).await;

    match result {
        Err(RelayError::Extraction(ExtractionError::Navigation { url, message })) => {
            assert_eq!(url, LISTING_URL);
            assert!(message.contains("ERR_NAME_NOT_RESOLVED"));
        }
        other => panic!("expected Navigation error, got {other:?}"),
    }
    assert!(renderer.was_closed());
}

#[tokio::test]
async fn test_navigation_timeout_closes_browser() {
    let server = webhook(200, 0).await;
    let renderer = StaticRenderer::hanging_navigation();
    let mut config = config_for(&server);
    config.browser.navigation_timeout_ms = 200;

    let result = pipeline::run(&config, &renderer).await;

    match result {
        Err(RelayError::Extraction(ExtractionError::NavigationTimeout { url, timeout_ms })) => {
            assert_eq!(url, LISTING_URL);
            assert_eq!(timeout_ms, 200);
        }
        other => panic!("expected NavigationTimeout, got {other:?}"),
    }
    assert!(renderer.was_closed());
}

#[tokio::test]
async fn test_engine_timeout_is_reported_as_navigation_timeout() {
    let server = webhook(200, 0).await;
    let renderer = StaticRenderer::engine_timeout();

    let result = pipeline::run(&config_for(&server), &renderer).await;

    assert!(matches!(
        result,
        Err(RelayError::Extraction(ExtractionError::NavigationTimeout { .. }))
    ));
    assert!(renderer.was_closed());
}

#[tokio::test]
async fn test_launch_failure_is_extraction_error() {
    let server = webhook(200, 0).await;
    let renderer = StaticRenderer::failing_launch();

    let result = pipeline::run(&config_for(&server), &renderer).await;

    assert!(matches!(
        result,
        Err(RelayError::Extraction(ExtractionError::Launch(_)))
    ));
    assert_eq!(renderer.launches.load(Ordering::SeqCst), 1);
    assert!(!renderer.was_closed());
}

#[tokio::test]
async fn test_invalid_selector_fails_before_launch() {
    let server = webhook(200, 0).await;
    let renderer = StaticRenderer::new(THREE_CARDS);
    let mut config = config_for(&server);
    config.selectors.name = vec!["[[broken".to_string()];

    let result = pipeline::run(&config, &renderer).await;

    assert!(matches!(result, Err(RelayError::Config(_))));
    assert_eq!(renderer.launches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_preview_builds_envelope_without_sending() {
    let server = webhook(200, 0).await;
    let renderer = StaticRenderer::new(THREE_CARDS);

    let envelope = pipeline::preview(&config_for(&server), &renderer)
        .await
        .expect("preview should succeed");

    assert_eq!(envelope.total_products, 3);
    assert_eq!(envelope.products.len(), envelope.total_products);
    assert_eq!(envelope.source, "falabella");
}

#[tokio::test]
async fn test_scrape_listing_allows_empty_result() {
    let server = webhook(200, 0).await;
    let config = config_for(&server);
    let rules = ExtractionRules::compile(&config.selectors).unwrap();
    let renderer = StaticRenderer::rerendering(
        r#"<div class="product-item"></div>"#,
        "<html><body></body></html>",
    );

    let products = scrape_listing(&renderer, &config.target, &config.browser, &rules)
        .await
        .expect("empty listing is not an extraction error");

    assert!(products.is_empty());
    assert!(renderer.was_closed());
}
