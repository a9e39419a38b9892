//! Integration tests for listing-relay
//!
//! These tests replace the browser with an in-memory renderer and the
//! webhook with wiremock, then exercise full runs end-to-end.

mod pipeline_tests;
mod support;
