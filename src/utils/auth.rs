//! Authentication utilities for API requests
//!
//! Every call to the Dust API carries the same three headers: JSON accept and
//! content types, and a bearer token built from the workspace API key.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};

const JSON_MIME: &str = "application/json";

/// Add the JSON and bearer authentication headers to an HTTP request
pub fn add_auth_headers(
    request: reqwest::RequestBuilder,
    api_key: &str,
) -> reqwest::RequestBuilder {
    request
        .header(ACCEPT, JSON_MIME)
        .header(CONTENT_TYPE, JSON_MIME)
        .header(AUTHORIZATION, bearer_value(api_key))
}

pub fn bearer_value(api_key: &str) -> String {
    format!("Bearer {api_key}")
}
