// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! HTTP error code mapping to status condition reasons.
//!
//! Maps HTTP status codes returned by the news aggregator to the
//! standardized reasons of [`crate::status_reasons`].
//!
//! # Usage
//!
//! ```rust
//! use news_operator::http_errors::map_http_error_to_reason;
//!
//! let (reason, message) = map_http_error_to_reason(404);
//! assert_eq!(reason, "SourceNotFound");
//!
//! let (reason, message) = map_http_error_to_reason(500);
//! assert_eq!(reason, "AggregatorInternalError");
//! ```

use crate::status_reasons::{
    REASON_AGGREGATOR_AUTH_FAILED, REASON_AGGREGATOR_BAD_REQUEST,
    REASON_AGGREGATOR_INTERNAL_ERROR, REASON_AGGREGATOR_UNREACHABLE, REASON_GATEWAY_ERROR,
    REASON_SOURCE_CONFLICT, REASON_SOURCE_NOT_FOUND,
};

/// Map HTTP status code to condition reason and message.
///
/// # HTTP Code Mapping
///
/// | HTTP Code | Reason | Meaning |
/// |-----------|--------|---------|
/// | 400 | `AggregatorBadRequest` | Invalid request format |
/// | 401 | `AggregatorAuthFailed` | Authentication required |
/// | 403 | `AggregatorAuthFailed` | Insufficient permissions |
/// | 404 | `SourceNotFound` | Source or endpoint not found |
/// | 409 | `SourceConflict` | Source exists with different settings |
/// | 500 | `AggregatorInternalError` | Internal server error |
/// | 502 | `GatewayError` | Bad gateway |
/// | 503 | `GatewayError` | Service unavailable |
/// | 504 | `GatewayError` | Gateway timeout |
/// | Other | `AggregatorUnreachable` | Unexpected error |
#[must_use]
pub fn map_http_error_to_reason(status_code: u16) -> (&'static str, String) {
    match status_code {
        400 => (
            REASON_AGGREGATOR_BAD_REQUEST,
            "Invalid request to news aggregator (400)".into(),
        ),
        401 => (
            REASON_AGGREGATOR_AUTH_FAILED,
            "News aggregator authentication required (401)".into(),
        ),
        403 => (
            REASON_AGGREGATOR_AUTH_FAILED,
            "News aggregator authorization failed (403)".into(),
        ),
        404 => (
            REASON_SOURCE_NOT_FOUND,
            "Source or endpoint not found on news aggregator (404)".into(),
        ),
        409 => (
            REASON_SOURCE_CONFLICT,
            "Source conflicts with an existing aggregator source (409)".into(),
        ),
        500 => (
            REASON_AGGREGATOR_INTERNAL_ERROR,
            "News aggregator internal error (500)".into(),
        ),
        502 => (
            REASON_GATEWAY_ERROR,
            "Bad gateway reaching news aggregator (502)".into(),
        ),
        503 => (
            REASON_GATEWAY_ERROR,
            "News aggregator unavailable (503)".into(),
        ),
        504 => (
            REASON_GATEWAY_ERROR,
            "Gateway timeout reaching news aggregator (504)".into(),
        ),
        _ => (
            REASON_AGGREGATOR_UNREACHABLE,
            format!("Unexpected HTTP status from news aggregator ({status_code})"),
        ),
    }
}
