// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Status condition reasons for news resources.
//!
//! Reasons are programmatic identifiers in CamelCase recorded on
//! [`Condition::reason`](crate::crd::Condition::reason).
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Added
//!       success: false
//!       reason: AggregatorUnreachable
//!       message: "request to https://aggregator/sources failed: connection refused"
//!       lastUpdatedName: bbc
//!       lastUpdateTime: "2024-01-01T00:00:00Z"
//! ```

// ============================================================================
// Success Reasons
// ============================================================================

/// The feed source was registered with the aggregator.
pub const REASON_SOURCE_REGISTERED: &str = "SourceRegistered";

/// The news query ran and status was refreshed.
pub const REASON_NEWS_FETCHED: &str = "NewsFetched";

// ============================================================================
// Aggregator Reasons
// ============================================================================

/// Network-level failure reaching the aggregator.
pub const REASON_AGGREGATOR_UNREACHABLE: &str = "AggregatorUnreachable";

/// Aggregator rejected the request (HTTP 400).
pub const REASON_AGGREGATOR_BAD_REQUEST: &str = "AggregatorBadRequest";

/// Aggregator authentication or authorization failed (HTTP 401/403).
pub const REASON_AGGREGATOR_AUTH_FAILED: &str = "AggregatorAuthFailed";

/// Source or endpoint not found on the aggregator (HTTP 404).
pub const REASON_SOURCE_NOT_FOUND: &str = "SourceNotFound";

/// Aggregator conflict, e.g. source name already taken by another URL (HTTP 409).
pub const REASON_SOURCE_CONFLICT: &str = "SourceConflict";

/// Aggregator internal error (HTTP 500).
pub const REASON_AGGREGATOR_INTERNAL_ERROR: &str = "AggregatorInternalError";

/// Gateway or availability error in front of the aggregator (HTTP 502/503/504).
pub const REASON_GATEWAY_ERROR: &str = "GatewayError";

/// Aggregator answered with a body that could not be decoded.
pub const REASON_INVALID_RESPONSE: &str = "InvalidResponse";

/// Aggregator base URL or a derived query URL is malformed.
pub const REASON_INVALID_URL: &str = "InvalidUrl";

// ============================================================================
// HotNews Resolution Reasons
// ============================================================================

/// No feed names could be resolved for the query.
pub const REASON_NO_FEEDS_RESOLVED: &str = "NoFeedsResolved";

/// A feed group names a feed that does not exist.
pub const REASON_UNKNOWN_FEED: &str = "UnknownFeed";

// ============================================================================
// Generic Reasons
// ============================================================================

/// A Kubernetes API call failed during reconciliation.
pub const REASON_KUBE_API_ERROR: &str = "KubernetesApiError";

/// Fallback reason for failures without a more specific classification.
pub const REASON_RECONCILE_FAILED: &str = "ReconcileFailed";
