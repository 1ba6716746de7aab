// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for news resources.
//!
//! # Reconciliation Architecture
//!
//! Both controllers follow the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor resource changes via Kubernetes API
//! 2. **Reconcile** - Compare desired state (spec) with the aggregator and the cluster
//! 3. **Update** - Register sources, run queries, adjust owner references
//! 4. **Status** - Record the outcome as a condition
//!
//! # Available Reconcilers
//!
//! - [`reconcile_feed`] - Registers and removes aggregator sources
//! - [`reconcile_hotnews`] - Resolves feeds, runs the news query, owns the `Feed`s it uses
//!
//! # Example: Using a Reconciler
//!
//! ```rust,no_run
//! use news_operator::reconcilers::reconcile_feed;
//! use news_operator::crd::Feed;
//! use news_operator::context::Context;
//! use std::sync::Arc;
//!
//! async fn reconcile(ctx: Arc<Context>, feed: Arc<Feed>) -> anyhow::Result<()> {
//!     reconcile_feed(ctx, feed).await?;
//!     Ok(())
//! }
//! ```

pub mod feed;
pub mod finalizers;
pub mod hotnews;
pub mod owners;
pub mod retry;
pub mod status;

pub use feed::reconcile_feed;
pub use hotnews::reconcile_hotnews;
