// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert Slack export zips to a browsable static HTML archive.
//!
//! This crate provides ingestion and rendering functionality for turning a
//! directory of Slack export bundles into a static site: one page per
//! channel, messages in chronological order, markup tokens resolved to
//! readable links and mentions, and referenced attachments downloaded next
//! to the page that uses them.
//!
//! # Overview
//!
//! A workspace is often exported more than once, with overlapping zips.
//! Conversion runs in two strictly separated phases:
//!
//! 1. Every bundle is read into an in-memory [`store::Workspace`], merging
//!    overlapping exports with a last-bundle-wins policy keyed by record id
//!    (and, for messages, by timestamp within each channel).
//! 2. The merged store is rendered channel by channel, resolving message
//!    markup through [`links`] and materializing attachments through
//!    [`download`].
//!
//! Neither phase aborts on a bad input: errors accumulate in a
//! [`report::Report`] and are surfaced at the end of the run.
//!
//! # Example
//!
//! ```no_run
//! use slack2html::{archive, download, renderer, report, store};
//!
//! let mut workspace = store::Workspace::new();
//! let mut report = report::Report::new();
//! archive::ingest_dir(std::path::Path::new("exports"), &mut workspace, &mut report);
//!
//! let renderer = renderer::SiteRenderer::new(&workspace, "acme", chrono::Utc::now());
//! renderer.export(
//!     std::path::Path::new("exports_site"),
//!     &download::Materializer::new(),
//!     &mut report,
//! );
//! println!("{}", report.export_summary(workspace.user_count()));
//! ```
//!
//! # Modules
//!
//! - [`parser`]: JSON parsing and type definitions for export records
//! - [`store`]: merge/dedup store holding the merged workspace
//! - [`archive`]: zip bundle reading
//! - [`download`]: attachment materialization
//! - [`links`]: message markup resolution
//! - [`renderer`]: HTML page generation
//! - [`report`]: run statistics and non-fatal error collection

#![deny(missing_docs)]

pub mod archive;
pub mod download;
pub mod links;
pub mod parser;
pub mod renderer;
pub mod report;
pub mod store;
