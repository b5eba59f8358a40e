// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Materializing remotely referenced attachments as local files.
//!
//! Each live file reference is downloaded at most once: presence of the
//! destination file on disk is the sole deduplication mechanism, so re-runs
//! over the same output tree skip everything already fetched. Content is
//! never inspected or re-verified.
//!
//! A failed download never aborts the run; the caller records the error and
//! renders the message without the attachment link.

use crate::parser::FileRef;
use chrono::DateTime;
use snafu::prelude::*;
use std::fs::File;
use std::path::Path;

/// Error type for attachment materialization failures.
#[derive(Debug, Snafu)]
pub enum DownloadError {
    /// The HTTP request failed or returned a non-success status.
    #[snafu(display("failed to download '{url}': {source}"))]
    Request {
        /// The URL that was being fetched.
        url: String,
        /// The underlying HTTP error.
        source: reqwest::Error,
    },

    /// Writing the downloaded content to disk failed.
    #[snafu(display("failed to write '{}': {source}", path.display()))]
    Write {
        /// The destination path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Downloads attachments with filesystem-presence idempotency.
pub struct Materializer {
    client: reqwest::blocking::Client,
}

impl Materializer {
    /// Creates a materializer with a default blocking HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Ensures a local copy of `url` exists at `dest`.
    ///
    /// Returns `Ok(true)` when a download was performed, `Ok(false)` when
    /// the destination already existed and nothing was transferred.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, the server responds with a
    /// non-success status, or the file cannot be written. A partial file
    /// left by a failed transfer is removed so the next run retries it.
    pub fn ensure(&self, url: &str, dest: &Path) -> Result<bool, DownloadError> {
        if dest.exists() {
            return Ok(false);
        }

        let result = self.fetch(url, dest);
        if result.is_err() && dest.exists() {
            let _ = std::fs::remove_file(dest);
        }
        result.map(|()| true)
    }

    fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .context(RequestSnafu { url })?;

        let mut file = File::create(dest).context(WriteSnafu { path: dest })?;
        response
            .copy_to(&mut file)
            .context(RequestSnafu { url })?;
        Ok(())
    }
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new()
    }
}

/// The local filename for an attachment.
///
/// Prefixed with the referencing message's timestamp and the file id so the
/// same filename attached to different messages never collides:
/// `2024-12-05_00-00-00_F1_report.pdf`.
#[must_use]
pub fn destination_name(message_seconds: i64, file: &FileRef) -> String {
    let date = DateTime::from_timestamp(message_seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d_%H-%M-%S").to_string())
        .unwrap_or_else(|| message_seconds.to_string());
    format!("{date}_{}_{}", file.id, file.name)
}
