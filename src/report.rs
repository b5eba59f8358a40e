// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Run-scoped statistics and non-fatal error collection.
//!
//! Nothing in the pipeline aborts on a bad bundle, a malformed batch file,
//! or a failed download: the offending unit is skipped, a human-readable
//! line lands in the appropriate error list, and processing continues. The
//! [`Report`] travels through ingestion and rendering by mutable reference
//! and is printed once at the end of the run.

/// Counters and error lists for one conversion run.
#[derive(Debug, Default)]
pub struct Report {
    /// Zip bundles successfully opened.
    pub bundles: u32,
    /// User records ingested (including re-exported duplicates).
    pub users: u32,
    /// Channel records ingested (including re-exported duplicates).
    pub channels: u32,
    /// Message batch files ingested.
    pub message_files: u32,
    /// Message records ingested (including re-exported duplicates).
    pub messages: u32,
    /// Channels written to the output tree.
    pub exported_channels: u32,
    /// Unique messages written to the output tree.
    pub exported_messages: u32,
    /// Live attachments referenced by exported messages.
    pub attachments: u32,
    /// Attachments actually downloaded (not already on disk).
    pub attachments_downloaded: u32,

    /// Non-fatal errors from the ingestion phase.
    pub ingest_errors: Vec<String>,
    /// Non-fatal errors and warnings from the rendering phase.
    pub render_errors: Vec<String>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an ingestion-phase error.
    pub fn ingest_error(&mut self, message: impl Into<String>) {
        self.ingest_errors.push(message.into());
    }

    /// Records a rendering-phase error or warning.
    pub fn render_error(&mut self, message: impl Into<String>) {
        self.render_errors.push(message.into());
    }

    /// One-line summary of the ingestion phase.
    #[must_use]
    pub fn ingest_summary(&self) -> String {
        format!(
            "imported {} users, {} channels, {} messages from {} message files from {} zip files",
            self.users, self.channels, self.messages, self.message_files, self.bundles
        )
    }

    /// One-line summary of the export phase.
    #[must_use]
    pub fn export_summary(&self, unique_users: usize) -> String {
        format!(
            "exported {} unique messages with {} attachments ({} newly downloaded) \
             from {} unique users in {} channels",
            self.exported_messages,
            self.attachments,
            self.attachments_downloaded,
            unique_users,
            self.exported_channels
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_include_counts() {
        let mut report = Report::new();
        report.bundles = 2;
        report.users = 5;
        report.channels = 3;
        report.message_files = 4;
        report.messages = 40;
        report.exported_channels = 3;
        report.exported_messages = 38;
        report.attachments = 6;
        report.attachments_downloaded = 2;

        let ingest = report.ingest_summary();
        assert!(ingest.contains("5 users"));
        assert!(ingest.contains("40 messages"));
        assert!(ingest.contains("2 zip files"));

        let export = report.export_summary(5);
        assert!(export.contains("38 unique messages"));
        assert!(export.contains("6 attachments (2 newly downloaded)"));
    }

    #[test]
    fn errors_accumulate_in_order() {
        let mut report = Report::new();
        report.ingest_error("first");
        report.ingest_error("second");
        report.render_error("third");

        assert_eq!(report.ingest_errors, ["first", "second"]);
        assert_eq!(report.render_errors, ["third"]);
    }
}
