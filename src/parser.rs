// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON parsing for Slack export bundles.
//!
//! This module handles deserialization of the JSON collections found inside
//! a Slack export zip: a flat `users.json`, a flat `channels.json`, and one
//! directory per channel holding message batch files.
//!
//! # Format Overview
//!
//! Slack exports are loosely structured: records carry many optional fields
//! and the schema has drifted over the years. Parsing is therefore tolerant —
//! each entity pulls the handful of fields rendering needs out of a raw
//! [`serde_json::Value`] and ignores everything else. A record missing its
//! identity field deserializes with an empty id and is skipped by the caller.
//!
//! # Example
//!
//! ```
//! use slack2html::parser::parse_messages;
//!
//! let json = r#"[{ "ts": "1733356800.000100", "text": "hello", "user": "U1" }]"#;
//! let messages = parse_messages(json).unwrap();
//! assert_eq!(messages[0].key, 1_733_356_800_000_100);
//! ```

use serde::Deserialize;
use snafu::prelude::*;

/// Error type for JSON parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// A workspace member.
///
/// Only the fields rendering needs are modeled; the export carries dozens
/// more (avatars, timezone, admin flags) which are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Slack user id (e.g. "U024BE7LH").
    pub id: String,

    /// The name the user chose to display. May be empty.
    pub display_name: String,

    /// The user's real name, used when no display name is set.
    pub real_name: String,
}

impl User {
    /// The name to show for this user: display name if set, real name otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.real_name
        } else {
            &self.display_name
        }
    }
}

/// A channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Slack channel id (e.g. "C024BE91L").
    pub id: String,

    /// Channel name, which is also the bundle directory name and the
    /// output directory name for this channel.
    pub name: String,

    /// Whether the channel has been archived.
    pub is_archived: bool,
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Slack file id (e.g. "F06AB12CD").
    pub id: String,

    /// Original filename.
    pub name: String,

    /// Private download URL. `None` means the file was deleted upstream:
    /// it must never be downloaded or linked.
    pub url: Option<String>,
}

/// One message in a channel.
///
/// Messages are identified within their channel by [`Message::key`], an
/// integer derived from the export's "seconds.microseconds" timestamp
/// string. The key doubles as the chronological sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The raw timestamp string from the export (e.g. "1733356800.000100").
    pub ts: String,

    /// Timestamp with the decimal point removed; identity and sort key.
    pub key: u64,

    /// Raw message markup. Bracketed `<...>` tokens are resolved at render
    /// time; everything else is literal text.
    pub text: String,

    /// Id of the authoring user. May be empty for bot/system records.
    pub user: String,

    /// Attached files, in export order.
    pub files: Vec<FileRef>,
}

impl Message {
    /// Unix seconds of this message, from the part before the dot.
    #[must_use]
    pub fn seconds(&self) -> i64 {
        self.ts
            .split('.')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }
}

/// Derives the integer identity key from a "seconds.microseconds" string.
///
/// Returns `None` when the string does not reduce to digits, which marks
/// the record as malformed.
#[must_use]
pub fn timestamp_key(ts: &str) -> Option<u64> {
    ts.replace('.', "").parse().ok()
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        Ok(Self {
            id: get_string(&value, &["id"]).unwrap_or_default(),
            display_name: get_string(&value, &["profile", "display_name"]).unwrap_or_default(),
            real_name: get_string(&value, &["profile", "real_name"]).unwrap_or_default(),
        })
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        Ok(Self {
            id: get_string(&value, &["id"]).unwrap_or_default(),
            name: get_string(&value, &["name"]).unwrap_or_default(),
            is_archived: value
                .get("is_archived")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
        })
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;

        let ts = get_string(&value, &["ts"]).unwrap_or_default();
        let key = timestamp_key(&ts).unwrap_or(0);

        let files = value
            .get("files")
            .and_then(serde_json::Value::as_array)
            .map(|fs| fs.iter().map(file_ref).collect())
            .unwrap_or_default();

        Ok(Self {
            ts,
            key,
            text: get_string(&value, &["text"]).unwrap_or_default(),
            user: get_string(&value, &["user"]).unwrap_or_default(),
            files,
        })
    }
}

fn file_ref(value: &serde_json::Value) -> FileRef {
    FileRef {
        id: get_string(value, &["id"]).unwrap_or_default(),
        name: get_string(value, &["name"]).unwrap_or_default(),
        url: get_string(value, &["url_private_download"]),
    }
}

/// Navigates a JSON path and returns the string value at the end.
fn get_str<'a>(value: &'a serde_json::Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str()
}

/// Like [`get_str`] but returns an owned `String`.
fn get_string(value: &serde_json::Value, path: &[&str]) -> Option<String> {
    get_str(value, path).map(str::to_owned)
}

/// Parses a `users.json` collection.
///
/// # Errors
///
/// Returns an error if the content is not a JSON array.
pub fn parse_users(json_str: &str) -> Result<Vec<User>, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

/// Parses a `channels.json` collection.
///
/// # Errors
///
/// Returns an error if the content is not a JSON array.
pub fn parse_channels(json_str: &str) -> Result<Vec<Channel>, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

/// Parses one message batch file.
///
/// # Errors
///
/// Returns an error if the content is not a JSON array.
pub fn parse_messages(json_str: &str) -> Result<Vec<Message>, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}
