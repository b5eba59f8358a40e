// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! In-memory merge/dedup store for ingested export data.
//!
//! Slack workspaces are commonly exported more than once, with later zips
//! overlapping earlier ones. The [`Workspace`] reconciles all bundles into a
//! single dataset with a last-write-wins policy: a record re-defining an
//! existing id (or, for messages, an existing timestamp key within the same
//! channel) replaces the earlier record entirely. Combined with a
//! deterministic bundle processing order this converges to one consistent
//! timeline no matter how many times a message was re-exported.
//!
//! Ingestion is single-phase and strictly precedes rendering, so the store
//! is mutated only while bundles load and is read-only afterwards.

use crate::parser::{Channel, Message, User};
use std::collections::{BTreeMap, HashMap};

/// The merged view of every ingested bundle.
///
/// Messages are keyed by channel *name* (the bundle directory name), while
/// users and channels are keyed by id. Per-channel messages live in a
/// `BTreeMap` so iteration order is already the canonical chronological
/// order of the rendered page.
#[derive(Debug, Default)]
pub struct Workspace {
    users: HashMap<String, User>,
    channels: HashMap<String, Channel>,
    messages: HashMap<String, BTreeMap<u64, Message>>,
}

impl Workspace {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub fn put_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Inserts or replaces a channel.
    pub fn put_channel(&mut self, channel: Channel) {
        self.channels.insert(channel.id.clone(), channel);
    }

    /// Inserts or replaces a message under its channel name.
    ///
    /// A message with the same timestamp key as an earlier one replaces it
    /// entirely; fields are never merged.
    pub fn put_message(&mut self, channel_name: &str, message: Message) {
        self.messages
            .entry(channel_name.to_owned())
            .or_default()
            .insert(message.key, message);
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    /// Looks up a channel by id.
    #[must_use]
    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels.get(id)
    }

    /// Resolves a channel id to its name.
    #[must_use]
    pub fn channel_name(&self, id: &str) -> Option<&str> {
        self.channels.get(id).map(|c| c.name.as_str())
    }

    /// Number of distinct users ingested.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// All channels, ordered for the site index: live channels first,
    /// archived ones after, alphabetical by name within each bucket.
    #[must_use]
    pub fn sorted_channels(&self) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> = self.channels.values().collect();
        channels.sort_by(|a, b| {
            a.is_archived
                .cmp(&b.is_archived)
                .then_with(|| a.name.cmp(&b.name))
        });
        channels
    }

    /// A channel's messages in ascending timestamp-key order.
    ///
    /// Channels that appear in `channels.json` but carried no message
    /// directories yield an empty iterator.
    pub fn messages_of(&self, channel_name: &str) -> impl Iterator<Item = &Message> {
        self.messages
            .get(channel_name)
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// Number of unique messages in a channel (distinct timestamp keys).
    #[must_use]
    pub fn message_count(&self, channel_name: &str) -> usize {
        self.messages.get(channel_name).map_or(0, BTreeMap::len)
    }
}
