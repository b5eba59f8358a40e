// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Reading Slack export zip bundles into the [`Workspace`] store.
//!
//! A bundle's layout is fixed: `users.json` and `channels.json` at the top
//! level, plus one directory per channel whose `.json` files each hold one
//! batch of messages. Every other entry is ignored.
//!
//! All failures here are non-fatal. A bundle that cannot be opened, an
//! entry that cannot be read, or a batch that is not valid JSON produces
//! one line in the report's ingest errors and processing moves on to the
//! next entry or bundle.

use crate::parser;
use crate::report::Report;
use crate::store::Workspace;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects the `.zip` bundles directly inside `dir`, sorted by filename.
///
/// The sort fixes the merge order: when bundles overlap, the overwrite
/// policy of the store makes the lexicographically last bundle win, rather
/// than whatever order the filesystem happens to enumerate.
#[must_use]
pub fn collect_bundles(dir: &Path) -> Vec<PathBuf> {
    let mut bundles: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "zip"))
        .map(|e| e.path().to_path_buf())
        .collect();
    bundles.sort();
    bundles
}

/// Ingests every bundle in `dir` in deterministic order.
pub fn ingest_dir(dir: &Path, workspace: &mut Workspace, report: &mut Report) {
    for bundle in collect_bundles(dir) {
        ingest_bundle(&bundle, workspace, report);
    }
}

/// Ingests one zip bundle into the store.
pub fn ingest_bundle(path: &Path, workspace: &mut Workspace, report: &mut Report) {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            report.ingest_error(format!("could not open '{}': {e}", path.display()));
            return;
        }
    };

    let mut archive = match zip::ZipArchive::new(file) {
        Ok(a) => a,
        Err(e) => {
            report.ingest_error(format!("could not read '{}' as zip: {e}", path.display()));
            return;
        }
    };

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(e) => e,
            Err(e) => {
                report.ingest_error(format!("could not access entry in '{}': {e}", path.display()));
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_owned();
        if !name.ends_with(".json") {
            continue;
        }

        let mut content = String::new();
        if let Err(e) = entry.read_to_string(&mut content) {
            report.ingest_error(format!("could not read '{name}' in '{}': {e}", path.display()));
            continue;
        }

        route_entry(&name, &content, workspace, report);
    }

    report.bundles += 1;
}

/// Routes one JSON entry by its path inside the bundle.
fn route_entry(name: &str, content: &str, workspace: &mut Workspace, report: &mut Report) {
    match name.split('/').collect::<Vec<_>>().as_slice() {
        ["users.json"] => ingest_users(name, content, workspace, report),
        ["channels.json"] => ingest_channels(name, content, workspace, report),
        [channel, _batch] => ingest_batch(channel, name, content, workspace, report),
        // Deeper nesting is not part of the export layout.
        _ => {}
    }
}

fn ingest_users(name: &str, content: &str, workspace: &mut Workspace, report: &mut Report) {
    match parser::parse_users(content) {
        Ok(users) => {
            for user in users {
                if user.id.is_empty() {
                    report.ingest_error(format!("user record without id in '{name}'"));
                    continue;
                }
                workspace.put_user(user);
                report.users += 1;
            }
        }
        Err(e) => report.ingest_error(format!("could not process '{name}': {e}")),
    }
}

fn ingest_channels(name: &str, content: &str, workspace: &mut Workspace, report: &mut Report) {
    match parser::parse_channels(content) {
        Ok(channels) => {
            for channel in channels {
                if channel.id.is_empty() || channel.name.is_empty() {
                    report.ingest_error(format!("channel record without id or name in '{name}'"));
                    continue;
                }
                workspace.put_channel(channel);
                report.channels += 1;
            }
        }
        Err(e) => report.ingest_error(format!("could not process '{name}': {e}")),
    }
}

fn ingest_batch(
    channel: &str,
    name: &str,
    content: &str,
    workspace: &mut Workspace,
    report: &mut Report,
) {
    match parser::parse_messages(content) {
        Ok(messages) => {
            for message in messages {
                if parser::timestamp_key(&message.ts).is_none() {
                    report.ingest_error(format!("message without usable ts in '{name}'"));
                    continue;
                }
                workspace.put_message(channel, message);
                report.messages += 1;
            }
            report.message_files += 1;
        }
        Err(e) => report.ingest_error(format!("could not process '{name}': {e}")),
    }
}
