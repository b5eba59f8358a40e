// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for bundle ingestion and site rendering.

use slack2html::download::Materializer;
use slack2html::renderer::SiteRenderer;
use slack2html::report::Report;
use slack2html::store::Workspace;
use slack2html::{archive, download, parser};
use std::io::Write;
use std::path::Path;

fn write_bundle(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn render_now() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_733_356_800, 0).unwrap()
}

const USERS: &str = r#"[{
    "id": "U1",
    "profile": { "display_name": "Alice", "real_name": "Alice Adams" }
}]"#;

const CHANNELS: &str = r#"[
    { "id": "C1", "name": "general", "is_archived": false },
    { "id": "C2", "name": "random", "is_archived": false },
    { "id": "C3", "name": "attic", "is_archived": true }
]"#;

/// Overlapping bundles converge to the last bundle's message, rendered once.
#[test]
fn overlapping_bundles_merge_to_single_edited_message() {
    let input = tempfile::tempdir().unwrap();
    write_bundle(
        &input.path().join("a.zip"),
        &[
            ("users.json", USERS),
            ("channels.json", CHANNELS),
            (
                "general/batch.json",
                r#"[{ "ts": "1000.000001", "text": "hello <@U1>", "user": "U1" }]"#,
            ),
        ],
    );
    write_bundle(
        &input.path().join("b.zip"),
        &[(
            "general/batch.json",
            r#"[{ "ts": "1000.000001", "text": "hello <@U1> edited", "user": "U1" }]"#,
        )],
    );

    let mut workspace = Workspace::new();
    let mut report = Report::new();
    archive::ingest_dir(input.path(), &mut workspace, &mut report);

    let out = tempfile::tempdir().unwrap();
    let renderer = SiteRenderer::new(&workspace, "acme", render_now());
    renderer.export(out.path(), &Materializer::new(), &mut report);

    let page = std::fs::read_to_string(out.path().join("general/index.html")).unwrap();
    assert_eq!(page.matches("hello (Alice) edited").count(), 1);
    assert!(!page.contains("hello (Alice)</div>"), "old text replaced");

    assert_eq!(report.messages, 2, "both exports counted as ingested");
    assert_eq!(report.exported_messages, 1, "but only one unique message");
}

/// An in-text file link consumes the attachment; no trailing duplicate.
#[test]
fn file_link_token_consumes_attachment() {
    let input = tempfile::tempdir().unwrap();
    write_bundle(
        &input.path().join("export.zip"),
        &[
            ("users.json", USERS),
            ("channels.json", CHANNELS),
            (
                "general/batch.json",
                r#"[{
                    "ts": "1733356800.000100",
                    "text": "<https://acme.slack.com/files/T1/F1/report.pdf|report.pdf>",
                    "user": "U1",
                    "files": [{
                        "id": "F1",
                        "name": "report.pdf",
                        "url_private_download": "http://unresolvable.invalid/report.pdf"
                    }]
                }]"#,
            ),
        ],
    );

    let mut workspace = Workspace::new();
    let mut report = Report::new();
    archive::ingest_dir(input.path(), &mut workspace, &mut report);

    // Pre-materialize the attachment so rendering never hits the network.
    let out = tempfile::tempdir().unwrap();
    let channel_dir = out.path().join("general");
    std::fs::create_dir_all(&channel_dir).unwrap();
    let file = &workspace.messages_of("general").next().unwrap().files[0];
    let local = download::destination_name(1_733_356_800, file);
    std::fs::write(channel_dir.join(&local), b"pdf bytes").unwrap();

    let renderer = SiteRenderer::new(&workspace, "acme", render_now());
    renderer.export(out.path(), &Materializer::new(), &mut report);

    let page = std::fs::read_to_string(out.path().join("general/index.html")).unwrap();
    assert_eq!(
        page.matches("class=\"link file\"").count(),
        1,
        "exactly one download link for report.pdf"
    );
    assert!(page.contains(">report.pdf</a>"));
    assert!(!page.contains("<span class=\"files\">"));
    assert_eq!(report.attachments, 1);
    assert_eq!(report.attachments_downloaded, 0);
}

/// Cross-channel archive URLs rewrite to relative links with readable labels.
#[test]
fn cross_channel_link_rewrites_to_relative_href() {
    let input = tempfile::tempdir().unwrap();
    write_bundle(
        &input.path().join("export.zip"),
        &[
            ("users.json", USERS),
            ("channels.json", CHANNELS),
            (
                "general/batch.json",
                r#"[{
                    "ts": "1000.000001",
                    "text": "see <https://acme.slack.com/archives/C2/p555>",
                    "user": "U1"
                }]"#,
            ),
        ],
    );

    let mut workspace = Workspace::new();
    let mut report = Report::new();
    archive::ingest_dir(input.path(), &mut workspace, &mut report);

    let out = tempfile::tempdir().unwrap();
    let renderer = SiteRenderer::new(&workspace, "acme", render_now());
    renderer.export(out.path(), &Materializer::new(), &mut report);

    let page = std::fs::read_to_string(out.path().join("general/index.html")).unwrap();
    assert!(page.contains("href=\"../random/index.html#p555\""));
    assert!(page.contains(">post in random</a>"));
}

/// The `!everyone` sentinel renders as mention text with no link markup.
#[test]
fn everyone_sentinel_renders_as_mention_text() {
    let input = tempfile::tempdir().unwrap();
    write_bundle(
        &input.path().join("export.zip"),
        &[
            ("users.json", USERS),
            ("channels.json", CHANNELS),
            (
                "general/batch.json",
                r#"[{ "ts": "1000.000001", "text": "<!everyone> heads up", "user": "U1" }]"#,
            ),
        ],
    );

    let mut workspace = Workspace::new();
    let mut report = Report::new();
    archive::ingest_dir(input.path(), &mut workspace, &mut report);

    let out = tempfile::tempdir().unwrap();
    let renderer = SiteRenderer::new(&workspace, "acme", render_now());
    renderer.export(out.path(), &Materializer::new(), &mut report);

    let page = std::fs::read_to_string(out.path().join("general/index.html")).unwrap();
    assert!(page.contains("(@all) heads up"));
    assert!(!page.contains("<a href=\"!everyone\""));
}

/// A deleted file (no download URL) never appears in the output.
#[test]
fn deleted_attachment_is_excluded_entirely() {
    let input = tempfile::tempdir().unwrap();
    write_bundle(
        &input.path().join("export.zip"),
        &[
            ("users.json", USERS),
            ("channels.json", CHANNELS),
            (
                "general/batch.json",
                r#"[{
                    "ts": "1000.000001",
                    "text": "it was here once",
                    "user": "U1",
                    "files": [{ "id": "F9", "name": "gone.txt" }]
                }]"#,
            ),
        ],
    );

    let mut workspace = Workspace::new();
    let mut report = Report::new();
    archive::ingest_dir(input.path(), &mut workspace, &mut report);

    let out = tempfile::tempdir().unwrap();
    let renderer = SiteRenderer::new(&workspace, "acme", render_now());
    renderer.export(out.path(), &Materializer::new(), &mut report);

    let page = std::fs::read_to_string(out.path().join("general/index.html")).unwrap();
    assert!(!page.contains("gone.txt"));
    assert_eq!(report.attachments, 0);
    assert!(report.render_errors.is_empty());
}

/// The site index lists archived channels after live ones.
#[test]
fn index_sorts_archived_channels_last() {
    let input = tempfile::tempdir().unwrap();
    write_bundle(
        &input.path().join("export.zip"),
        &[("users.json", USERS), ("channels.json", CHANNELS)],
    );

    let mut workspace = Workspace::new();
    let mut report = Report::new();
    archive::ingest_dir(input.path(), &mut workspace, &mut report);

    let out = tempfile::tempdir().unwrap();
    let renderer = SiteRenderer::new(&workspace, "acme", render_now());
    renderer.export(out.path(), &Materializer::new(), &mut report);

    let index = std::fs::read_to_string(out.path().join("index.html")).unwrap();
    let general = index.find("general/index.html").unwrap();
    let random = index.find("random/index.html").unwrap();
    let attic = index.find("attic/index.html").unwrap();

    // "attic" sorts first alphabetically but last by archival status.
    assert!(general < random);
    assert!(random < attic);
    assert!(index.contains("attic</a> [archived]"));
}

/// A malformed bundle is reported but does not stop the run.
#[test]
fn malformed_bundle_is_nonfatal() {
    let input = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("broken.zip"), b"not a zip").unwrap();
    write_bundle(
        &input.path().join("good.zip"),
        &[
            ("users.json", USERS),
            ("channels.json", CHANNELS),
            (
                "general/batch.json",
                r#"[{ "ts": "1000.000001", "text": "still here", "user": "U1" }]"#,
            ),
        ],
    );

    let mut workspace = Workspace::new();
    let mut report = Report::new();
    archive::ingest_dir(input.path(), &mut workspace, &mut report);

    assert_eq!(report.bundles, 1);
    assert_eq!(report.ingest_errors.len(), 1);
    assert!(report.ingest_errors[0].contains("broken.zip"));
    assert_eq!(workspace.message_count("general"), 1);

    // The summary reflects both the failure and the surviving data.
    assert!(report.ingest_summary().contains("1 zip files"));
}

/// Resolution leaves token-free message text untouched.
#[test]
fn plain_message_text_round_trips() {
    let messages =
        parser::parse_messages(r#"[{ "ts": "1000.000001", "text": "no markup at all", "user": "U1" }]"#)
            .unwrap();

    let mut workspace = Workspace::new();
    workspace.put_message("general", messages[0].clone());
    workspace.put_channel(parser::parse_channels(CHANNELS).unwrap().remove(0));
    for user in parser::parse_users(USERS).unwrap() {
        workspace.put_user(user);
    }

    let dir = tempfile::tempdir().unwrap();
    let mut report = Report::new();
    let renderer = SiteRenderer::new(&workspace, "acme", render_now());
    let page = renderer.render_channel_page("general", dir.path(), &Materializer::new(), &mut report);

    assert!(page.contains(">no markup at all</div>"));
}
