// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! HTML rendering of the merged workspace into the output tree.
//!
//! Rendering is strictly staged after ingestion and walks the store
//! read-only: one directory per channel with an `index.html` and that
//! channel's downloaded attachments, plus a top-level channel index and the
//! static assets.
//!
//! # Output Format
//!
//! A channel page is a flat list with one entry per message: an anchored
//! time label, the author, the resolved message text, and any attachments
//! not already linked from within the text. The channel index lists live
//! channels first and archived ones after, alphabetically within each
//! group.
//!
//! Output failures follow the same policy as ingestion: record the error in
//! the report and keep going with the remaining pages.

use crate::download::{self, Materializer};
use crate::links::{self, LinkContext};
use crate::parser::Message;
use crate::report::Report;
use crate::store::Workspace;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

const STYLE_FILENAME: &str = "style.css";
const SCRIPT_FILENAME: &str = "script.js";
const INDEX: &str = "index.html";

const STYLE: &str = include_str!("assets/style.css");
const SCRIPT: &str = include_str!("assets/script.js");

/// Renders the merged store as a static site.
pub struct SiteRenderer<'a> {
    workspace: &'a Workspace,
    host: &'a str,
    /// Query parameter appended to asset references so browsers do not
    /// serve a stale stylesheet/script across re-runs.
    uncache: String,
    generated: String,
}

impl<'a> SiteRenderer<'a> {
    /// Creates a renderer for one run.
    ///
    /// `host` is the workspace subdomain; `now` stamps the generated pages
    /// and derives the asset uncache parameter.
    #[must_use]
    pub fn new(workspace: &'a Workspace, host: &'a str, now: DateTime<Utc>) -> Self {
        Self {
            workspace,
            host,
            uncache: format!("?v=ts{}", now.timestamp_millis()),
            generated: now.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
        }
    }

    /// Writes the whole site below `out_dir`: channel directories, the
    /// channel index, and the static assets.
    pub fn export(&self, out_dir: &Path, materializer: &Materializer, report: &mut Report) {
        let mut index = String::new();
        self.page_header(&mut index, None, 0, Some("main"));
        append_title(
            &mut index,
            &format!("Channels in <span>{}</span>", links::escape_html(self.host)),
        );
        index.push_str("<ul>");

        for channel in self.workspace.sorted_channels() {
            write!(
                index,
                "<li><a href=\"{name}/{INDEX}\">{name}</a>",
                name = links::escape_html(&channel.name)
            )
            .unwrap();
            if channel.is_archived {
                index.push_str(" [archived]");
            }
            index.push_str("</li>");

            let dir = out_dir.join(&channel.name);
            if let Err(e) = std::fs::create_dir_all(&dir) {
                report.render_error(format!("could not create '{}': {e}", dir.display()));
                continue;
            }

            let page = self.render_channel_page(&channel.name, &dir, materializer, report);
            write_page(&dir.join(INDEX), &page, report);
            report.exported_channels += 1;
        }

        index.push_str("</ul>");
        append_footer(&mut index);
        write_page(&out_dir.join(INDEX), &index, report);

        write_page(&out_dir.join(STYLE_FILENAME), STYLE, report);
        write_page(&out_dir.join(SCRIPT_FILENAME), SCRIPT, report);
    }

    /// Renders one channel's page, materializing its attachments into `dir`.
    #[must_use]
    pub fn render_channel_page(
        &self,
        channel_name: &str,
        dir: &Path,
        materializer: &Materializer,
        report: &mut Report,
    ) -> String {
        let mut page = String::new();
        self.page_header(&mut page, Some(channel_name), 1, None);
        page.push_str("<a class=\"back\" href=\"../index.html\">&#11014;</a>");
        page.push_str("<a class=\"files\">&#128450;</a>");
        page.push_str("<a class=\"imgs\">&#128444;</a>");
        append_title(
            &mut page,
            &format!("Channel <span>{}</span>", links::escape_html(channel_name)),
        );
        page.push_str("<ul>");

        for message in self.workspace.messages_of(channel_name) {
            self.render_message(&mut page, message, dir, materializer, report);
            report.exported_messages += 1;
        }

        page.push_str("</ul>");
        append_footer(&mut page);
        page
    }

    fn render_message(
        &self,
        out: &mut String,
        message: &Message,
        dir: &Path,
        materializer: &Materializer,
        report: &mut Report,
    ) {
        // Deleted files (no URL) are excluded outright; live ones are
        // materialized and mapped so in-text file links can consume them.
        let mut local_files: HashMap<String, String> = HashMap::new();
        for file in &message.files {
            let Some(url) = &file.url else { continue };
            report.attachments += 1;

            let local_name = download::destination_name(message.seconds(), file);
            match materializer.ensure(url, &dir.join(&local_name)) {
                Ok(downloaded) => {
                    if downloaded {
                        report.attachments_downloaded += 1;
                    }
                    local_files.insert(file.id.clone(), local_name);
                }
                Err(e) => report.render_error(e.to_string()),
            }
        }

        let ctx = LinkContext {
            host: self.host,
            workspace: self.workspace,
            files: &local_files,
        };
        let resolved = links::resolve_text(&message.text, &ctx);
        for id in &resolved.consumed {
            local_files.remove(id);
        }

        out.push_str("<li>");
        write!(
            out,
            "<span name=\"p{}\" class=\"date\">{}</span>",
            message.key,
            format_time(message.seconds()),
        )
        .unwrap();
        write!(
            out,
            "<span class=\"user\">{}</span>",
            links::escape_html(self.author_label(message, report)),
        )
        .unwrap();
        write!(out, "<div class=\"msg\">{}</div>", resolved.html).unwrap();

        // Attachments not consumed by an in-text link, in export order.
        if !local_files.is_empty() {
            out.push_str("<span class=\"files\">");
            for file in &message.files {
                if let Some(local_name) = local_files.get(&file.id) {
                    out.push_str(&links::file_link(local_name, &file.name));
                }
            }
            out.push_str("</span>");
        }
        out.push_str("</li>");
    }

    /// The author name for a message, or a placeholder when the user index
    /// has no entry for its author id.
    fn author_label<'m>(&'m self, message: &Message, report: &mut Report) -> &'m str {
        match self.workspace.user(&message.user) {
            Some(user) => user.label(),
            None => {
                report.render_error(format!(
                    "message {} references unknown user '{}'",
                    message.ts, message.user
                ));
                "(unknown user)"
            }
        }
    }

    fn page_header(&self, out: &mut String, title: Option<&str>, depth: usize, body_class: Option<&str>) {
        let trav = "../".repeat(depth);
        let host = links::escape_html(self.host);
        out.push_str("<!doctype html><html><head><meta charset=\"UTF-8\"/>");
        out.push_str("<meta name=\"generator\" content=\"slack2html\"/>");
        write!(out, "<meta name=\"date\" content=\"{}\">", self.generated).unwrap();
        match title {
            Some(t) => write!(out, "<title>{host} / {}</title>", links::escape_html(t)).unwrap(),
            None => write!(out, "<title>{host}</title>").unwrap(),
        }
        write!(
            out,
            "<link rel=\"stylesheet\" type=\"text/css\" href=\"{trav}{STYLE_FILENAME}{}\">",
            self.uncache
        )
        .unwrap();
        write!(
            out,
            "<script type=\"text/javascript\" src=\"{trav}{SCRIPT_FILENAME}{}\"></script>",
            self.uncache
        )
        .unwrap();
        out.push_str("</head>");
        match body_class {
            Some(class) => write!(out, "<body class=\"{class}\">").unwrap(),
            None => out.push_str("<body>"),
        }
    }
}

fn append_title(out: &mut String, title: &str) {
    write!(out, "<div class=\"title\">{title}</div>").unwrap();
}

fn append_footer(out: &mut String) {
    out.push_str("</body></html>");
}

fn format_time(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

fn write_page(path: &Path, content: &str, report: &mut Report) {
    if let Err(e) = std::fs::write(path, content) {
        report.render_error(format!("could not write '{}': {e}", path.display()));
    }
}
