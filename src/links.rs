// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Resolution of Slack message markup into HTML.
//!
//! Message text interleaves literal runs with bracketed tokens of the form
//! `<target>` or `<target|label>`. Literal runs pass through verbatim apart
//! from HTML escaping; each token is classified and rewritten, in this
//! precedence order:
//!
//! 1. A URL under the workspace's own `/files/` path becomes a link to the
//!    locally materialized attachment, and the file id is marked consumed
//!    so the renderer does not list the attachment a second time. With no
//!    matching attachment the token degrades to plain text.
//! 2. A URL under the workspace's own `/archives/` path becomes a relative
//!    cross-channel link (`../<channel>/index.html#<message>`) opened in
//!    the same window.
//! 3. Any other `http`/`https` URL becomes an external link in a new window.
//! 4. The `!channel` and `!everyone` sentinels become mention text.
//! 5. `@<id>` resolving in the user index becomes the user's name.
//! 6. `#<id>` becomes channel mention text from the token's label.
//! 7. `tel:`/`mailto:` targets keep only their label.
//! 8. Anything else passes through as escaped text; content is never dropped.

use crate::store::Workspace;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Lookup context for resolving one message's text.
pub struct LinkContext<'a> {
    /// The workspace subdomain (the "acme" in acme.slack.com), used to
    /// recognize the site's own file and archive URLs.
    pub host: &'a str,

    /// User and channel indices.
    pub workspace: &'a Workspace,

    /// This message's materialized attachments: file id to local filename.
    pub files: &'a HashMap<String, String>,
}

/// The outcome of resolving one message's text.
pub struct Resolved {
    /// The rendered HTML fragment.
    pub html: String,

    /// File ids consumed by in-text file links. The renderer drops these
    /// from the trailing attachment list.
    pub consumed: HashSet<String>,
}

/// Resolves all markup tokens in `text` against the given context.
#[must_use]
pub fn resolve_text(text: &str, ctx: &LinkContext) -> Resolved {
    let mut html = String::with_capacity(text.len());
    let mut consumed = HashSet::new();

    let mut rest = text;
    while let Some(open) = rest.find('<') {
        // No closing bracket: the rest is literal text.
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        html.push_str(&escape_html(&rest[..open]));
        let token = &rest[open + 1..open + close];
        html.push_str(&resolve_token(token, ctx, &mut consumed));
        rest = &rest[open + close + 1..];
    }
    html.push_str(&escape_html(rest));

    Resolved { html, consumed }
}

fn resolve_token(inner: &str, ctx: &LinkContext, consumed: &mut HashSet<String>) -> String {
    let (target, label) = match inner.split_once('|') {
        Some((t, l)) => (t, Some(l)),
        None => (inner, None),
    };

    if target.starts_with("http://") || target.starts_with("https://") {
        return resolve_url(target, label, ctx, consumed);
    }

    if target == "!channel" {
        return "(@channel)".to_owned();
    }
    if target == "!everyone" {
        return "(@all)".to_owned();
    }

    if let Some(id) = target.strip_prefix('@')
        && let Some(user) = ctx.workspace.user(id)
    {
        return format!("({})", escape_html(user.label()));
    }

    if let Some(rest) = target.strip_prefix('#') {
        let name = label.unwrap_or(rest);
        return format!("(channel \"{}\")", escape_html(name));
    }

    if let Some(rest) = target
        .strip_prefix("tel:")
        .or_else(|| target.strip_prefix("mailto:"))
    {
        return escape_html(label.unwrap_or(rest));
    }

    escape_html(target)
}

fn resolve_url(
    target: &str,
    label: Option<&str>,
    ctx: &LinkContext,
    consumed: &mut HashSet<String>,
) -> String {
    let files_prefix = format!("https://{}.slack.com/files/", ctx.host);
    let archives_prefix = format!("https://{}.slack.com/archives/", ctx.host);

    if target.starts_with(&files_prefix)
        && let Some((id, display)) = last_two_segments(target)
    {
        consumed.insert(id.to_owned());
        return match ctx.files.get(id) {
            Some(local) => file_link(local, display),
            // Attachment unknown (or its download failed): plain text.
            None => escape_html(display),
        };
    }

    if target.starts_with(&archives_prefix)
        && let Some((channel_id, message_id)) = last_two_segments(target)
        && let Some(channel_name) = ctx.workspace.channel_name(channel_id)
    {
        let mut html = String::new();
        write!(
            html,
            "<span class=\"link\">&rarr;<a href=\"../{}/index.html#{}\">post in {}</a></span>",
            escape_html(channel_name),
            escape_html(message_id),
            escape_html(channel_name),
        )
        .unwrap();
        return html;
    }

    // External link; an archives URL with an unknown channel id lands here.
    format!(
        "<span class=\"link\">&nearr;<a href=\"{}\" target=\"_blank\">{}</a></span>",
        escape_html(target),
        escape_html(label.unwrap_or(target)),
    )
}

/// Splits off the last two path segments of a URL: `(second_to_last, last)`.
fn last_two_segments(url: &str) -> Option<(&str, &str)> {
    let mut segments = url.rsplit('/');
    let last = segments.next()?;
    let second = segments.next()?;
    if last.is_empty() || second.is_empty() {
        return None;
    }
    Some((second, last))
}

/// An HTML link to a locally materialized attachment.
#[must_use]
pub fn file_link(local_name: &str, label: &str) -> String {
    format!(
        "<span class=\"link file\">&darr;<a href=\"{}\" target=\"_blank\">{}</a></span>",
        encode_href(local_name),
        escape_html(label),
    )
}

/// Escapes text for safe inclusion in HTML bodies and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes a filename for use as a relative href.
fn encode_href(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}
