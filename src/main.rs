// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for slack2html.
//!
//! This binary provides the `slack2html` command for converting a directory
//! of Slack export zips into a static HTML site.

use lexopt::prelude::*;
use slack2html::{archive, download, renderer, report::Report, store::Workspace};
use snafu::{ensure, prelude::*};
use std::path::{Path, PathBuf};
use std::time::Instant;

struct Cli {
    /// The workspace subdomain (the "acme" in acme.slack.com).
    host: String,
    input: PathBuf,
    output: Option<PathBuf>,
    quiet: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("input directory '{}' does not exist", path.display()))]
    InputDirMissing { path: PathBuf },

    #[snafu(display("'{}' is not a directory", path.display()))]
    NotADirectory { path: PathBuf },

    #[snafu(display("'{}' contains no .zip files", path.display()))]
    NoBundles { path: PathBuf },

    #[snafu(display("a file is in the way of the output directory '{}'", path.display()))]
    OutputDirBlocked { path: PathBuf },

    #[snafu(display("failed to create output directory '{}': {source}", path.display()))]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert Slack export zips to a browsable static HTML archive

Usage: {name} [OPTIONS] <WORKSPACE-ID> <INPUT>

Arguments:
  <WORKSPACE-ID>  The xxx part of your xxx.slack.com
  <INPUT>         Directory containing the export .zip files

Options:
  -o, --output <OUTPUT>  Output directory (default: <INPUT>_export)
  -q, --quiet            Suppress progress messages
  -h, --help             Print help
  -V, --version          Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut positional: Vec<String> = Vec::new();
    let mut output: Option<PathBuf> = None;
    let mut quiet = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => output = Some(parser.value()?.parse()?),
            Short('q') | Long("quiet") => quiet = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => positional.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    let mut positional = positional.into_iter();
    let host = positional
        .next()
        .ok_or("missing required argument: workspace id")?;
    let input: PathBuf = positional
        .next()
        .ok_or("missing required argument: input directory")?
        .into();
    if positional.next().is_some() {
        return Err("too many arguments".into());
    }

    Ok(Cli {
        host,
        input,
        output,
        quiet,
    })
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;

    ensure!(
        cli.input.exists(),
        InputDirMissingSnafu { path: &cli.input }
    );
    ensure!(cli.input.is_dir(), NotADirectorySnafu { path: &cli.input });
    ensure!(
        !archive::collect_bundles(&cli.input).is_empty(),
        NoBundlesSnafu { path: &cli.input }
    );

    let out_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(&cli.input));
    ensure!(
        !out_dir.is_file(),
        OutputDirBlockedSnafu { path: &out_dir }
    );
    std::fs::create_dir_all(&out_dir).context(CreateOutputDirSnafu { path: &out_dir })?;

    if !cli.quiet {
        eprintln!(
            "importing data for '{}' from '{}', exporting to '{}'",
            cli.host,
            cli.input.display(),
            out_dir.display()
        );
    }

    let mut workspace = Workspace::new();
    let mut report = Report::new();

    let start = Instant::now();
    archive::ingest_dir(&cli.input, &mut workspace, &mut report);
    println!(
        " * {} in {}ms",
        report.ingest_summary(),
        start.elapsed().as_millis()
    );
    print_errors(&report.ingest_errors);

    let start = Instant::now();
    let renderer = renderer::SiteRenderer::new(&workspace, &cli.host, chrono::Utc::now());
    renderer.export(&out_dir, &download::Materializer::new(), &mut report);
    println!(
        " * {} in {}ms",
        report.export_summary(workspace.user_count()),
        start.elapsed().as_millis()
    );
    print_errors(&report.render_errors);

    if !cli.quiet {
        eprintln!("done.");
    }
    Ok(())
}

/// Default output directory: a sibling of the input named `<input>_export`.
fn default_output_dir(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "slack".into(), |n| n.to_string_lossy().into_owned());
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{name}_export"))
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!("but there were {} error(s):", errors.len());
    for error in errors {
        println!("- {error}");
    }
}
