// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lesbar — check scanned document images before sending them to OCR.
//
// Exit codes: 0 when every file passes the gate, 2 when at least one is
// rejected, 1 on usage or I/O errors.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lesbar_analysis::QualityAnalyzer;
use lesbar_core::{QualityConfig, QualityReport, Verdict};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lesbar")]
#[command(version, about = "Document image quality check for OCR pipelines", long_about = None)]
struct Cli {
    /// Image files to check
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,

    /// Print a JSON array instead of text
    #[arg(long)]
    json: bool,

    /// JSON file overriding the default thresholds and weights
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum score a file needs to pass
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(0..=100))]
    min_score: u8,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: &'a PathBuf,
    verdict: Verdict,
    report: &'a QualityReport,
}

const EXIT_OK: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_REJECTED: u8 = 2;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_failure_status(&err));
        }
    };
    init_tracing(cli.verbose);

    ExitCode::from(run_status(run(&cli)))
}

/// `--help` and `--version` are not failures; anything else clap rejects is
/// a usage error.
fn parse_failure_status(err: &clap::Error) -> u8 {
    if err.use_stderr() { EXIT_ERROR } else { EXIT_OK }
}

fn run_status(outcome: Result<bool>) -> u8 {
    match outcome {
        Ok(true) => EXIT_OK,
        Ok(false) => EXIT_REJECTED,
        Err(err) => {
            eprintln!("lesbar: {err:#}");
            EXIT_ERROR
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Check every file; returns whether all of them passed the gate.
fn run(cli: &Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => QualityConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => QualityConfig::default(),
    };
    let analyzer = QualityAnalyzer::new(config).context("invalid configuration")?;

    tracing::info!(files = cli.files.len(), min_score = cli.min_score, "Checking images");

    // par_iter + collect keeps argument order.
    let reports: Vec<QualityReport> = cli
        .files
        .par_iter()
        .map(|path| analyzer.check_path(path))
        .collect();

    let entries: Vec<FileReport<'_>> = cli
        .files
        .iter()
        .zip(&reports)
        .map(|(path, report)| FileReport {
            path,
            verdict: report.verdict(cli.min_score),
            report,
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &entries).context("writing JSON report")?;
        writeln!(out)?;
    } else {
        for entry in &entries {
            print_text(&mut out, entry)?;
        }
    }

    Ok(entries.iter().all(|entry| entry.verdict == Verdict::Accept))
}

fn print_text(out: &mut impl Write, entry: &FileReport<'_>) -> Result<()> {
    let verdict = match entry.verdict {
        Verdict::Accept => "ok",
        Verdict::Reject => "REJECTED",
    };
    writeln!(
        out,
        "{}: {}/100 [{}]",
        entry.path.display(),
        entry.report.score,
        verdict
    )?;
    for suggestion in &entry.report.suggestions {
        writeln!(out, "  - {suggestion}")?;
    }
    if let Some(details) = &entry.report.blur_details {
        writeln!(
            out,
            "    blur {:.3}  clarity {:.3}  skew {:.1}°  contrast {:.1}/{:.1}",
            details.overall_blur_score,
            details.text_clarity,
            details.skew_angle,
            details.global_contrast,
            details.local_contrast
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use image::{GrayImage, Luma};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn status_of_args(args: &[&str]) -> u8 {
        match Cli::try_parse_from(args) {
            Ok(cli) => run_status(run(&cli)),
            Err(err) => parse_failure_status(&err),
        }
    }

    /// Any decodable page passes a zero threshold.
    fn write_page(dir: &std::path::Path) -> PathBuf {
        let page = GrayImage::from_fn(64, 64, |x, _| Luma([if x % 8 < 2 { 0 } else { 255 }]));
        let path = dir.join("page.png");
        page.save(&path).unwrap();
        path
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply() {
        let cli = parse(&["lesbar", "a.png", "b.jpg"]);
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.min_score, 30);
        assert!(!cli.json);
    }

    #[test]
    fn min_score_is_bounded() {
        assert!(Cli::try_parse_from(["lesbar", "--min-score", "101", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["lesbar"]).is_err());
    }

    #[test]
    fn usage_errors_exit_one_and_help_exits_zero() {
        assert_eq!(status_of_args(&["lesbar", "--min-score", "200", "a.png"]), EXIT_ERROR);
        assert_eq!(status_of_args(&["lesbar"]), EXIT_ERROR);
        assert_eq!(status_of_args(&["lesbar", "--no-such-flag", "a.png"]), EXIT_ERROR);
        assert_eq!(status_of_args(&["lesbar", "--help"]), EXIT_OK);
        assert_eq!(status_of_args(&["lesbar", "--version"]), EXIT_OK);
    }

    #[test]
    fn rejected_file_exits_two() {
        let cli = parse(&["lesbar", "--min-score", "0", "/nonexistent/scan.png"]);
        assert!(!run(&cli).unwrap());
        assert_eq!(status_of_args(&["lesbar", "/nonexistent/scan.png"]), EXIT_REJECTED);
    }

    #[test]
    fn accepted_file_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let page = page.to_str().unwrap();
        assert_eq!(status_of_args(&["lesbar", "--min-score", "0", page]), EXIT_OK);
        assert_eq!(status_of_args(&["lesbar", "--json", "--min-score", "0", page]), EXIT_OK);
    }

    #[test]
    fn one_rejected_file_rejects_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let page = page.to_str().unwrap();
        assert_eq!(
            status_of_args(&["lesbar", "--min-score", "0", page, "/nonexistent/scan.png"]),
            EXIT_REJECTED
        );
    }

    #[test]
    fn bad_config_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let page = write_page(dir.path());
        let config = dir.path().join("config.json");
        std::fs::write(&config, r#"{ "contrast": { "window": 8 } }"#).unwrap();

        let args = [
            "lesbar",
            "--config",
            config.to_str().unwrap(),
            page.to_str().unwrap(),
        ];
        assert_eq!(status_of_args(&args), EXIT_ERROR);

        let missing = ["lesbar", "--config", "/nonexistent/config.json", "a.png"];
        assert_eq!(status_of_args(&missing), EXIT_ERROR);
    }

    #[test]
    fn text_output_lists_suggestions() {
        let path = PathBuf::from("scan.png");
        let report = QualityReport::invalid_image();
        let entry = FileReport {
            path: &path,
            verdict: report.verdict(30),
            report: &report,
        };
        let mut buf = Vec::new();
        print_text(&mut buf, &entry).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("scan.png: 0/100 [REJECTED]"));
        assert!(text.contains("Invalid image file"));
    }
}
