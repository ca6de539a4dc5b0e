//! CLI argument definitions for the PMO builder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use pmo_map::DEFAULT_THRESHOLD;

#[derive(Parser)]
#[command(
    name = "pmo-builder",
    version,
    about = "PMO Builder - Map lab tables onto Portable Microhaplotype Object sections",
    long_about = "Map the columns of lab-specific tables onto the fields of a \
                  Portable Microhaplotype Object (PMO).\n\n\
                  Each section is mapped from its own table (CSV, TSV, delimited text or an \
                  Excel workbook), written as a JSON fragment, and the fragments are merged \
                  with the hand-written information sections into the final PMO."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Section schema document (TOML or JSON); overrides PMO_SCHEMA_PATH.
    #[arg(long = "schema", value_name = "PATH", global = true)]
    pub schema: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the configured sections and their target fields.
    Sections,

    /// Map one table onto a section and write the section JSON.
    Map(MapArgs),

    /// Combine mapped raw and per-stage read counts into read_counts_per_stage.
    ReadCounts(ReadCountsArgs),

    /// Merge section JSON files into the final PMO document.
    Merge(MergeArgs),
}

#[derive(Parser)]
pub struct MapArgs {
    /// Section to map (e.g. specimen_info).
    #[arg(value_name = "SECTION")]
    pub section: String,

    /// Input table (.csv, .tsv, .txt, .xlsx, .xlsm, .xls or .ods).
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// Manual corrections to the suggested mapping (TOML or JSON).
    #[arg(long = "overrides", value_name = "FILE")]
    pub overrides: Option<PathBuf>,

    /// Minimum score (0-100) for an optional field to be matched.
    #[arg(
        long = "threshold",
        value_name = "N",
        default_value_t = DEFAULT_THRESHOLD,
        value_parser = parse_threshold
    )]
    pub threshold: f64,

    /// Unused column to carry into the output under its own name.
    #[arg(long = "additional", value_name = "COL")]
    pub additional: Vec<String>,

    /// Carry every unused column into the output.
    #[arg(long = "all-additional", conflicts_with = "additional")]
    pub all_additional: bool,

    /// Section JSON to write (default: <SECTION>.json next to the table).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report the mapping without writing output.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct MergeArgs {
    /// Section JSON files produced by `map`.
    #[arg(value_name = "SECTION_JSON", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Project information (JSON or TOML table).
    #[arg(long = "project", value_name = "FILE")]
    pub project: Option<PathBuf>,

    /// Hand-written section as SECTION=FILE (e.g. seq_info=seq.toml).
    #[arg(long = "info", value_name = "SECTION=FILE", value_parser = parse_info_section)]
    pub info: Vec<(String, PathBuf)>,

    /// Final PMO document to write.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct ReadCountsArgs {
    /// read_counts_raw section JSON produced by `map`.
    #[arg(long = "raw", value_name = "FILE")]
    pub raw: PathBuf,

    /// read_counts_by_stage section JSON produced by `map`.
    #[arg(long = "by-stage", value_name = "FILE")]
    pub by_stage: PathBuf,

    /// Bioinformatics run the counts belong to.
    #[arg(long = "run-name", value_name = "NAME")]
    pub run_name: String,

    /// Section JSON to write (default: read_counts_per_stage.json next to --raw).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

fn parse_info_section(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((section, path)) if !section.trim().is_empty() && !path.is_empty() => {
            Ok((section.trim().to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected SECTION=FILE, got '{value}'")),
    }
}

fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("threshold must be between 0 and 100, got {threshold}"))
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
