#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `SnapRank` - Ranks file metadata against structured search filters.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use clap_cargo::style::CLAP_STYLING;
use humansize::{BINARY, format_size};
use snaprank::config::Config;
use snaprank::crawler::DirectorySource;
use snaprank::filters::parse_timestamp;
use snaprank::source::SnapshotFile;
use snaprank::{Error, MetadataSource, Result, ScoredResult, SearchEngine, SearchFilters};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// CLI arguments for `SnapRank`
#[derive(Parser, Debug)]
#[command(author, version, about, styles = CLAP_STYLING)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config:  Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Record the metadata of every file under a directory
    Index {
        /// Directory to index
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Rank files against a query and structured filters
    Search {
        /// Free-form query, split into keywords
        query:   Option<String>,
        #[command(flatten)]
        scope:   Scope,
        #[command(flatten)]
        filters: FilterArgs,
        /// Maximum number of results
        #[arg(short, long)]
        limit:   Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json:    bool,
    },
    /// Explain how one file scores
    Score {
        /// Path of the file, relative to the indexed directory
        path:    String,
        #[command(flatten)]
        scope:   Scope,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Where the metadata snapshot comes from
#[derive(Args, Debug)]
struct Scope {
    /// Indexed directory
    #[arg(long, default_value = ".")]
    dir:      PathBuf,
    /// Snapshot file to read instead of the directory's
    #[arg(long, conflicts_with = "live")]
    snapshot: Option<PathBuf>,
    /// Walk the directory now instead of reading its snapshot
    #[arg(long)]
    live:     bool,
}

/// Structured filter flags
#[derive(Args, Debug)]
struct FilterArgs {
    /// JSON file with filters as produced by an intent parser
    #[arg(long = "filters")]
    filters_file:  Option<PathBuf>,
    /// Keyword to match against name, path, type and extension
    #[arg(short = 'k', long = "keyword")]
    keywords:      Vec<String>,
    /// Required extension (hard filter)
    #[arg(short = 'e', long = "ext")]
    extensions:    Vec<String>,
    /// Required category or MIME substring (hard filter)
    #[arg(short = 't', long = "type")]
    content_types: Vec<String>,
    /// Preferred folder (adds score only)
    #[arg(short = 'f', long = "folder")]
    folders:       Vec<String>,
    /// Minimum size in bytes
    #[arg(long)]
    min_size:      Option<u64>,
    /// Maximum size in bytes
    #[arg(long)]
    max_size:      Option<u64>,
    /// Modified at or after this date (2024-06-01 or RFC 3339)
    #[arg(long, value_parser = timestamp_arg)]
    after:         Option<DateTime<Utc>>,
    /// Modified at or before this date (2024-06-01 or RFC 3339)
    #[arg(long, value_parser = timestamp_arg)]
    before:        Option<DateTime<Utc>>,
}

fn timestamp_arg(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_timestamp(raw).map_err(|e| e.to_string())
}

impl FilterArgs {
    /// Combine the filters file, the flags and the query keywords
    fn build(self, query: Option<&str>) -> Result<SearchFilters> {
        let mut filters = match &self.filters_file {
            Some(path) => SearchFilters::from_json(&fs::read_to_string(path)?)?,
            None => SearchFilters::default(),
        };

        filters.merge_keywords(self.keywords);
        if let Some(query) = query {
            filters.merge_keywords(SearchFilters::from_query(query).keywords);
        }
        filters.extensions.extend(self.extensions);
        filters.content_types.extend(self.content_types);
        filters.folders.extend(self.folders);
        filters.min_size = self.min_size.or(filters.min_size);
        filters.max_size = self.max_size.or(filters.max_size);
        filters.modified_after = self.after.or(filters.modified_after);
        filters.modified_before = self.before.or(filters.modified_before);
        Ok(filters)
    }
}

/// Make sure `dir` exists and is a directory
fn check_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(Error::snapshot(&format!("Directory not found: {}", dir.display())));
    }
    if !dir.is_dir() {
        return Err(Error::snapshot(&format!("Not a directory: {}", dir.display())));
    }
    Ok(())
}

impl Scope {
    /// Open the metadata source this scope names
    fn open(&self, config: &Config) -> Result<Box<dyn MetadataSource>> {
        if let Some(snapshot) = &self.snapshot {
            return Ok(Box::new(SnapshotFile::new(snapshot.clone())));
        }
        check_dir(&self.dir)?;
        if self.live {
            Ok(Box::new(DirectorySource::new(self.dir.clone(), config.scan.clone())))
        } else {
            Ok(Box::new(SnapshotFile::in_dir(&self.dir)))
        }
    }
}

/// Index a directory into a snapshot file
fn index_directory(dir: &Path, config: &Config) -> Result<()> {
    check_dir(dir)?;
    println!("Indexing directory: {}", dir.display());

    let records = DirectorySource::new(dir, config.scan.clone()).list()?;
    if records.is_empty() {
        println!("No files were indexed. Make sure the directory contains files.");
        return Ok(());
    }

    let total_bytes: u64 = records.iter().map(|record| record.size).sum();
    let snapshot = SnapshotFile::in_dir(dir);
    snapshot.save(&records)?;

    println!("\nIndexing completed:");
    println!("- Files indexed: {}", records.len());
    println!("- Total size: {}", format_size(total_bytes, BINARY));
    println!("- Snapshot saved to {}", snapshot.path().display());
    Ok(())
}

/// Print ranked results as a table
fn print_results(results: &[ScoredResult]) {
    println!("\nFound {} matches:", results.len());
    println!("Score | Size       | Modified   | Path");
    println!("------|------------|------------|------");

    for result in results {
        println!(
            "{:>4.0}% | {:>10} | {} | {}",
            result.score * 100.0,
            format_size(result.size, BINARY),
            result.last_modified.format("%Y-%m-%d"),
            result.path
        );
        println!("      | {}", result.reason);
    }
}

/// Search for files matching the filters
fn search_files(
    filters: &SearchFilters,
    scope: &Scope,
    limit: usize,
    json: bool,
    config: &Config,
) -> Result<()> {
    let source = scope.open(config)?;
    let engine = SearchEngine::new(source.as_ref());
    info!(?filters, limit, "searching");
    let results = engine.search(filters, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results).map_err(std::io::Error::from)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("\nNo matches found.");
        println!("Tips:");
        println!("  - Try using fewer or different keywords");
        println!("  - Extension, type, size and date filters exclude files outright");
        println!("  - Re-run 'snaprank index' if files changed since the last index");
        return Ok(());
    }

    print_results(&results);
    Ok(())
}

/// Explain how one file scores
fn score_file(path: &str, filters: &SearchFilters, scope: &Scope, config: &Config) -> Result<()> {
    let source = scope.open(config)?;
    let engine = SearchEngine::new(source.as_ref());
    let Some((file, outcome)) = engine.score(path, filters)? else {
        return Err(Error::snapshot(&format!("{path} is not in the snapshot")));
    };

    println!("File:     {}", file.path);
    println!("Type:     {}", file.content_type);
    println!("Size:     {}", format_size(file.size, BINARY));
    println!("Modified: {}", file.last_modified.to_rfc3339());
    match outcome.exclusion {
        Some(exclusion) => println!("Excluded: {exclusion}"),
        None => {
            println!("Score:    {:.2}", outcome.score);
            println!("Reason:   {}", outcome.reason());
        },
    }
    Ok(())
}

/// Install the stderr log subscriber
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a log subscriber is already installed");
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;
    init_logging(cli.verbose || config.logging.verbose);

    match cli.command {
        Command::Index { dir } => index_directory(&dir, &config),
        Command::Search { query, scope, filters, limit, json } => {
            let filters = filters.build(query.as_deref())?;
            search_files(&filters, &scope, limit.unwrap_or(config.search.limit), json, &config)
        },
        Command::Score { path, scope, filters } => {
            let filters = filters.build(None)?;
            score_file(&path, &filters, &scope, &config)
        },
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
