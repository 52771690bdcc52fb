//! infix-rules: applies a rule file to series records read from stdin.
//!
//! Each input line is `<series-key> [<unix-nanos>]`. Records surviving every
//! rule are written to stdout, rewritten; dropped records are omitted.

use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use infix_core::config::{load_dotenv, Settings};
use infix_core::SeriesRecord;
use infix_rules::{apply_rules, ConfigLoader};

// ── CLI ─────────────────────────────────────────────────────────────

/// Rewrite and filter series keys according to a TOML rule file.
#[derive(Parser, Debug)]
#[command(name = "infix-rules", version, about)]
struct Cli {
    /// Rule file to load. Defaults to infix.toml.
    #[arg(long, short, env = "INFIX_CONFIG")]
    config: Option<PathBuf>,

    /// Print the sample configuration of a rule type and exit.
    #[arg(long, value_name = "RULE")]
    sample: Option<String>,

    /// List registered rule types and filter kinds and exit.
    #[arg(long)]
    list: bool,

    /// Skip malformed input lines instead of failing.
    #[arg(long)]
    skip_invalid: bool,
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    load_dotenv();
    let settings = Settings::from_env();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&settings.log_filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let loader = ConfigLoader::builtin();

    if cli.list {
        println!("rules:");
        for name in loader.rules().names() {
            println!("  {}", name);
        }
        println!("filters:");
        for kind in loader.filters().kinds() {
            println!("  {}", kind);
        }
        return Ok(());
    }

    if let Some(name) = &cli.sample {
        print!("{}", loader.rules().sample(name)?);
        return Ok(());
    }

    settings.log_summary();
    let path = cli.config.unwrap_or(settings.rules_path);
    let rules = loader.load_config(&path)?;
    info!(path = %path.display(), rules = rules.len(), "rules ready");

    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    let (mut read, mut written) = (0usize, 0usize);

    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        read += 1;

        let record = match SeriesRecord::parse(&line) {
            Ok(record) => record,
            Err(e) if cli.skip_invalid => {
                warn!(line = lineno + 1, error = %e, "skipping invalid record");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("stdin:{}", lineno + 1)),
        };

        if let Some(record) = apply_rules(&rules, record) {
            writeln!(out, "{}", record)?;
            written += 1;
        }
    }
    out.flush()?;

    info!(read, written, dropped = read - written, "done");
    Ok(())
}
