use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use spel_analyzer::engine::AnalyzerEngine;
use spel_analyzer::index::profile;
use spel_analyzer::index::scanner::ScanOptions;

#[derive(Parser)]
#[command(name = "spel-analyzer", version, about = "SpEL completion engine for YAML rule files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a Java/SpringBoot source tree and build a symbol-table profile.
    Scan {
        /// Project root to walk for .java files.
        #[arg(long)]
        root: PathBuf,
        /// Class-name suffix marking SpEL function classes.
        #[arg(long, default_value = "Functions")]
        suffix: String,
        /// Write the resulting profile as JSON.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Complete a partial expression against a saved profile.
    Complete {
        /// Profile produced by `scan --out`.
        #[arg(long)]
        profile: PathBuf,
        /// The expression text, possibly mid-edit.
        #[arg(long)]
        expr: String,
        /// Caret position in characters; defaults to the end of the text.
        #[arg(long)]
        caret: Option<usize>,
        /// Bind a root object, `NAME=ClassName`. Repeatable.
        #[arg(long = "bind", value_name = "NAME=CLASS")]
        binds: Vec<String>,
        /// Root object `#this`/`#root` and bare identifiers resolve against.
        #[arg(long)]
        default_root: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(
            EnvFilter::try_from_env("SPEL_ANALYZER_LOG")
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Scan { root, suffix, out } => {
            let engine = AnalyzerEngine::new();
            let options = ScanOptions {
                function_suffix: suffix,
            };
            let summary = engine
                .rescan(&root, &options)
                .with_context(|| format!("scan {}", root.display()))?;

            info!(
                classes = summary.classes,
                scanned = summary.scanned_files,
                skipped = summary.skipped.len(),
                "scan finished"
            );
            for diag in &summary.skipped {
                eprintln!("skipped {}: {}", diag.path.display(), diag.reason);
            }
            if let Some(path) = out {
                profile::save_profile(&path, &engine.snapshot())?;
                println!("profile written to {}", path.display());
            } else {
                println!(
                    "{} classes from {} files",
                    summary.classes, summary.scanned_files
                );
            }
        }
        Command::Complete {
            profile: profile_path,
            expr,
            caret,
            binds,
            default_root,
        } => {
            let table = profile::load_profile(&profile_path)?;
            let engine = AnalyzerEngine::with_table(table);
            for bind in &binds {
                let (name, class) = bind
                    .split_once('=')
                    .with_context(|| format!("invalid --bind `{bind}`, expected NAME=CLASS"))?;
                engine.bind_root(name.trim(), class.trim());
            }
            if let Some(name) = default_root {
                engine.set_default_root(&name);
            }

            let caret = caret.unwrap_or_else(|| expr.chars().count());
            let candidates = engine.complete(&expr, caret);
            println!("{}", serde_json::to_string_pretty(&candidates)?);
        }
    }
    Ok(())
}
