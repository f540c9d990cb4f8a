mod fsm;
mod index;
mod output;
mod search;
mod source;
#[cfg(feature = "interactive")]
mod tui;
mod utils;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use fsm::FuzzyFinder;
use source::{DiskCache, MemoryCache, PersistentCache, RepoWalkSource};
use std::path::PathBuf;
use std::time::Instant;
use utils::progress::{ProgressBar, ProgressStyle};
use utils::{cache_key_for_root, find_repo_root};

#[derive(Parser)]
#[command(name = "fzi")]
#[command(about = "Interactive fuzzy filename finder")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Initial query for the interactive picker
    query: Option<String>,

    /// Repository path (auto-detects the git root)
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Show latency and filter false-positive diagnostics
    #[arg(long)]
    debug: bool,

    /// Skip the persistent filename cache
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot search: build (or load) the index, print ranked matches
    Find {
        query: String,

        /// Repository path (auto-detects the git root)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Maximum number of results to print
        #[arg(short = 'n', long, default_value_t = 50)]
        max_results: usize,

        /// Refetch the file list even if a cached copy exists
        #[arg(long)]
        refresh: bool,

        /// Skip the persistent filename cache
        #[arg(long)]
        no_cache: bool,

        /// Show latency and filter false-positive diagnostics
        #[arg(long)]
        debug: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Show index statistics for a repository
    Stats {
        /// Repository path (auto-detects the git root)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Manage the persistent filename cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove all cached filename lists
    Clear,
    /// Print the cache directory
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Find {
            query,
            path,
            max_results,
            refresh,
            no_cache,
            debug,
            no_color,
        }) => {
            let mut finder = make_finder(&path, no_cache, refresh)?;
            build_index(&mut finder)?;

            let Some(result) = finder.search(&query, max_results) else {
                bail!("index did not reach the ready state");
            };
            output::print_matches(&result, !no_color, debug)?;
        }
        Some(Commands::Stats { path }) => {
            show_stats(&path)?;
        }
        Some(Commands::Cache { action }) => {
            let cache = DiskCache::open_default()?;
            match action {
                CacheAction::Clear => {
                    let removed = cache.clear()?;
                    println!("Removed {} cached filename list(s)", removed);
                }
                CacheAction::Path => {
                    println!("{}", cache.dir().display());
                }
            }
        }
        None => {
            let finder = make_finder(&cli.path, cli.no_cache, false)?;
            run_interactive(finder, cli.query, cli.debug)?;
        }
    }

    Ok(())
}

/// Assemble a finder session for the repository containing `path`
fn make_finder(path: &std::path::Path, no_cache: bool, refresh: bool) -> Result<FuzzyFinder> {
    let root = find_repo_root(path)?;
    let key = cache_key_for_root(&root);

    let cache: Box<dyn PersistentCache> = if no_cache {
        Box::new(MemoryCache::new())
    } else {
        let disk = DiskCache::open_default()?;
        if refresh {
            disk.remove(&key)?;
        }
        Box::new(disk)
    };

    Ok(FuzzyFinder::new(
        Box::new(RepoWalkSource::new(root)),
        cache,
        key,
    ))
}

/// Drive the lifecycle to completion with a progress bar, failing with the
/// FSM's message if it settles in the error state.
fn build_index(finder: &mut FuzzyFinder) -> Result<()> {
    let mut bar: Option<ProgressBar> = None;

    finder.run_to_completion(|indexed, total| {
        let bar = bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{bar:40.cyan/blue} {pos}/{len} files indexed")
                    .unwrap()
                    .progress_chars("█▓▒░  "),
            );
            pb
        });
        bar.set_position(indexed as u64);
    });
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if let Some(message) = finder.error_message() {
        bail!("could not load the file list: {}", message);
    }
    Ok(())
}

fn show_stats(path: &std::path::Path) -> Result<()> {
    let mut finder = make_finder(path, false, false)?;
    let start = Instant::now();
    build_index(&mut finder)?;
    let elapsed = start.elapsed();

    let fsm::FsmState::Ready(index) = finder.state() else {
        bail!("index did not reach the ready state");
    };

    println!("Files indexed: {}", index.total_file_count());
    println!("Buckets: {}", index.bucket_count());
    println!(
        "Filter memory: {:.1} KB",
        index.filter_memory_usage() as f64 / 1024.0
    );
    println!(
        "Estimated filter false-positive rate: {:.2}%",
        index.estimated_false_positive_rate() * 100.0
    );
    println!("Build time: {:.0}ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}

#[cfg(feature = "interactive")]
fn run_interactive(finder: FuzzyFinder, query: Option<String>, debug: bool) -> Result<()> {
    if let Some(selection) = tui::run(finder, query, debug)? {
        println!("{}", selection);
    }
    Ok(())
}

#[cfg(not(feature = "interactive"))]
fn run_interactive(_finder: FuzzyFinder, _query: Option<String>, _debug: bool) -> Result<()> {
    bail!("this build has no interactive mode; use `fzi find <QUERY>` or rebuild with the `interactive` feature")
}
