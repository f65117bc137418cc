//! Bestseller tracker CLI
//!
//! Local execution entry point: parse list files, compare weeks, and keep a
//! per-region history of annotated lists.

use std::path::{Path, PathBuf};

use bestsellers::{
    error::{AppError, Result},
    models::{BestsellerList, Config},
    parser::parse_list,
    pipeline::{self, DiffSummary, NoWeeksOnList},
    services::{FileListSource, HttpListSource, ListSource},
    storage::{ListStorage, LocalStorage},
    utils,
};
use clap::{Parser, Subcommand};

/// Regional bestseller list tracker
#[derive(Parser, Debug)]
#[command(
    name = "bestsellers",
    version,
    about = "Parses weekly regional bestseller lists and tracks their movement"
)]

struct Cli {
    /// Path to storage directory containing config.toml
    #[arg(short, long, default_value = "storage", global = true)]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a raw list file and print it as JSON
    Parse {
        /// Raw list text file
        file: PathBuf,
    },

    /// Compare two raw list files (current week first)
    Compare {
        current: PathBuf,
        previous: PathBuf,
    },

    /// Fetch, compare and store a region's week
    Update {
        /// Region code, or "all"
        #[arg(short, long)]
        region: String,

        /// List week as YYYY-MM-DD (default: most recent list day)
        #[arg(short, long)]
        week: Option<String>,

        /// Read `{date}{code}.txt` files from this directory instead of HTTP
        #[arg(long)]
        source_dir: Option<PathBuf>,

        /// Rebuild even if unchanged and bypass the circuit breaker
        #[arg(long)]
        force: bool,
    },

    /// Print a stored week as JSON
    Show {
        #[arg(short, long)]
        region: String,

        #[arg(short, long)]
        week: String,
    },

    /// Validate configuration files
    Validate,

    /// Show configured regions and stored weeks
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn read_list(path: &Path) -> Result<BestsellerList> {
    let raw = std::fs::read_to_string(path)?;
    Ok(parse_list(&raw))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_week_arg(week: &str) -> Result<chrono::NaiveDate> {
    utils::parse_week(week)
        .ok_or_else(|| AppError::validation(format!("Invalid week '{week}', use YYYY-MM-DD")))
}

fn log_summary(label: &str, summary: &DiffSummary) {
    log::info!(
        "{}: {} new, {} dropped, {} up, {} down, {} unchanged",
        label,
        summary.new,
        summary.dropped,
        summary.climbed,
        summary.fell,
        summary.unchanged
    );
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = LocalStorage::new(config.storage_root(&cli.storage_dir));

    match cli.command {
        Command::Parse { file } => {
            let list = read_list(&file)?;
            log::info!(
                "Parsed {}: {} categories, {} books",
                file.display(),
                list.categories.len(),
                list.book_count()
            );
            print_json(&list)?;
        }

        Command::Compare { current, previous } => {
            let current = read_list(&current)?;
            let previous = read_list(&previous)?;

            let result = pipeline::compare_lists(&current, &previous, &NoWeeksOnList).await;
            log_summary("Comparison", &DiffSummary::of(&result));
            print_json(&result)?;
        }

        Command::Update {
            region,
            week,
            source_dir,
            force,
        } => {
            config.validate()?;

            let week = match week {
                Some(w) => parse_week_arg(&w)?,
                None => utils::latest_list_week(chrono::Local::now().date_naive()),
            };

            let source: Box<dyn ListSource> = match source_dir {
                Some(dir) => Box::new(FileListSource::new(dir, &config.fetcher.date_format)),
                None => Box::new(HttpListSource::new(&config.fetcher)?),
            };

            if region.eq_ignore_ascii_case("all") {
                let results = pipeline::run_update_all(
                    &config,
                    source.as_ref(),
                    &storage,
                    &config.regions,
                    week,
                    force,
                )
                .await;

                let failures = results.iter().filter(|(_, r)| r.is_err()).count();
                for (code, result) in &results {
                    if let Ok(outcome) = result {
                        log_summary(code, &outcome.summary);
                    }
                }
                if failures > 0 {
                    log::error!("{} of {} regions failed", failures, results.len());
                    return Err(AppError::validation(format!(
                        "{failures} region updates failed"
                    )));
                }
            } else {
                let region = config.region(&region)?;
                let outcome =
                    pipeline::run_update(&config, source.as_ref(), &storage, region, week, force)
                        .await?;
                if outcome.cached {
                    log::info!("Upstream list unchanged since last update");
                }
                log_summary(&outcome.region, &outcome.summary);
            }
        }

        Command::Show { region, week } => {
            let region = config.region(&region)?;
            let week = parse_week_arg(&week)?;

            match storage.load(&region.code, week).await? {
                Some(stored) => print_json(&stored.list)?,
                None => {
                    log::error!("No stored list for {} week {}", region.code, week);
                    return Err(AppError::storage(format!(
                        "{} week {} not stored",
                        region.code, week
                    )));
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} regions)", config.regions.len());
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            for region in &config.regions {
                let weeks = storage.weeks(&region.code).await?;
                match (weeks.first(), weeks.last()) {
                    (Some(first), Some(last)) => log::info!(
                        "{} ({}): {} weeks stored, {} to {}",
                        region.name,
                        region.code,
                        weeks.len(),
                        first,
                        last
                    ),
                    _ => log::info!("{} ({}): nothing stored yet", region.name, region.code),
                }
            }
        }
    }

    Ok(())
}
