use anyhow::{Context, Result};
use breakdown::analysis::{groups, sentiment, trends, Breakdown};
use breakdown::db::models::{Dataset, Dimension};
use breakdown::ingest::IngestError;
use breakdown::report;
use breakdown::session::{Session, SessionError};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

const NO_DATA_PROMPT: &str = "No data found! Please upload your CSV file first.";

#[derive(Parser)]
#[command(name = "breakdown", version, about = "Personal music-rating breakdown from a CSV export")]
struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum DimensionArg {
    Artist,
    Genre,
    Country,
    Race,
    Gender,
    Language,
}

impl DimensionArg {
    fn dimension(&self) -> Dimension {
        match self {
            Self::Artist => Dimension::Artist,
            Self::Genre => Dimension::Genre,
            Self::Country => Dimension::Country,
            Self::Race => Dimension::Race,
            Self::Gender => Dimension::Gender,
            Self::Language => Dimension::Language,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV export, store it, and print the dashboard
    Upload {
        /// CSV file to upload
        file: PathBuf,

        /// Also write the aggregates as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Print the printable report from the last upload
    Report {
        /// Also write the aggregates as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Average rating per group along one dimension
    Groups {
        #[arg(value_enum)]
        dimension: DimensionArg,
    },

    /// Highest-rated songs
    Top {
        /// Number of results (defaults to `[analysis] top_n`)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Lowest-rated songs
    Bottom {
        /// Number of results (defaults to `[analysis] top_n`)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Songs whose rating disagrees most with their review
    Gaps {
        /// Number of results (defaults to `[analysis] gap_limit`)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Average rating per release year
    Trend,

    /// Track length vs rating
    Lengths,

    /// Show storage statistics
    Stats,

    /// Delete the stored dataset
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = breakdown::config::AppConfig::load();

    // Resolve database path: CLI > config > XDG default
    let db_path = config.resolve_db_path(cli.db_path);
    log::info!("Database: {}", db_path.display());

    let db = breakdown::db::Database::open(&db_path)
        .context("Failed to open database")?;
    let mut session = Session::new(db, config.analysis, config.lexicon);

    match cli.command {
        Commands::Upload { file, json } => {
            let breakdown = match session.upload_file(&file) {
                Ok(b) => b,
                Err(SessionError::Ingest(IngestError::NoSongs)) => {
                    println!("No songs found in {}. Check that it has a Title column.", file.display());
                    return Ok(());
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Upload of {} failed", file.display()));
                }
            };

            println!(
                "Uploaded {} songs ({} rated)",
                breakdown.overview.total_songs, breakdown.overview.rated_songs
            );
            println!();
            print!("{}", report::render_dashboard(&breakdown));
            if let Some(out) = json {
                write_json(&breakdown, &out)?;
            }
        }

        Commands::Report { json } => {
            let breakdown = match session.report() {
                Ok(b) => b,
                Err(SessionError::NoData) => {
                    println!("{NO_DATA_PROMPT}");
                    return Ok(());
                }
                Err(e) => return Err(e).context("Failed to build report"),
            };

            print!("{}", report::render_report(&breakdown));
            if let Some(out) = json {
                write_json(&breakdown, &out)?;
            }
        }

        Commands::Groups { dimension } => {
            let Some(ds) = load_dataset(&session)? else {
                return Ok(());
            };
            let dim = dimension.dimension();
            let results = groups::group_ratings(&ds, dim, session.options());
            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }
            print!(
                "{}",
                report::render_groups(&format!("Ratings by {}", dim.label()), &results)
            );
        }

        Commands::Top { limit } => {
            let Some(ds) = load_dataset(&session)? else {
                return Ok(());
            };
            let results = trends::top_songs(&ds, session.options().top_n_or(limit), session.options());
            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }
            print!("{}", report::render_cards(&format!("Top {} tracks", results.len()), &results));
        }

        Commands::Bottom { limit } => {
            let Some(ds) = load_dataset(&session)? else {
                return Ok(());
            };
            let results = trends::bottom_songs(&ds, session.options().top_n_or(limit), session.options());
            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }
            print!(
                "{}",
                report::render_cards(&format!("Bottom {} tracks", results.len()), &results)
            );
        }

        Commands::Gaps { limit } => {
            let Some(ds) = load_dataset(&session)? else {
                return Ok(());
            };
            let limit = session.options().gap_limit_or(limit);
            let results =
                sentiment::expectation_gaps(&ds, session.lexicon(), limit, session.options());
            if results.is_empty() {
                println!("No results found.");
                return Ok(());
            }
            print!("{}", report::render_gaps(&results));
        }

        Commands::Trend => {
            let Some(ds) = load_dataset(&session)? else {
                return Ok(());
            };
            let results = trends::release_year_trend(&ds, session.options());
            if results.is_empty() {
                println!("No songs with a parseable release date.");
                return Ok(());
            }
            print!("{}", report::render_trend(&results));
        }

        Commands::Lengths => {
            let Some(ds) = load_dataset(&session)? else {
                return Ok(());
            };
            let results = trends::track_length_points(&ds, session.options());
            if results.is_empty() {
                println!("No songs with a parseable track length.");
                return Ok(());
            }
            print!("{}", report::render_lengths(&results));
        }

        Commands::Stats => {
            let stats = session.db().storage_stats().context("Failed to get stats")?;
            println!("Storage Statistics");
            println!("==================");
            println!("Database:       {}", db_path.display());
            println!("Stored keys:    {}", stats.keys);
            println!("Dataset size:   {} bytes", stats.dataset_bytes);
            println!(
                "Last upload:    {}",
                stats.dataset_updated_at.as_deref().unwrap_or("never")
            );

            if let Some(ds) = session.stored_dataset().context("Failed to load dataset")? {
                let overview = groups::overview(&ds);
                println!();
                println!("Songs:          {}", overview.total_songs);
                println!("Rated songs:    {}", overview.rated_songs);
                println!("Unique artists: {}", overview.unique_artists);
                println!("Unique genres:  {}", overview.unique_genres);
            }
        }

        Commands::Clear => {
            let removed = session.db().clear_dataset().context("Failed to clear dataset")?;
            if removed {
                println!("Stored dataset removed.");
            } else {
                println!("Nothing to clear.");
            }
        }
    }

    Ok(())
}

/// The stored dataset, or `None` after telling the user to upload first.
fn load_dataset(session: &Session) -> Result<Option<Dataset>> {
    match session.stored_dataset().context("Failed to load dataset")? {
        Some(ds) if !ds.is_empty() => Ok(Some(ds)),
        _ => {
            println!("{NO_DATA_PROMPT}");
            Ok(None)
        }
    }
}

fn write_json(breakdown: &Breakdown, out: &Path) -> Result<()> {
    let json = report::to_json(breakdown).context("Failed to serialize breakdown")?;
    std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}
