//! lexitag CLI entry point

use clap::{Parser, Subcommand, ValueEnum};
use lexitag::{
    commands::{
        cmd_analyze, cmd_annotate_csv, cmd_annotate_store, cmd_load, cmd_sync, print_analysis,
        print_annotate_stats, print_csv_annotate_stats, print_load_stats, print_sync_stats,
        AnnotateOptions, CsvAnnotateOptions,
    },
    config::Config,
    error::{Error, Result},
    index::SearchIndex,
    sentiment::{Lexicon, SentimentScorer},
    store::AnnotationStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lexitag")]
#[command(version, about = "Language/sentiment annotation pipeline with store and index sync", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the cleaned dataset CSV into the annotation store
    Load {
        /// Path to the cleaned CSV file
        path: PathBuf,

        /// Identity key override: 'texte' (default) or 'id_post'
        #[arg(long)]
        by: Option<String>,
    },

    /// Detect language and score sentiment for records
    Annotate {
        /// Where to read records from
        #[arg(long, value_enum, default_value_t = Source::Store)]
        source: Source,

        /// Path to the cleaned CSV (required with --source csv)
        #[arg(long)]
        csv_path: Option<PathBuf>,

        /// Recompute even if annotation fields already exist
        #[arg(long)]
        force: bool,

        /// Process only N documents (for testing)
        #[arg(long)]
        sample: Option<u64>,

        /// Cursor batch size
        #[arg(long)]
        batch_size: Option<i64>,

        /// When reading from CSV: upsert results into the store
        #[arg(long)]
        upsert: bool,
    },

    /// Propagate all stored documents into the search index
    Sync {
        /// Bulk submission batch size
        #[arg(long)]
        batch_size: Option<i64>,
    },

    /// Annotate a single text and print the result
    Analyze {
        /// The text to annotate
        text: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    Store,
    Csv,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load configuration; an explicit path must exist, otherwise defaults
    // apply.
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };

    match cli.command {
        Commands::Load { path, by } => {
            if let Some(by) = by {
                config.pipeline.identity_key = by.parse()?;
            }
            let store = AnnotationStore::connect(&config).await?;
            let stats = cmd_load(&store, &path).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_load_stats(&stats);
            }
        }

        Commands::Annotate {
            source,
            csv_path,
            force,
            sample,
            batch_size,
            upsert,
        } => {
            let scorer = SentimentScorer::new(Lexicon::load(&config.lexicon_path())?);
            let batch_size = batch_size.unwrap_or(config.pipeline.batch_size);

            match source {
                Source::Store => {
                    let store = AnnotationStore::connect(&config).await?;
                    let options = AnnotateOptions {
                        force,
                        sample,
                        batch_size,
                    };
                    let stats = cmd_annotate_store(&store, &scorer, &options).await?;

                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&stats)?);
                    } else {
                        print_annotate_stats(&stats);
                    }
                }
                Source::Csv => {
                    let csv_path = csv_path.ok_or_else(|| {
                        Error::Config("--csv-path is required with --source csv".to_string())
                    })?;
                    let store = if upsert {
                        Some(AnnotationStore::connect(&config).await?)
                    } else {
                        None
                    };
                    let options = CsvAnnotateOptions {
                        sample,
                        upsert,
                        annotate_before_upsert: config.pipeline.annotate_before_upsert,
                    };
                    let stats =
                        cmd_annotate_csv(store.as_ref(), &scorer, &csv_path, &options).await?;

                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&stats)?);
                    } else {
                        print_csv_annotate_stats(&stats);
                    }
                }
            }
        }

        Commands::Sync { batch_size } => {
            let store = AnnotationStore::connect(&config).await?;
            let index = SearchIndex::connect(&config.index)?;
            let batch_size = batch_size.unwrap_or(config.pipeline.batch_size);

            let stats = cmd_sync(&store, &index, batch_size).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_sync_stats(&stats);
            }
        }

        Commands::Analyze { text } => {
            let scorer = SentimentScorer::new(Lexicon::load(&config.lexicon_path())?);
            let analysis = cmd_analyze(&scorer, &text);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }
        }
    }

    Ok(())
}
