//! CLI entry point for the ride dashboard.
//!
//! Provides subcommands for listing the filter configuration, printing the
//! dashboard for a filter selection, exporting the filtered rides, and an
//! interactive filtering session.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use ride_dashboard::analyzers::aggregate::build_report;
use ride_dashboard::cache::DatasetCache;
use ride_dashboard::dimensions::{
    ALL_DATA, ValueDomain, column_for, relations_for, selector_options,
};
use ride_dashboard::filter::{FilterState, Selection, distinct_values};
use ride_dashboard::output::{export_view, print_pretty, render_report, to_json};
use ride_dashboard::session::{HELP, Session};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ride_dashboard")]
#[command(about = "Filter and summarize a ride-hailing bookings dataset", long_about = None)]
struct Cli {
    /// Bookings CSV to analyze
    #[arg(short, long, global = true, env = "RIDES_DATASET", default_value = "Bengaluru Ola.csv")]
    dataset: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// JSON filter preset to start from
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Primary dimension to analyze by
    #[arg(short = 'D', long)]
    dimension: Option<String>,

    /// Primary values: comma-separated, "all" or "none"
    #[arg(short, long)]
    values: Option<String>,

    /// Related filter as NAME=VALUES, repeatable
    #[arg(short, long = "relation", value_name = "NAME=VALUES")]
    relations: Vec<String>,
}

impl FilterArgs {
    fn to_state(&self) -> Result<FilterState> {
        let mut state = match &self.preset {
            Some(path) => FilterState::load(path)
                .with_context(|| format!("failed to load preset {}", path.display()))?,
            None => FilterState::default(),
        };

        if let Some(dimension) = &self.dimension {
            if *dimension != state.dimension {
                state = FilterState::for_dimension(dimension);
            }
        }
        if let Some(values) = &self.values {
            state.values = Selection::parse(values);
        }
        for relation in &self.relations {
            let Some((name, values)) = relation.split_once('=') else {
                bail!("related filter '{relation}' must look like NAME=VALUES");
            };
            state
                .relations
                .insert(name.trim().to_string(), Selection::parse(values));
        }

        state.validate()?;
        Ok(state)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the dimensions available to analyze by
    Dimensions,
    /// List the related filters of a dimension
    Relations {
        #[arg(short = 'D', long)]
        dimension: String,
    },
    /// List the values a dimension can be filtered on
    Values {
        #[arg(short = 'D', long)]
        dimension: String,
    },
    /// Print dashboard figures for a filter selection
    Summary {
        #[command(flatten)]
        filters: FilterArgs,

        /// Emit JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Export the filtered rides as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        /// Directory to write the export into
        #[arg(short, long, default_value = "exports")]
        output_dir: PathBuf,

        /// Gzip compress the export
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Interactively refine filters, reading commands from stdin
    Session {
        /// JSON filter preset to start from
        #[arg(long)]
        preset: Option<PathBuf>,

        /// Default directory for exports
        #[arg(short, long, default_value = "exports")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ride_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ride_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let cache = DatasetCache::global();

    match cli.command {
        Commands::Dimensions => {
            for name in selector_options() {
                match column_for(name) {
                    Some(column) => println!("{name}\t(column: {column})"),
                    None => println!("{name}"),
                }
            }
        }
        Commands::Relations { dimension } => {
            check_dimension(&dimension)?;
            let relations = relations_for(&dimension);
            if relations.is_empty() {
                println!("'{dimension}' has no related filters");
            }
            for relation in relations {
                let domain = match relation.domain {
                    ValueDomain::Categories(values) => values.join(", "),
                    ValueDomain::Buckets(rule) => rule.labels().collect::<Vec<_>>().join(", "),
                };
                println!("{}\t(column: {})\t{domain}", relation.name, relation.column);
            }
        }
        Commands::Values { dimension } => {
            check_dimension(&dimension)?;
            let Some(column) = column_for(&dimension) else {
                bail!("'{ALL_DATA}' has no values to select");
            };
            let dataset = cache.get_or_load(&cli.dataset)?;
            for value in distinct_values(&dataset.view(), column) {
                println!("{value}");
            }
        }
        Commands::Summary { filters, json } => {
            let state = filters.to_state()?;
            let dataset = cache.get_or_load(&cli.dataset)?;
            let evaluation = state.evaluate(&dataset)?;
            let report = build_report(&state.dimension, &evaluation);
            print_pretty(&report);

            if json {
                println!("{}", to_json(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
        Commands::Export {
            filters,
            output_dir,
            gzip,
        } => {
            let state = filters.to_state()?;
            let dataset = cache.get_or_load(&cli.dataset)?;
            let evaluation = state.evaluate(&dataset)?;
            if evaluation.view.is_empty() {
                info!("No data matches the selected filters, nothing exported");
                return Ok(());
            }
            let path = export_view(&evaluation.view, &output_dir, gzip)?;
            println!("{}", path.display());
        }
        Commands::Session { preset, output_dir } => {
            let state = match preset {
                Some(path) => FilterState::load(&path)?,
                None => FilterState::default(),
            };
            // fail fast on a bad dataset before prompting for commands
            cache.get_or_load(&cli.dataset)?;

            eprintln!("{HELP}");
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            Session::new(cache, &cli.dataset, &output_dir)
                .with_state(state)
                .run(stdin.lock(), stdout.lock())?;
        }
    }

    Ok(())
}

fn check_dimension(dimension: &str) -> Result<()> {
    if dimension != ALL_DATA && column_for(dimension).is_none() {
        bail!(
            "unknown dimension '{dimension}', choose one of: {}",
            selector_options().join(", ")
        );
    }
    Ok(())
}
