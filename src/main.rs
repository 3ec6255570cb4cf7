//! esdsl CLI
//!
//! Command-line interface for composing and normalizing query bodies:
//! - Pretty-print or compact JSON
//! - Resolve time zones to offsets
//! - Compose a sample filtered report query
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use esdsl::config::{generate_default_config, Config, LoggingConfig};
use esdsl::query::{
    agg, aggs, aggs_of, compact, date_histogram_on, filter, interval, local_zone_name, pretty,
    query, range_on, resolve_offset, sum, term, terms, time_zone_with_fallback, when, Fragment,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "esdsl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compose and normalize search aggregation query bodies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pretty-print JSON with two-space indentation
    Pretty {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },

    /// Strip insignificant whitespace from JSON
    Compact {
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },

    /// Resolve a zone name or offset to its current UTC offset
    Timezone {
        /// Zone name (e.g. Asia/Kathmandu) or offset (e.g. -08:00); default: local zone
        zone: Option<String>,
    },

    /// Compose a per-repository issue duration report for a user
    Report {
        /// User login to filter on
        user: String,
        /// Reporting period (week, month)
        #[arg(short, long, default_value = "week")]
        period: String,
        /// Also bucket durations over time with this interval (e.g. 1d)
        #[arg(short, long)]
        interval: Option<String>,
        /// Time zone for the time buckets (default: local zone)
        #[arg(short = 'z', long)]
        zone: Option<String>,
        /// Print compact JSON instead of pretty
        #[arg(long)]
        compact: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) = Config::load_default(cli.config.as_deref())?;
    init_logging(&config.logging);

    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::debug!("Using default config with environment overrides"),
    }

    match cli.command {
        Commands::Pretty { file } => {
            let input = read_input(file.as_deref())?;
            println!("{}", pretty(&input)?);
        }

        Commands::Compact { file } => {
            let input = read_input(file.as_deref())?;
            println!("{}", compact(&input)?);
        }

        Commands::Timezone { zone } => {
            let fallback = &config.query.fallback_time_zone;
            let name = zone.unwrap_or_else(|| local_zone_name(fallback));
            let offset = resolve_offset(&name, chrono::Utc::now())?;
            println!("{} {}", name, offset);
        }

        Commands::Report {
            user,
            period,
            interval: bucket,
            zone,
            compact: compact_output,
        } => {
            let body = report(&config, &user, &period, bucket.as_deref(), zone.as_deref())?;
            if compact_output {
                println!("{}", body);
            } else {
                println!("{}", pretty(&body)?);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("esdsl={}", config.level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading stdin")?;
            Ok(input)
        }
    }
}

fn report(
    config: &Config,
    user: &str,
    period: &str,
    bucket: Option<&str>,
    zone: Option<&str>,
) -> anyhow::Result<String> {
    let field = &config.query.timestamp_field;
    let size = config.query.terms_size;

    if !matches!(period, "week" | "month") {
        bail!("Unknown period '{}': expected week or month", period);
    }

    let over_time = match bucket {
        Some(every) => {
            let tz = time_zone_with_fallback(zone, &config.query.fallback_time_zone)?;
            agg("over_time", [date_histogram_on(field.as_str(), [interval(every), tz])])
        }
        None => Fragment::empty(),
    };

    let recent = filter([
        term("user.login", user),
        when(period == "week", [range_on(field.as_str(), "now-7d", "now")]),
        when(period == "month", [range_on(field.as_str(), "now-1M", "now")]),
    ]);

    let body = query([aggs(
        "results",
        [recent.apply([aggs(
            "repos",
            [
                terms("repository.name.keyword", size),
                aggs(
                    "labels",
                    [
                        terms("issue.labels.keyword", size),
                        aggs_of([agg("duration_sum", [sum("duration")]), over_time]),
                    ],
                ),
            ],
        )])],
    )])?;

    tracing::debug!(user, period, "Composed report query");
    Ok(body)
}
