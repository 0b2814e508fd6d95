use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

mod cache;
mod cases;
mod census;
mod config;
mod error;
mod estimate;
mod models;
mod registry;
mod report;
mod risk;
mod session;

use cases::{CaseCountSource, CkanCaseClient};
use census::CensusClient;
use config::Config;
use estimate::UpdateRequest;
use models::{Attendance, CacheEntry, Trigger};
use registry::CountyRegistry;
use session::{Session, SessionCommand};

#[derive(Parser)]
#[command(name = "covid-gathering-risk")]
#[command(about = "Chance that someone at a California gathering has COVID-19", long_about = None)]
struct Cli {
    /// Load county populations from a CSV snapshot instead of the census API
    #[arg(long, global = true)]
    population_csv: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known counties and their populations
    Counties,
    /// Compute the exposure risk for one gathering
    #[command(group(
        ArgGroup::new("size")
            .args(["slider", "attendees"])
            .required(true)
    ))]
    Estimate {
        #[arg(long)]
        county: String,
        /// Exponential slider position in [0, 3]
        #[arg(long)]
        slider: Option<f64>,
        #[arg(long)]
        attendees: Option<u32>,
        #[arg(long, value_enum, default_value = "county")]
        trigger: Trigger,
        /// County of the previously cached case count
        #[arg(long, requires = "cached_cases")]
        cached_county: Option<String>,
        #[arg(long, requires = "cached_county")]
        cached_cases: Option<u64>,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read county/slider/attendees commands from stdin, reusing cached cases
    Session,
    /// Write a markdown report across attendee counts
    Report {
        #[arg(long)]
        county: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covid_gathering_risk=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;
    let http = config.http_client()?;

    let registry = match &cli.population_csv {
        Some(path) => CountyRegistry::from_csv_path(path)
            .with_context(|| format!("failed to load populations from {}", path.display()))?,
        None => CountyRegistry::load(&CensusClient::new(http.clone(), &config))
            .await
            .context("failed to load county populations")?,
    };
    let source = CkanCaseClient::new(http, &config);

    match cli.command {
        Commands::Counties => {
            for name in registry.names() {
                let population = registry.population(name)?;
                println!("{name}\t{population}");
            }
        }
        Commands::Estimate {
            county,
            slider,
            attendees,
            trigger,
            cached_county,
            cached_cases,
            json,
        } => {
            let attendance = match (slider, attendees) {
                (Some(value), _) => Attendance::Slider(value),
                (None, Some(count)) => Attendance::Count(count),
                (None, None) => anyhow::bail!("either --slider or --attendees is required"),
            };
            let cached = cached_county
                .zip(cached_cases)
                .map(|(county, cases)| CacheEntry { county, cases });

            let response = estimate::update(
                &registry,
                &source,
                UpdateRequest {
                    trigger,
                    county,
                    attendance,
                    cached,
                },
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", report::render_estimate(&response));
                println!(
                    "cache: --cached-county {:?} --cached-cases {}",
                    response.cache.county, response.cache.cases
                );
            }
        }
        Commands::Session => run_session(&registry, &source).await?,
        Commands::Report { county, out } => {
            let mut session = Session::new(&registry, &source);
            let mut rows = Vec::new();
            session.select_county(&county).await?;
            for mark in report::SLIDER_MARKS {
                rows.push(session.set_slider(mark).await?.clone());
            }
            let report =
                report::build_report(&county, config.window_days, Utc::now().date_naive(), &rows);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

async fn run_session<S: CaseCountSource>(
    registry: &CountyRegistry,
    source: &S,
) -> anyhow::Result<()> {
    let mut session = Session::new(registry, source);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    info!("Session started with {} counties", registry.len());
    println!("Commands: county <name>, slider <0-3>, attendees <n>, show, quit");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let outcome = match command {
            SessionCommand::Quit => break,
            SessionCommand::Show => {
                match session.current() {
                    Some(response) => print!("{}", report::render_estimate(response)),
                    None => println!("No result yet."),
                }
                if let Some(entry) = session.cache() {
                    println!("cached: {} cases for {}", entry.cases, entry.county);
                }
                continue;
            }
            SessionCommand::County(name) => session.select_county(&name).await,
            SessionCommand::Slider(value) => session.set_slider(value).await,
            SessionCommand::Attendees(count) => session.set_attendees(count).await,
        };

        match outcome {
            Ok(response) => print!("{}", report::render_estimate(response)),
            Err(err) => println!("No result: {err}"),
        }
    }

    Ok(())
}
