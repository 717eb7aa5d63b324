use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use tgs_ratings::cache::CsvDirCache;
use tgs_ratings::config::{AppConfig, Overrides};
use tgs_ratings::ingest::{self, CorpusFilter};
use tgs_ratings::models::{Division, Gender, Team};
use tgs_ratings::report;
use tgs_ratings::resolve::{EventDirectory, TracingWarnings};
use tgs_ratings::standings::{RatingOptions, SortStrategy, build_standings};
use tgs_ratings::stats::OowpPrecision;
use tgs_ratings::tgs::{HttpSource, TgsClient};

type Client = TgsClient<HttpSource, CsvDirCache>;

/// Standings and RPI ratings for youth-soccer divisions.
#[derive(Parser)]
#[command(name = "tgs-ratings", version)]
struct Cli {
    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Directory for cached reference CSV files
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Override the API root URL
    #[arg(long, global = true, value_name = "URL")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List countries
    Countries,
    /// List states
    States,
    /// List organizations (ECNL only unless --all)
    Organizations {
        #[arg(long)]
        all: bool,
    },
    /// List the events of an organization
    Events {
        #[arg(short = 'o', long)]
        organization_id: i64,
    },
    /// List the clubs of an organization
    Clubs {
        #[arg(short = 'o', long)]
        organization_id: i64,
    },
    /// Download a division's results to matches_{gender}_{yy}_{org}.csv
    Matches {
        #[arg(short = 'g', long, value_enum)]
        gender: Gender,
        /// Two-digit birth year, e.g. 09
        #[arg(short = 'y', long)]
        year: String,
        #[arg(short = 'o', long)]
        organization_id: i64,
        /// Keep matches dated after today
        #[arg(long)]
        include_future: bool,
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },
    /// Compute standings from a match file
    Stats {
        #[arg(short = 'f', long)]
        file: PathBuf,
        #[arg(short = 'o', long)]
        organization_id: i64,
        #[arg(long, value_enum, default_value_t = SortArg::Rpi)]
        sort: SortArg,
        /// Decimal places for percentages, at most 6 (defaults to RATINGS_DIGITS or 2)
        #[arg(long)]
        digits: Option<u32>,
        #[arg(long, value_enum, default_value_t = PrecisionArg::Default)]
        oowp_precision: PrecisionArg,
    },
    /// Resolve the event a team plays in
    #[command(name = "team2event")]
    TeamToEvent {
        #[arg(short = 't', long)]
        team: String,
        #[arg(short = 'o', long)]
        organization_id: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    /// RPI descending, then name
    Rpi,
    /// Points, then goal differential, then name
    Points,
}

impl From<SortArg> for SortStrategy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Rpi => SortStrategy::Rpi,
            SortArg::Points => SortStrategy::Points,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PrecisionArg {
    /// Nested OWP always rounded to 2 places
    Default,
    /// Nested OWP rounded to --digits
    Caller,
}

impl From<PrecisionArg> for OowpPrecision {
    fn from(arg: PrecisionArg) -> Self {
        match arg {
            PrecisionArg::Default => OowpPrecision::Default,
            PrecisionArg::Caller => OowpPrecision::Caller,
        }
    }
}

fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    let digits = match &cli.command {
        Command::Stats { digits, .. } => *digits,
        _ => None,
    };
    config.apply(Overrides {
        log_level: cli.log_level.clone(),
        cache_dir: cli.cache_dir.clone(),
        api_base: cli.api_base.clone(),
        digits,
    });
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.log_level)?;

    let client = TgsClient::new(
        HttpSource::new(config.api_base.clone(), config.request_timeout_secs),
        CsvDirCache::new(config.cache_dir.clone()),
    );

    match cli.command {
        Command::Countries => {
            info!("Retrieving countries...");
            for country in client.countries()? {
                println!("Country(id={}, name='{}')", country.id, country.name);
            }
        }
        Command::States => {
            info!("Retrieving states...");
            for state in client.states()? {
                println!("State(id={}, name='{}')", state.id, state.name);
            }
        }
        Command::Organizations { all } => {
            info!("Retrieving organizations...");
            for org in client.organizations(!all)? {
                println!(
                    "Organization(id={}, season_id={}, name='{}', season_group_id={})",
                    org.id, org.season_id, org.name, org.season_group_id
                );
            }
        }
        Command::Events { organization_id } => {
            for event in client.events_by_organization_id(organization_id)? {
                println!("{event}");
            }
        }
        Command::Clubs { organization_id } => {
            for club in client.clubs_by_organization_id(organization_id)? {
                println!(
                    "Club(id={}, name='{}', full_name='{}', city='{}', state_code='{}', event_id={})",
                    club.id, club.name, club.full_name, club.city, club.state_code, club.event_id
                );
            }
        }
        Command::Matches {
            gender,
            year,
            organization_id,
            include_future,
            out_dir,
        } => run_matches(&client, gender, &year, organization_id, include_future, &out_dir)?,
        Command::Stats {
            file,
            organization_id,
            sort,
            oowp_precision,
            ..
        } => {
            let options = RatingOptions {
                digits: config.digits,
                oowp_precision: oowp_precision.into(),
            };
            run_stats(&client, &file, organization_id, options, sort.into())?
        }
        Command::TeamToEvent {
            team,
            organization_id,
        } => {
            let directory = event_directory(&client, organization_id)?;
            match directory.resolve(&Team::named(team.clone()), &TracingWarnings) {
                Some(event) => println!("{team}: {event}"),
                None => println!("{team}: no event found"),
            }
        }
    }
    Ok(())
}

fn run_matches(
    client: &Client,
    gender: Gender,
    year: &str,
    organization_id: i64,
    include_future: bool,
    out_dir: &Path,
) -> Result<()> {
    let division = Division::new(gender, year)?;
    let org = client.require_organization(organization_id)?;
    info!(division = %division, organization = %org.name, "collecting matches");

    let today = chrono::Local::now().date_naive();
    let filter = CorpusFilter {
        include_future,
        today,
    };
    let collected = client.matches_for_division(&division, org.id, &filter)?;
    for err in &collected.errors {
        error!("{err}");
    }

    std::fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let path = out_dir.join(ingest::matches_file_name(&division, org.id));
    ingest::write_matches_file(&path, &collected.matches)?;
    println!(
        "Wrote {} matches ({}/{} clubs) to {}",
        collected.matches.len(),
        collected.clubs_fetched,
        collected.clubs_total,
        path.display()
    );
    Ok(())
}

fn event_directory(client: &Client, organization_id: i64) -> Result<EventDirectory> {
    let clubs = client.clubs_by_organization_id(organization_id)?;
    let events = client.events_by_organization_id(organization_id)?;
    Ok(EventDirectory::new(&clubs, &events))
}

fn run_stats(
    client: &Client,
    file: &Path,
    organization_id: i64,
    options: RatingOptions,
    strategy: SortStrategy,
) -> Result<()> {
    info!("Reading file: {}", file.display());
    // Future-dated rows stay: the file may have been written with --include-future.
    let today = chrono::Local::now().date_naive();
    let matches = ingest::read_corpus_file(file, &CorpusFilter::everything(today))?;

    // Event names are cosmetic; a provider failure leaves the column empty.
    let directory = event_directory(client, organization_id).unwrap_or_else(|err| {
        warn!("event lookup unavailable: {err:#}");
        EventDirectory::default()
    });
    let warnings = TracingWarnings;
    let standings = build_standings(&matches, options, strategy, |team| {
        directory.resolve(team, &warnings)
    });

    let out = ingest::stats_file_name(file);
    report::write_standings_file(&out, &standings)?;
    print!("{}", report::render_table(&standings));
    println!("Wrote {} teams to {}", standings.len(), out.display());
    Ok(())
}
