mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod store;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use datasources::{registry, BackendClient, LocationRegistry, OpenWeatherMapClient};
use error::{Result, SalinityError};
use logic::{EnvironmentalEstimator, Pipeline};
use models::Location;
use store::{AlertLog, AlertSink, ReadingHistoryStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&cli).await,
        Commands::Check => check(&cli).await,
    };

    if let Err(e) = result {
        tracing::error!("fatal: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn resolve_locations(registry: &dyn LocationRegistry) -> Result<Vec<Location>> {
    let locations = registry.fetch_locations().await?;

    if locations.is_empty() {
        return Err(SalinityError::Config(format!(
            "No locations returned by {}",
            registry.registry_name()
        )));
    }

    tracing::info!(
        "Resolved {} location(s) from {}",
        locations.len(),
        registry.registry_name()
    );
    Ok(locations)
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_ref())?;
    let data_dir = Config::data_dir(cli.data_dir.as_ref())?;
    let locations = resolve_locations(registry::from_config(&config)?.as_ref()).await?;

    let jitter = config.pipeline.jitter_config();
    let estimator = match config.pipeline.seed {
        Some(seed) => EnvironmentalEstimator::with_seed(jitter, seed),
        None => EnvironmentalEstimator::new(jitter),
    };

    let max_entries = config.storage.max_entries;
    let history = ReadingHistoryStore::new(config.history_path(&data_dir), max_entries);

    let alert_sink: Box<dyn AlertSink> = match config.backend {
        Some(ref backend) => Box::new(BackendClient::new(backend.clone())),
        None => Box::new(AlertLog::new(config.alerts_path(&data_dir), max_entries)),
    };

    let mut pipeline = Pipeline::new(
        Box::new(OpenWeatherMapClient::new(config.weather.clone())),
        estimator,
        history,
        alert_sink,
    )
    .with_delay(config.pipeline.inter_location_delay());

    if let Some(ref backend) = config.backend {
        pipeline = pipeline.with_reading_sink(Box::new(BackendClient::new(backend.clone())));
        tracing::info!("Submitting readings and alerts to backend at {}", backend.url);
    }

    let summary = pipeline.run(&locations).await;

    if config.backend.is_some() {
        tracing::info!("{} reading(s) submitted to backend", summary.readings_submitted);
    }
    if let Some(size) = summary.history_size {
        tracing::debug!("History now holds {} of {} reading(s)", size, max_entries);
    }

    if !summary.is_clean() {
        tracing::warn!(
            "Run finished with issues: {} skipped, {} reading write failure(s), {} alert failure(s){}",
            summary.skipped,
            summary.reading_failures,
            summary.alert_failures,
            if summary.history_error.is_some() {
                ", history not saved"
            } else {
                ""
            }
        );
    }

    Ok(())
}

async fn check(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_ref())?;
    println!("Configuration: OK");

    let locations = resolve_locations(registry::from_config(&config)?.as_ref()).await?;
    println!("Locations ({}):", locations.len());
    for location in &locations {
        println!("  [{}] {}", location.id, location);
    }

    let weather = OpenWeatherMapClient::new(config.weather.clone());
    let weather_ok = weather
        .test_connection(&locations[0])
        .await
        .unwrap_or(false);
    println!(
        "OpenWeatherMap: {}",
        if weather_ok { "OK" } else { "OFFLINE" }
    );

    let data_dir = Config::data_dir(cli.data_dir.as_ref())?;
    let history = ReadingHistoryStore::new(config.history_path(&data_dir), config.storage.max_entries);
    match history.load() {
        Ok(readings) => println!(
            "History: {} of {} reading(s) at {}",
            readings.len(),
            history.capacity(),
            history.path().display()
        ),
        Err(e) => println!("History: UNREADABLE ({})", e),
    }

    match config.backend {
        Some(ref backend) => println!("Backend: {}", backend.url),
        None => println!(
            "Backend: not configured, alerts go to {}",
            config.alerts_path(&data_dir).display()
        ),
    }

    if !weather_ok {
        return Err(SalinityError::FetchFailure(
            "OpenWeatherMap connection test failed".into(),
        ));
    }

    Ok(())
}
