use agriweather::config::AgriWeatherConfig;
use agriweather::location_resolver::{ResolutionController, ResolutionOutcome};
use agriweather::{
    AgriWeatherError, DashboardRenderer, ForecastClient, GeocodeClient, OpenMeteoGeocoder,
    PlaceCandidate, VERSION, telemetry,
};
use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "agriweather", version, about = "Weather and soil forecasts for farm locations")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging and show configuration details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current conditions, daily maxima and the hourly strip
    Weather(WeatherArgs),
}

#[derive(Args)]
struct WeatherArgs {
    /// Place name, e.g. "Anna Nagar, Chennai, IN"
    #[arg(short, long, conflicts_with_all = ["lat", "lon"])]
    location: Option<String>,

    /// Latitude of the current position
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Pick the Nth match (1-based) when the place is ambiguous
    #[arg(long)]
    pick: Option<usize>,

    /// Print the dashboard as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e.downcast_ref::<AgriWeatherError>() {
                Some(err) => err.user_message(),
                None => format!("{e:#}"),
            };
            eprintln!("❌ {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AgriWeatherConfig::load_from_path(cli.config.clone())?;
    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;
    debug!("Configuration loaded");

    match cli.command {
        None => {
            print_banner(&config, cli.config.as_deref(), cli.verbose);
            Ok(())
        }
        Some(Commands::Weather(args)) => show_weather(&config, args).await,
    }
}

fn print_banner(config: &AgriWeatherConfig, config_path: Option<&Path>, verbose: bool) {
    println!("🌾 AgriWeather v{VERSION}");
    println!("Weather and soil forecasts powered by Open-Meteo");
    println!("Run `agriweather weather --location \"<place>\"` to get started.");

    if verbose {
        let source = config_path
            .map(Path::to_path_buf)
            .or_else(AgriWeatherConfig::get_config_path)
            .filter(|path| path.exists())
            .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
        println!();
        println!("Using config from: {source}");
        println!("Log level: {}", config.logging.level);
        println!("Geocoding endpoint: {}", config.geocoding.base_url);
        println!("Forecast endpoint: {}", config.forecast.base_url);
    }
}

async fn show_weather(config: &AgriWeatherConfig, args: WeatherArgs) -> Result<()> {
    let place = match (args.lat, args.lon, args.location.as_deref()) {
        (Some(lat), Some(lon), _) => PlaceCandidate::current_position(lat, lon)?,
        (_, _, Some(text)) => resolve_place(config, text, args.pick).await?,
        _ => {
            info!("No place given, using {}", config.defaults.label);
            PlaceCandidate::new(
                config.defaults.latitude,
                config.defaults.longitude,
                0,
                config.defaults.label.clone(),
            )?
        }
    };

    let forecast = ForecastClient::new(&config.forecast)?;
    let series = forecast
        .fetch_forecast(place.latitude, place.longitude)
        .await?;
    let dashboard = DashboardRenderer::render(&series, &place.label);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&dashboard).context("Failed to serialize dashboard")?
        );
    } else {
        print!("{dashboard}");
    }
    Ok(())
}

async fn resolve_place(
    config: &AgriWeatherConfig,
    text: &str,
    pick: Option<usize>,
) -> Result<PlaceCandidate> {
    let geocoder = OpenMeteoGeocoder::new(&config.geocoding)?;
    let controller = ResolutionController::new(GeocodeClient::new(
        geocoder,
        config.geocoding.fallback_country.clone(),
    ));

    let outcome = controller
        .resolve(text)
        .await
        .ok_or_else(|| anyhow!("Search for '{text}' was superseded"))?;

    match outcome {
        ResolutionOutcome::Resolved(place) => Ok(place),
        ResolutionOutcome::AmbiguousChoice(choices) => {
            eprintln!("Multiple matches found. Please pick one.");
            for (i, choice) in choices.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, choice.choice_label());
            }

            let number = match pick {
                Some(n) => n,
                None => prompt_choice(choices.len())?,
            };
            let chosen = number
                .checked_sub(1)
                .and_then(|i| choices.get(i))
                .ok_or_else(|| {
                    AgriWeatherError::invalid_input(format!(
                        "Pick a number between 1 and {}",
                        choices.len()
                    ))
                })?;

            Ok(controller.select(chosen)?)
        }
        ResolutionOutcome::NotFound => Err(AgriWeatherError::not_found(text).into()),
        ResolutionOutcome::Failed(e) => Err(e.into()),
    }
}

fn prompt_choice(count: usize) -> Result<usize> {
    eprint!("Choice [1-{count}]: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read choice")?;
    let line = line.trim();

    line.parse::<usize>().map_err(|_| {
        anyhow::Error::from(AgriWeatherError::invalid_input(format!(
            "'{line}' is not a number"
        )))
    })
}
