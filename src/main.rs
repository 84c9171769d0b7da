//! # Floodwatch Application Entry Point
//!
//! This binary wires the library together: it can run the HTTP boundary,
//! list stations, or fetch one station's readings and print them as an
//! hourly table, the full chart series, or JSON.

// Test modules
#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use floodwatch_lib::config::Config;
use floodwatch_lib::fetcher::ReadingsFetcher;
use floodwatch_lib::flood_api::{FloodApi, FloodDataSource};
use floodwatch_lib::renderer::{render_chart_series, render_table};
use floodwatch_lib::{sampler, server, transform};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "floodwatch", version, about = "UK flood-monitoring station readings")]
struct Cli {
    /// Path to the TOML config file (defaults to $FLOODWATCH_CONFIG or floodwatch.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP boundary (/readings, /series, /stations)
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// List stations with their reference codes
    Stations {
        /// Read through a running floodwatch server instead of the upstream API
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Fetch and display the last readings of one station
    Show {
        /// Station URI or reference code
        station_id: String,

        /// Read through a running floodwatch server instead of the upstream API
        #[arg(short, long)]
        server: Option<String>,

        /// Print every point instead of the hourly table
        #[arg(long)]
        chart: bool,

        /// Print the transformed series as JSON
        #[arg(long)]
        json: bool,
    },
}

async fn list_stations<S: FloodDataSource>(source: &S) -> anyhow::Result<()> {
    let stations = source.fetch_stations().await?;
    if stations.is_empty() {
        println!("No stations available");
    }
    for station in &stations {
        println!("{:<12} {}", station.station_ref(), station.display_name());
    }
    Ok(())
}

async fn show_station<S: FloodDataSource>(
    source: &S,
    station_id: &str,
    chart: bool,
    json: bool,
) -> anyhow::Result<()> {
    let readings = source.fetch_readings(station_id).await?;
    let series = transform::transform(&readings);

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
    } else if chart {
        print!("{}", render_chart_series(&series));
    } else {
        let table = sampler::sample(&series.points);
        print!(
            "{}",
            render_table(&series, &table, "Hourly water level readings (m)")
        );
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let timeout = Duration::from_secs(config.api.timeout_secs);

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        match cli.command {
            Command::Serve { bind } => {
                if let Some(bind) = bind {
                    config.server.bind_addr = bind;
                }
                server::serve(&config).await
            }
            Command::Stations { server: Some(url) } => {
                list_stations(&ReadingsFetcher::new(&url, timeout)?).await
            }
            Command::Stations { server: None } => {
                list_stations(&FloodApi::new(&config.api)?).await
            }
            Command::Show {
                station_id,
                server,
                chart,
                json,
            } => match server {
                Some(url) => {
                    let fetcher = ReadingsFetcher::new(&url, timeout)?;
                    show_station(&fetcher, &station_id, chart, json).await
                }
                None => {
                    let api = FloodApi::new(&config.api)?;
                    show_station(&api, &station_id, chart, json).await
                }
            },
        }
    })
}
