use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use shadowreg::sim::solar::{day_of_year, solar_noon_hour, sun_path};
use shadowreg::{ClockBasis, Engine, GeoCoordinate, OverallStatus, Scenario, SunPosition};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shadowreg")]
#[command(about = "Check cast-shadow hours of a proposed building against a regulation profile")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a TOML scenario
    Evaluate {
        /// Scenario file
        scenario: PathBuf,

        /// Override the sampling step [min]
        #[arg(long)]
        step_minutes: Option<u32>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Run on a single thread
        #[arg(long)]
        sequential: bool,
    },
    /// Print the sun path of a day
    Sun {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Day as YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// Standard-time offset from UTC [h]; local solar time if omitted
        #[arg(long, allow_hyphen_values = true)]
        utc_offset: Option<f64>,

        /// Print only the position at this clock time (HH:MM:SS)
        #[arg(long)]
        time: Option<NaiveTime>,

        #[arg(long, default_value_t = 60)]
        step_minutes: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("shadowreg=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Evaluate {
            scenario,
            step_minutes,
            json,
            sequential,
        } => evaluate(scenario, step_minutes, json, sequential),
        Command::Sun {
            lat,
            lon,
            date,
            utc_offset,
            time,
            step_minutes,
        } => sun(lat, lon, date, utc_offset, time, step_minutes),
    }
}

fn evaluate(path: PathBuf, step_minutes: Option<u32>, json: bool, sequential: bool) -> Result<()> {
    let scenario = Scenario::load(&path)?;
    let request = scenario
        .to_request()
        .with_context(|| format!("Invalid scenario: {}", path.display()))?;

    let mut config = scenario.engine.clone();
    if let Some(step) = step_minutes {
        config.step_minutes = step;
    }
    if sequential {
        config.parallel = false;
    }

    let report = Engine::new(config).evaluate(&request)?;
    if json {
        println!("{}", report.to_json().context("Failed to serialize report")?);
    } else {
        print!("{}", report);
    }

    if report.overall_status == OverallStatus::NonCompliant {
        std::process::exit(2);
    }
    Ok(())
}

fn sun(
    lat: f64,
    lon: f64,
    date: NaiveDate,
    utc_offset: Option<f64>,
    time: Option<NaiveTime>,
    step_minutes: u32,
) -> Result<()> {
    if step_minutes == 0 {
        bail!("Step must be at least one minute");
    }
    let location = GeoCoordinate::new(lat, lon)?;
    let basis = match utc_offset {
        Some(utc_offset_hours) => ClockBasis::Standard { utc_offset_hours },
        None => ClockBasis::LocalSolar,
    };

    if let Some(time) = time {
        let pos = SunPosition::at(&location, date.and_time(time), basis);
        println!(
            "{} {}: altitude {:.2}, azimuth {:.2}{}",
            date,
            time,
            pos.altitude,
            pos.azimuth,
            if pos.is_daylight { "" } else { " (below horizon)" }
        );
        return Ok(());
    }

    let doy = day_of_year(date);

    println!(
        "{} (day {}), solar noon at {:.2} h",
        date,
        doy,
        solar_noon_hour(basis, &location, doy)
    );
    println!("{:>6} {:>9} {:>9}", "hour", "altitude", "azimuth");
    for (hour, pos) in sun_path(&location, doy, basis, step_minutes) {
        if pos.is_daylight {
            println!("{:>6.2} {:>9.2} {:>9.2}", hour, pos.altitude, pos.azimuth);
        }
    }
    Ok(())
}
