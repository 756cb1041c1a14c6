//! Estimate hourly tau and speed curves over a date range and render them.
//!
//! NOTE: this can be run with
//! `cargo run --bin estimate [start date] [end date] [output image]`,
//! dates in YYYY-MM-DD form. The range is half-open: the end date itself is
//! not included. The output image path defaults to `results.png`.

use std::env;
use std::fs::OpenOptions;
use std::path::Path;

use chrono::NaiveDate;
use log::{error, info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode, WriteLogger,
};

use taxi_trips::db;
use taxi_trips::plot;
use taxi_trips::regression::{estimate_between_dates, BucketPolicy};

const LOG: &str = "estimate.log";

fn main() {
    // Load file containing environment variables, panic if it doesn't exist.
    dotenvy::dotenv().expect("Unable to load .env file.");

    // Get env var for path where log will be, panic if it doesn't exist.
    let log_dir = env::var("LOG_DIR").expect("Unable to load log directory path from .env file.");

    // Set up logging, panic if it fails.
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Debug,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Info,
            config,
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(format!("{log_dir}/{LOG}"))
                .expect("Could not open log file."),
        ),
    ])
    .expect("Could not configure logging.");

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        error!("Start and end dates (YYYY-MM-DD) not supplied - aborting.");
        return;
    }
    let start = match NaiveDate::parse_from_str(&args[1], "%Y-%m-%d") {
        Ok(v) => v,
        Err(e) => {
            error!("Invalid start date `{}`: {e}.", args[1]);
            return;
        }
    };
    let end = match NaiveDate::parse_from_str(&args[2], "%Y-%m-%d") {
        Ok(v) => v,
        Err(e) => {
            error!("Invalid end date `{}`: {e}.", args[2]);
            return;
        }
    };
    let output = args.get(3).cloned().unwrap_or_else(|| "results.png".to_string());

    let username = match env::var("DB_USERNAME") {
        Ok(v) => v,
        Err(e) => {
            error!("Unable to load username from .env file: {e}.");
            return;
        }
    };
    let password = match env::var("DB_PASSWORD") {
        Ok(v) => v,
        Err(e) => {
            error!("Unable to load password from .env file: {e}.");
            return;
        }
    };
    let pool = match db::create_pool(username, password) {
        Ok(v) => v,
        Err(e) => {
            error!("Unable to get db connection pool: {e}.");
            return;
        }
    };
    let conn = match pool.get() {
        Ok(v) => v,
        Err(e) => {
            error!("Unable to get db connection: {e}.");
            return;
        }
    };

    // An undeterminable hour (no trips, or all trips the same distance) is
    // logged and left out of the chart rather than failing the whole range.
    let curves = match estimate_between_dates(&conn, start, end, BucketPolicy::Sentinel) {
        Ok(v) => v,
        Err(e) => {
            error!("Unable to estimate hourly curves: {e}.");
            return;
        }
    };

    match plot::render_curves(&curves, Path::new(&output)) {
        Ok(()) => info!("Wrote hourly curves for [{start}, {end}) to {output}."),
        Err(e) => error!("{e}."),
    }
}
