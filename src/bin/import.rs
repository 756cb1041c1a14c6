//! Import taxi trips from a CSV export into our database.
//!
//! NOTE: this can be run with `cargo run --bin import [filename]`

use std::env;
use std::fs::OpenOptions;
use std::path::Path;

use log::{error, info, LevelFilter};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode, WriteLogger,
};

use taxi_trips::{db, extract_from_file::Extract, Trip};

const LOG: &str = "import.log";

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
    let data_file = if args.len() < 2 {
        error!("Filename of CSV not supplied - aborting.");
        return;
    } else {
        args[1].clone()
    };

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

    let trips = match Trip::extract(Path::new(&data_file)) {
        Ok(v) => v,
        Err(e) => {
            error!("Unable to extract trips from {data_file}: {e}.");
            return;
        }
    };
    info!("Extracted {} trips from {data_file}.", trips.len());

    match db::insert_trips(&conn, &trips) {
        Ok(n) => info!("Inserted {n} trips."),
        Err(e) => error!("Unable to insert trips: {e}."),
    }
}
