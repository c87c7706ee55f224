//! Process entry point: opens the certification store, verifies it can be
//! read, reports health, and shuts the store down again.
//!
//! A store that cannot be opened ends the process with exit code 1.

use std::process::ExitCode;

use certification_tracker::{commit, health, CertDbState, StoreConfig, SystemClock};
use log::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = match CertDbState::open(&config) {
        Ok(store) => store,
        Err(e) => {
            error!("Certification store connection error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("Certification store connected: {}", store.path().display());

    match commit::count_certifications(&store) {
        Ok(count) => info!("Store verification: found {count} certifications"),
        Err(e) => error!("Store verification failed: {e}"),
    }

    match serde_json::to_string(&health::health_check(&SystemClock)) {
        Ok(report) => println!("{report}"),
        Err(e) => error!("Failed to render health report: {e}"),
    }

    if let Err(e) = store.close() {
        error!("Certification store disconnect error: {e}");
        return ExitCode::FAILURE;
    }
    info!("Certification store disconnected");

    ExitCode::SUCCESS
}
