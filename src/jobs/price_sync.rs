//! Scheduled price ingestion job.
//!
//! Runs the ingestion pipeline once at startup and then on a fixed cadence.
//! A tick that lands while the previous run is still in flight is skipped
//! rather than started concurrently.

use sea_orm::DatabaseConnection;
use std::env;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use crate::services::ingestion::IngestionService;

/// Default sync interval in seconds (2 hours)
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 7200;

/// Environment variable for the sync interval
const ENV_SYNC_INTERVAL: &str = "PRICE_SYNC_INTERVAL_SECS";

pub async fn start_price_sync_job(db: DatabaseConnection, ingestion: IngestionService) {
    tokio::spawn(async move {
        let interval_secs: u64 = env::var(ENV_SYNC_INTERVAL)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS);

        info!(interval_secs, "Starting price sync job");

        // The first tick completes immediately, which is the eager run at
        // process start.
        let mut interval = interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;

            match ingestion.try_run(&db).await {
                Ok(Some(report)) => {
                    info!(
                        stored = report.stored_count(),
                        skipped = report.skipped_count(),
                        "Price sync complete"
                    );
                }
                Ok(None) => {
                    warn!("Previous ingestion run still in flight, skipping this tick");
                }
                Err(e) => {
                    error!(error = %e, "Price sync failed");
                    // Continue - next interval will retry
                }
            }
        }
    });
}
