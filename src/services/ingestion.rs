//! Fetch-validate-persist pipeline for the tracked coin set.
//!
//! One run issues a single batched price fetch, then walks the tracked coins
//! in a fixed order. A coin the upstream omitted or that fails validation is
//! skipped and recorded; a store error aborts the rest of the run.

use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::entities::price_entries;
use crate::models::crypto::{CoinType, PriceCandidate, ValidationError};
use crate::services::coingecko::{CoinGeckoService, SimplePriceResponse};
use crate::services::price_store;

/// What happened to one tracked coin during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum CoinOutcome {
    Stored(price_entries::Model),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The upstream response had no entry for this coin's slug.
    MissingFromResponse,
    Invalid(ValidationError),
}

/// Per-coin outcomes of one ingestion run, in `CoinType::ALL` order. When the
/// upstream call failed outright there are no outcomes and `fetch_error`
/// records the cause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestionReport {
    pub outcomes: Vec<(CoinType, CoinOutcome)>,
    pub fetch_error: Option<String>,
}

impl IngestionReport {
    fn fetch_failed(error: String) -> Self {
        IngestionReport {
            outcomes: Vec::new(),
            fetch_error: Some(error),
        }
    }

    /// Successfully stored entries, in run order.
    pub fn stored(&self) -> Vec<&price_entries::Model> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                CoinOutcome::Stored(entry) => Some(entry),
                CoinOutcome::Skipped(_) => None,
            })
            .collect()
    }

    pub fn stored_count(&self) -> usize {
        self.stored().len()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.stored_count()
    }
}

#[derive(Clone)]
pub struct IngestionService {
    coingecko: CoinGeckoService,
    guard: Arc<Mutex<()>>,
}

impl IngestionService {
    pub fn new(coingecko: CoinGeckoService) -> Self {
        Self {
            coingecko,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Run the pipeline, waiting for any in-flight run to finish first.
    /// A whole-batch fetch failure is recorded in the report, not returned as
    /// an error; only store failures surface to the caller.
    pub async fn run(&self, db: &DatabaseConnection) -> Result<IngestionReport, DbErr> {
        let _running = self.guard.lock().await;
        self.run_locked(db).await
    }

    /// Scheduler entry point: skips instead of queueing when a run is already
    /// in flight. A skipped tick returns `None`.
    pub async fn try_run(&self, db: &DatabaseConnection) -> Result<Option<IngestionReport>, DbErr> {
        match self.guard.try_lock() {
            Ok(_running) => Ok(Some(self.run_locked(db).await?)),
            Err(_) => Ok(None),
        }
    }

    async fn run_locked(&self, db: &DatabaseConnection) -> Result<IngestionReport, DbErr> {
        let response = match self.coingecko.fetch_simple_prices(&CoinType::ALL).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Price fetch failed, nothing stored this run");
                return Ok(IngestionReport::fetch_failed(e.to_string()));
            }
        };

        store_prices(db, &response).await
    }
}

/// Normalize, validate and persist every tracked coin out of one upstream
/// response.
pub async fn store_prices(
    db: &DatabaseConnection,
    response: &SimplePriceResponse,
) -> Result<IngestionReport, DbErr> {
    let mut outcomes = Vec::with_capacity(CoinType::ALL.len());

    for coin in CoinType::ALL {
        let Some(data) = response.get(coin.slug()) else {
            warn!(coin = %coin, "No data found for coin in price response");
            outcomes.push((coin, CoinOutcome::Skipped(SkipReason::MissingFromResponse)));
            continue;
        };

        let candidate = match PriceCandidate::from_api(coin, data) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(coin = %coin, error = %e, "Validation failed for coin");
                outcomes.push((coin, CoinOutcome::Skipped(SkipReason::Invalid(e))));
                continue;
            }
        };

        let stored = price_store::insert_entry(db, &candidate).await?;
        outcomes.push((coin, CoinOutcome::Stored(stored)));
    }

    Ok(IngestionReport {
        outcomes,
        fetch_error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::coingecko::CoinPriceData;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn stored_entry(id: i32, coin: CoinType, usd: f64) -> price_entries::Model {
        let now = chrono::NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        price_entries::Model {
            id,
            currency_name: coin.as_str().to_string(),
            usd,
            usd_market_cap: 1.0e12,
            usd_24h_change: 0.5,
            created_at: now,
            updated_at: now,
        }
    }

    fn coin_data(usd: f64) -> CoinPriceData {
        CoinPriceData {
            usd: Some(usd),
            usd_market_cap: Some(1.0e12),
            usd_24h_change: Some(0.5),
        }
    }

    fn unreachable_service() -> IngestionService {
        IngestionService::new(CoinGeckoService::new("http://127.0.0.1:9".to_string(), None))
    }

    #[tokio::test]
    async fn test_missing_coin_is_skipped_not_fatal() {
        // Upstream omitted matic-network; the other two still get stored.
        let response: SimplePriceResponse = [
            ("bitcoin".to_string(), coin_data(64000.5)),
            ("ethereum".to_string(), coin_data(3100.0)),
        ]
        .into_iter()
        .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![stored_entry(1, CoinType::Bitcoin, 64000.5)],
                vec![stored_entry(2, CoinType::Ethereum, 3100.0)],
            ])
            .into_connection();

        let report = store_prices(&db, &response).await.unwrap();

        assert_eq!(report.stored_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[0].0, CoinType::Bitcoin);
        assert_eq!(report.outcomes[1].0, CoinType::Ethereum);
        assert_eq!(
            report.outcomes[2],
            (
                CoinType::MaticNetwork,
                CoinOutcome::Skipped(SkipReason::MissingFromResponse)
            )
        );
    }

    #[tokio::test]
    async fn test_invalid_coin_is_skipped_not_fatal() {
        let response: SimplePriceResponse = [
            ("bitcoin".to_string(), coin_data(64000.5)),
            (
                "ethereum".to_string(),
                CoinPriceData {
                    usd: Some(3100.0),
                    usd_market_cap: None,
                    usd_24h_change: Some(0.84),
                },
            ),
            ("matic-network".to_string(), coin_data(0.72)),
        ]
        .into_iter()
        .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![stored_entry(1, CoinType::Bitcoin, 64000.5)],
                vec![stored_entry(2, CoinType::MaticNetwork, 0.72)],
            ])
            .into_connection();

        let report = store_prices(&db, &response).await.unwrap();

        assert_eq!(report.stored_count(), 2);
        let (coin, outcome) = &report.outcomes[1];
        assert_eq!(*coin, CoinType::Ethereum);
        match outcome {
            CoinOutcome::Skipped(SkipReason::Invalid(err)) => {
                assert_eq!(err.fields, vec!["usd_market_cap"]);
            }
            other => panic!("expected validation skip, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty_report_without_error() {
        let service = unreachable_service();
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let report = service.run(&db).await.unwrap();

        assert!(report.outcomes.is_empty());
        assert_eq!(report.stored_count(), 0);
        assert!(report.fetch_error.is_some());
    }

    #[tokio::test]
    async fn test_try_run_skips_while_run_in_flight() {
        let service = unreachable_service();
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let _held = service.guard.lock().await;
        let skipped = service.try_run(&db).await.unwrap();
        assert!(skipped.is_none());
    }
}
