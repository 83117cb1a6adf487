//! Statistics over persisted price entries.

use chrono::NaiveDateTime;
use sea_orm::{DatabaseConnection, DbErr};

use crate::entities::price_entries;
use crate::models::crypto::CoinType;
use crate::services::price_store;

/// Window size for the rolling deviation when the caller does not override it.
pub const DEFAULT_DEVIATION_WINDOW: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviationStats {
    pub std_deviation: f64,
    pub data_points: usize,
    pub last_updated: NaiveDateTime,
}

/// Population standard deviation (divide by N, not N-1). A single-element
/// slice yields exactly 0.
pub fn population_std_deviation(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    variance.sqrt()
}

/// Most recent entry for a coin, or `None` when nothing has been stored yet.
pub async fn latest_snapshot(
    db: &DatabaseConnection,
    coin: CoinType,
) -> Result<Option<price_entries::Model>, DbErr> {
    price_store::find_latest(db, coin).await
}

/// Deviation over the `window` most recent entries for a coin. Zero stored
/// entries is `None`, which is distinct from a deviation of zero.
pub async fn standard_deviation(
    db: &DatabaseConnection,
    coin: CoinType,
    window: u64,
) -> Result<Option<DeviationStats>, DbErr> {
    let entries = price_store::find_recent(db, coin, window).await?;

    let Some(newest) = entries.first() else {
        return Ok(None);
    };

    let prices: Vec<f64> = entries.iter().map(|entry| entry.usd).collect();

    Ok(Some(DeviationStats {
        std_deviation: population_std_deviation(&prices),
        data_points: entries.len(),
        last_updated: newest.updated_at,
    }))
}
