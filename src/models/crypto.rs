use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::services::coingecko::CoinPriceData;

/// The fixed set of coins this service ingests and serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinType {
    Bitcoin,
    Ethereum,
    MaticNetwork,
}

impl CoinType {
    /// Tracked coins, in the order ingestion processes and reports them.
    pub const ALL: [CoinType; 3] = [
        CoinType::Bitcoin,
        CoinType::Ethereum,
        CoinType::MaticNetwork,
    ];

    /// Hyphenated identifier used by the upstream price API.
    pub fn slug(&self) -> &'static str {
        match self {
            CoinType::Bitcoin => "bitcoin",
            CoinType::Ethereum => "ethereum",
            CoinType::MaticNetwork => "matic-network",
        }
    }

    /// Underscored name stored in the `currency_name` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoinType::Bitcoin => "BITCOIN",
            CoinType::Ethereum => "ETHEREUM",
            CoinType::MaticNetwork => "MATIC_NETWORK",
        }
    }

    /// Case-insensitive lookup of an external identifier. Both the ingestion
    /// path and the query path resolve coins through here; unknown slugs are
    /// `None`, never an error.
    pub fn from_slug(slug: &str) -> Option<CoinType> {
        match slug.to_lowercase().as_str() {
            "bitcoin" => Some(CoinType::Bitcoin),
            "ethereum" => Some(CoinType::Ethereum),
            "matic-network" => Some(CoinType::MaticNetwork),
            _ => None,
        }
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetched price record that passed validation and is ready to persist.
/// Timestamps are assigned by the store at insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceCandidate {
    pub currency_name: CoinType,
    pub usd: f64,
    pub usd_market_cap: f64,
    pub usd_24h_change: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid price data for {coin}: bad fields {fields:?}")]
pub struct ValidationError {
    pub coin: CoinType,
    pub fields: Vec<&'static str>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl PriceCandidate {
    /// Validate one coin's slice of the upstream response. A missing field
    /// and a non-finite value both fail, naming every offending field.
    pub fn from_api(coin: CoinType, data: &CoinPriceData) -> Result<PriceCandidate, ValidationError> {
        match (
            finite(data.usd),
            finite(data.usd_market_cap),
            finite(data.usd_24h_change),
        ) {
            (Some(usd), Some(usd_market_cap), Some(usd_24h_change)) => Ok(PriceCandidate {
                currency_name: coin,
                usd,
                usd_market_cap,
                usd_24h_change,
            }),
            (usd, usd_market_cap, usd_24h_change) => {
                let mut fields = Vec::new();
                if usd.is_none() {
                    fields.push("usd");
                }
                if usd_market_cap.is_none() {
                    fields.push("usd_market_cap");
                }
                if usd_24h_change.is_none() {
                    fields.push("usd_24h_change");
                }
                Err(ValidationError { coin, fields })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CoinQuery {
    pub coin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub price: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: f64,
    #[serde(rename = "24hChange")]
    pub change_24h: f64,
    #[serde(rename = "lastUpdated")]
    pub last_updated: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationResponse {
    #[serde(rename = "stdDeviation")]
    pub std_deviation: f64,
    #[serde(rename = "dataPoints")]
    pub data_points: usize,
    #[serde(rename = "lastUpdated")]
    pub last_updated: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
