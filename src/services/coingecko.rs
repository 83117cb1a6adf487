//! CoinGecko price source client.
//!
//! Issues one batched `/simple/price` call for the whole tracked coin set.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::models::crypto::CoinType;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Environment variable for the API base URL
const ENV_BASE_URL: &str = "COINGECKO_BASE_URL";

/// Environment variable for the optional API key
const ENV_API_KEY: &str = "COINGECKO_API_KEY";

/// One coin's slice of the `/simple/price` response. Fields the upstream
/// omitted deserialize as `None` and fail validation for that coin alone
/// instead of aborting the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoinPriceData {
    pub usd: Option<f64>,
    pub usd_market_cap: Option<f64>,
    pub usd_24h_change: Option<f64>,
}

/// Response keyed by coin slug. A tracked coin can be absent entirely.
pub type SimplePriceResponse = HashMap<String, CoinPriceData>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("price api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("price api returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Clone)]
pub struct CoinGeckoService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoService {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            base_url,
            api_key,
        }
    }

    pub fn from_env() -> Self {
        let base_url = env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = env::var(ENV_API_KEY).ok().filter(|key| !key.is_empty());
        Self::new(base_url, api_key)
    }

    /// Fetch current price, market cap and 24h change for `coins` in a single
    /// request. Coins the upstream silently dropped are simply absent from
    /// the returned map; only transport problems and non-2xx statuses error.
    pub async fn fetch_simple_prices(
        &self,
        coins: &[CoinType],
    ) -> Result<SimplePriceResponse, FetchError> {
        let ids = coins
            .iter()
            .map(|coin| coin.slug())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/simple/price", self.base_url);

        tracing::debug!(ids = %ids, "Fetching prices from CoinGecko");

        let mut request = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_market_cap", "true"),
                ("include_24hr_change", "true"),
            ]);

        if let Some(key) = &self.api_key {
            request = request.header("x-cg-pro-api-key", key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(FetchError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_price_response() {
        let raw = r#"{
            "bitcoin": {"usd": 64000.5, "usd_market_cap": 1.26e12, "usd_24h_change": -2.31},
            "ethereum": {"usd": 3100.0, "usd_market_cap": 3.7e11, "usd_24h_change": 0.84}
        }"#;

        let response: SimplePriceResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.len(), 2);
        assert_eq!(response["bitcoin"].usd, Some(64000.5));
        assert_eq!(response["ethereum"].usd_24h_change, Some(0.84));
        assert!(!response.contains_key("matic-network"));
    }

    #[test]
    fn test_parse_partial_coin_data() {
        // Upstream dropping a field must not fail the whole-batch parse.
        let raw = r#"{"matic-network": {"usd": 0.72}}"#;

        let response: SimplePriceResponse = serde_json::from_str(raw).unwrap();
        let matic = &response["matic-network"];
        assert_eq!(matic.usd, Some(0.72));
        assert_eq!(matic.usd_market_cap, None);
        assert_eq!(matic.usd_24h_change, None);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_upstream_is_transport_error() {
        let service = CoinGeckoService::new("http://127.0.0.1:9".to_string(), None);

        let err = service
            .fetch_simple_prices(&CoinType::ALL)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
