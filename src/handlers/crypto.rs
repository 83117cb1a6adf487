use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info};

use crate::{
    models::crypto::{
        CoinQuery, CoinType, DeviationResponse, ErrorResponse, MessageResponse, StatsResponse,
    },
    services::statistics::{self, DEFAULT_DEVIATION_WINDOW},
    AppState,
};

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn not_found(message: &str) -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn db_error(e: sea_orm::DbErr) -> HandlerError {
    error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

fn parse_coin(query: &CoinQuery) -> Result<CoinType, HandlerError> {
    query
        .coin
        .as_deref()
        .and_then(CoinType::from_slug)
        .ok_or_else(|| bad_request("Invalid coin parameter"))
}

/// Handler for GET /crypto/stats
/// Latest stored price, market cap and 24h change for one tracked coin
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<CoinQuery>,
) -> Result<Json<StatsResponse>, HandlerError> {
    let coin = parse_coin(&query)?;

    let entry = statistics::latest_snapshot(&state.db, coin)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("No data available for the specified coin"))?;

    Ok(Json(StatsResponse {
        price: entry.usd,
        market_cap: entry.usd_market_cap,
        change_24h: entry.usd_24h_change,
        last_updated: entry.updated_at,
    }))
}

/// Handler for GET /crypto/deviation
/// Population standard deviation over the most recent stored prices
pub async fn get_deviation(
    State(state): State<AppState>,
    Query(query): Query<CoinQuery>,
) -> Result<Json<DeviationResponse>, HandlerError> {
    let coin = parse_coin(&query)?;

    let stats = statistics::standard_deviation(&state.db, coin, DEFAULT_DEVIATION_WINDOW)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("No data available for the specified coin"))?;

    Ok(Json(DeviationResponse {
        std_deviation: stats.std_deviation,
        data_points: stats.data_points,
        last_updated: stats.last_updated,
    }))
}

/// Handler for POST /crypto/fetch-and-store
/// Runs the same ingestion pipeline the scheduler triggers
pub async fn fetch_and_store(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, HandlerError> {
    match state.ingestion.run(&state.db).await {
        Ok(report) => {
            info!(
                stored = report.stored_count(),
                skipped = report.skipped_count(),
                "Manual ingestion run finished"
            );
            Ok(Json(MessageResponse {
                message: "Data fetched and stored successfully".to_string(),
            }))
        }
        Err(e) => {
            error!(error = %e, "Manual ingestion run failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch and store data".to_string(),
                }),
            ))
        }
    }
}
