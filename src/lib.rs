// src/lib.rs

use sea_orm::DatabaseConnection;
use services::ingestion::IngestionService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub ingestion: IngestionService,
}

pub mod entities {
    pub mod prelude;
    pub mod price_entries;
}

pub mod services {
    pub mod coingecko;
    pub mod ingestion;
    pub mod price_store;
    pub mod statistics;
}

pub mod models;
pub mod handlers;
pub mod jobs;
