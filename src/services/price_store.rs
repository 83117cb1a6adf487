//! Persistence gateway for the price_entries table.
//!
//! Every read and write of stored price snapshots goes through here. Rows are
//! append-only; nothing updates or deletes them.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::price_entries;
use crate::entities::prelude::PriceEntries;
use crate::models::crypto::{CoinType, PriceCandidate};

/// Insert one validated snapshot. The gateway assigns both timestamps.
pub async fn insert_entry(
    db: &DatabaseConnection,
    candidate: &PriceCandidate,
) -> Result<price_entries::Model, DbErr> {
    let now = Utc::now().naive_utc();

    let entry = price_entries::ActiveModel {
        currency_name: Set(candidate.currency_name.as_str().to_string()),
        usd: Set(candidate.usd),
        usd_market_cap: Set(candidate.usd_market_cap),
        usd_24h_change: Set(candidate.usd_24h_change),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    entry.insert(db).await
}

/// Most recent entry for a coin, by `created_at`.
pub async fn find_latest(
    db: &DatabaseConnection,
    coin: CoinType,
) -> Result<Option<price_entries::Model>, DbErr> {
    PriceEntries::find()
        .filter(price_entries::Column::CurrencyName.eq(coin.as_str()))
        .order_by(price_entries::Column::CreatedAt, Order::Desc)
        .one(db)
        .await
}

/// Up to `limit` most recent entries for a coin, newest first.
pub async fn find_recent(
    db: &DatabaseConnection,
    coin: CoinType,
    limit: u64,
) -> Result<Vec<price_entries::Model>, DbErr> {
    PriceEntries::find()
        .filter(price_entries::Column::CurrencyName.eq(coin.as_str()))
        .order_by(price_entries::Column::CreatedAt, Order::Desc)
        .limit(limit)
        .all(db)
        .await
}
