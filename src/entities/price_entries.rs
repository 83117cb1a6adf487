//! `SeaORM` Entity for price_entries table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub currency_name: String,
    pub usd: f64,
    pub usd_market_cap: f64,
    pub usd_24h_change: f64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
