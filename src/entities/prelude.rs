pub use super::price_entries::Entity as PriceEntries;
