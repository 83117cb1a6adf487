use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PriceEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PriceEntries::CurrencyName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceEntries::Usd)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceEntries::UsdMarketCap)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceEntries::Usd24hChange)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceEntries::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(PriceEntries::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index for the descending per-coin window queries
        manager
            .create_index(
                Index::create()
                    .name("idx_price_entries_currency_created_at")
                    .table(PriceEntries::Table)
                    .col(PriceEntries::CurrencyName)
                    .col(PriceEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PriceEntries {
    Table,
    Id,
    CurrencyName,
    Usd,
    UsdMarketCap,
    #[sea_orm(iden = "usd_24h_change")]
    Usd24hChange,
    CreatedAt,
    UpdatedAt,
}
