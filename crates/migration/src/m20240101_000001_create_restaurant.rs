//! Create `restaurant` table.
//! Name uniqueness is checked by the application before writes, so the
//! `name` index is a plain lookup index rather than a unique constraint.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurant::Table)
                    .if_not_exists()
                    .col(uuid(Restaurant::Id).primary_key())
                    .col(string_len(Restaurant::Name, 256).not_null())
                    .col(text(Restaurant::Description).not_null())
                    .col(string_len(Restaurant::Address, 512).not_null())
                    .col(string_len(Restaurant::City, 128).not_null())
                    .col(string_len(Restaurant::State, 128).not_null())
                    .col(double(Restaurant::Rating).not_null().default(0.0))
                    .col(integer(Restaurant::ReviewCount).not_null().default(0))
                    .col(json_binary_null(Restaurant::Location))
                    .col(json_binary(Restaurant::Menu).not_null())
                    .col(timestamp_with_time_zone(Restaurant::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Restaurant::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_restaurant_name")
                    .table(Restaurant::Table)
                    .col(Restaurant::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_restaurant_name").table(Restaurant::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(Restaurant::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Restaurant {
    Table,
    Id,
    Name,
    Description,
    Address,
    City,
    State,
    Rating,
    ReviewCount,
    Location,
    Menu,
    CreatedAt,
    UpdatedAt,
}
