//! Create `domain` table.
//!
//! One row per managed site. `logo`/`meta_ico` hold bare upload filenames,
//! `modul` the comma-joined module keys.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Domain::Table)
                    .if_not_exists()
                    .col(pk_auto(Domain::Id))
                    .col(string_len(Domain::Name, 253).unique_key().not_null())
                    .col(string(Domain::Logo).not_null().default(""))
                    .col(string(Domain::MetaTitle).not_null())
                    .col(text(Domain::MetaDesc).not_null().default(""))
                    .col(text(Domain::MetaKeyword).not_null().default(""))
                    .col(string(Domain::MetaIco).not_null().default(""))
                    .col(text(Domain::Modul).not_null().default(""))
                    .col(string_len(Domain::Status, 32).not_null().default(""))
                    .col(timestamp_with_time_zone(Domain::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Domain::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Domain::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Domain { Table, Id, Name, Logo, MetaTitle, MetaDesc, MetaKeyword, MetaIco, Modul, Status, CreatedAt, UpdatedAt }
