//! Create `user` table.
//!
//! Accounts that sign in to the CMS; `domains_id` keeps the comma-joined
//! ids of the domains a user manages.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_len(User::FirstName, 100).not_null())
                    .col(string_len(User::LastName, 100).not_null().default(""))
                    .col(string_len(User::Email, 255).unique_key().not_null())
                    .col(string(User::Password).not_null())
                    .col(string_len(User::Phone, 32).not_null().default(""))
                    .col(text(User::DomainsId).not_null().default(""))
                    .col(string_len(User::AccessRight, 32).not_null().default(""))
                    .col(timestamp_with_time_zone(User::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, FirstName, LastName, Email, Password, Phone, DomainsId, AccessRight, CreatedAt, UpdatedAt }
