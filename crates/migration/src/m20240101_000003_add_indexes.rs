use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Domain: listing filters by status
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_domain_status")
                    .table(Domain::Table)
                    .col(Domain::Status)
                    .to_owned(),
            )
            .await?;

        // Domain: default listing order is newest first
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_domain_created_at")
                    .table(Domain::Table)
                    .col(Domain::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_domain_created_at").table(Domain::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_domain_status").table(Domain::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Domain { Table, Status, CreatedAt }
