use sea_orm_migration::prelude::*;

/// Adds the `posts.times_sent` counter to files created before it existed.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Posts::Table)
                    .add_column(ColumnDef::new(Posts::TimesSent).integer().not_null().default(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(Table::alter().table(Posts::Table).drop_column(Posts::TimesSent).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    TimesSent,
}
