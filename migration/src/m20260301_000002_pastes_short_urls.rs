use sea_orm_migration::prelude::*;

use crate::m20260301_000001_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 pastes 表
        manager
            .create_table(
                Table::create()
                    .table(Paste::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Paste::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Paste::Content).text().not_null())
                    .col(ColumnDef::new(Paste::OwnerId).big_integer().null())
                    .col(
                        ColumnDef::new(Paste::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Paste::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // 用户删除策略：存在关联记录时拒绝删除
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pastes_owner")
                            .from(Paste::Table, Paste::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pastes_expires_at")
                    .table(Paste::Table)
                    .col(Paste::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        // 创建 short_urls 表
        manager
            .create_table(
                Table::create()
                    .table(ShortUrl::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortUrl::ShortId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortUrl::TargetUrl).text().not_null())
                    .col(ColumnDef::new(ShortUrl::OwnerId).big_integer().null())
                    .col(
                        ColumnDef::new(ShortUrl::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShortUrl::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShortUrl::HitCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_short_urls_owner")
                            .from(ShortUrl::Table, ShortUrl::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_urls_expires_at")
                    .table(ShortUrl::Table)
                    .col(ShortUrl::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_short_urls_expires_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortUrl::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_pastes_expires_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Paste::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Paste {
    #[sea_orm(iden = "pastes")]
    Table,
    Id,
    Content,
    OwnerId,
    CreatedAt,
    ExpiresAt,
}

#[derive(DeriveIden)]
enum ShortUrl {
    #[sea_orm(iden = "short_urls")]
    Table,
    ShortId,
    TargetUrl,
    OwnerId,
    CreatedAt,
    ExpiresAt,
    HitCount,
}
