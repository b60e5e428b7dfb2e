use sea_orm_migration::prelude::*;

use crate::m20260301_000001_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 terminal_sessions 表
        manager
            .create_table(
                Table::create()
                    .table(TerminalSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TerminalSession::SessionId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TerminalSession::OwnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TerminalSession::Name).string_len(100).null())
                    .col(
                        ColumnDef::new(TerminalSession::State)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(TerminalSession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TerminalSession::ClosedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_terminal_sessions_owner")
                            .from(TerminalSession::Table, TerminalSession::OwnerId)
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
                    .name("idx_terminal_sessions_owner")
                    .table(TerminalSession::Table)
                    .col(TerminalSession::OwnerId)
                    .to_owned(),
            )
            .await?;

        // 创建 terminal_commands 表（随会话级联删除）
        manager
            .create_table(
                Table::create()
                    .table(TerminalCommand::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TerminalCommand::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TerminalCommand::SessionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TerminalCommand::OwnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TerminalCommand::Command).text().not_null())
                    .col(ColumnDef::new(TerminalCommand::Result).text().not_null())
                    .col(
                        ColumnDef::new(TerminalCommand::ExecutedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_terminal_commands_session")
                            .from(TerminalCommand::Table, TerminalCommand::SessionId)
                            .to(TerminalSession::Table, TerminalSession::SessionId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_terminal_commands_session")
                    .table(TerminalCommand::Table)
                    .col(TerminalCommand::SessionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_terminal_commands_session")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TerminalCommand::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_terminal_sessions_owner").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TerminalSession::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TerminalSession {
    #[sea_orm(iden = "terminal_sessions")]
    Table,
    SessionId,
    OwnerId,
    Name,
    State,
    CreatedAt,
    ClosedAt,
}

#[derive(DeriveIden)]
enum TerminalCommand {
    #[sea_orm(iden = "terminal_commands")]
    Table,
    Id,
    SessionId,
    OwnerId,
    Command,
    Result,
    ExecutedAt,
}
