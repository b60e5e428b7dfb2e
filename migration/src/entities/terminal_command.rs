use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "terminal_commands")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: String,
    pub owner_id: i64,
    #[sea_orm(column_type = "Text")]
    pub command: String,
    /// JSON 编码的执行结果
    #[sea_orm(column_type = "Text")]
    pub result: String,
    pub executed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::terminal_session::Entity",
        from = "Column::SessionId",
        to = "super::terminal_session::Column::SessionId",
        on_delete = "Cascade"
    )]
    Session,
}

impl Related<super::terminal_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
