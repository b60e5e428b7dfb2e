use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "terminal_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    pub owner_id: i64,
    pub name: Option<String>,
    /// `open` 或 `closed`
    pub state: String,
    pub created_at: DateTimeUtc,
    pub closed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::terminal_command::Entity")]
    Commands,
}

impl Related<super::terminal_command::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commands.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
