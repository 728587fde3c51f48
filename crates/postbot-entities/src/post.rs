use sea_orm::entity::prelude::*;

/// A message to be re-sent by copying it from the chat it was first posted in.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub post_id: i32,

    #[sea_orm(not_null)]
    pub copy_from_chat_id: i64,
    #[sea_orm(not_null)]
    pub copy_from_message_id: i32,

    #[sea_orm(default_value = 0)]
    pub times_sent: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_weekly_schedule::Entity")]
    ScheduleEntries,
}

impl Related<super::post_weekly_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
