use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub request_id: i32,

    #[sea_orm(not_null)]
    pub user_id: i64,

    pub opened_at: chrono::NaiveDateTime,
    pub closed_at: Option<chrono::NaiveDateTime>,
    pub request_status: Option<String>,
}

impl Model {
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::UserId"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        // Only checkable when both ends are part of the model being saved.
        if let (
            ActiveValue::Set(opened_at) | ActiveValue::Unchanged(opened_at),
            ActiveValue::Set(Some(closed_at)) | ActiveValue::Unchanged(Some(closed_at)),
        ) = (&self.opened_at, &self.closed_at)
        {
            if closed_at < opened_at {
                return Err(DbErr::Custom(format!(
                    "request closed at {} before it was opened at {}",
                    closed_at, opened_at
                )));
            }
        }

        Ok(self)
    }
}
