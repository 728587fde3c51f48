use sea_orm::prelude::*;
use sea_orm::{ActiveValue, IntoActiveModel, QueryOrder};

use postbot_entities::{request, user};

#[derive(Clone, Debug)]
pub struct Service {
    db: DatabaseConnection,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),
    #[error("User {0} not found")]
    NotFound(i64),
}

impl Service {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_or_find_user(&self, user_id: i64, status: String, name: String, username: String) -> Result<user::Model, Error> {
        if let Some(user) = user::Entity::find_by_id(user_id).one(&self.db).await? {
            return Ok(user);
        }

        let user = user::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            status: ActiveValue::Set(status),
            name: ActiveValue::Set(name),
            username: ActiveValue::Set(username),
        }
            .insert(&self.db).await?;

        tracing::debug!("User created: {:?}", user);

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<user::Model>, Error> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_status(&self, user_id: i64, status: String) -> Result<user::Model, Error> {
        let mut user = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(Error::NotFound(user_id))?
            .into_active_model();

        user.status = ActiveValue::Set(status);

        Ok(user.update(&self.db).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_requests(&self, user_id: i64) -> Result<Vec<request::Model>, Error> {
        let requests = request::Entity::find()
            .filter(request::Column::UserId.eq(user_id))
            .order_by_asc(request::Column::RequestId)
            .all(&self.db)
            .await?;

        Ok(requests)
    }
}
