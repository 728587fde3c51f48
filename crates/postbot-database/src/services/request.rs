use sea_orm::prelude::*;
use sea_orm::{ActiveValue, IntoActiveModel, QueryOrder};

use postbot_common::chrono_utils;
use postbot_entities::request;

#[derive(Clone, Debug)]
pub struct Service {
    db: DatabaseConnection,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),
    #[error("Request {0} not found")]
    NotFound(i32),
    #[error("Request {0} is already closed")]
    AlreadyClosed(i32),
}

impl Service {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self))]
    pub async fn open_request(&self, user_id: i64) -> Result<request::Model, Error> {
        let request = request::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            opened_at: ActiveValue::Set(chrono_utils::now()),
            closed_at: ActiveValue::Set(None),
            request_status: ActiveValue::Set(None),
            ..Default::default()
        }
            .insert(&self.db)
            .await?;

        tracing::debug!("Request opened: {:?}", request);

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_request(&self, request_id: i32) -> Result<Option<request::Model>, Error> {
        Ok(request::Entity::find_by_id(request_id).one(&self.db).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn close_request(&self, request_id: i32, status: Option<String>) -> Result<request::Model, Error> {
        let request = request::Entity::find_by_id(request_id)
            .one(&self.db)
            .await?
            .ok_or(Error::NotFound(request_id))?;

        if !request.is_open() {
            return Err(Error::AlreadyClosed(request_id));
        }

        let mut request = request.into_active_model();
        request.closed_at = ActiveValue::Set(Some(chrono_utils::now()));
        request.request_status = ActiveValue::Set(status);

        let request = request.update(&self.db).await?;

        tracing::debug!("Request closed: {:?}", request);

        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_open_requests(&self, user_id: i64) -> Result<Vec<request::Model>, Error> {
        let requests = request::Entity::find()
            .filter(request::Column::UserId.eq(user_id))
            .filter(request::Column::ClosedAt.is_null())
            .order_by_asc(request::Column::OpenedAt)
            .order_by_asc(request::Column::RequestId)
            .all(&self.db)
            .await?;

        Ok(requests)
    }
}
