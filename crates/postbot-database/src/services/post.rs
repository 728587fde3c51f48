use chrono::NaiveDateTime;
use sea_orm::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, IntoActiveModel, QueryOrder, TransactionTrait};

use postbot_common::chrono_utils;
use postbot_entities::{post, post_weekly_schedule};

#[derive(Clone, Debug)]
pub struct Service {
    db: DatabaseConnection,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),
    #[error("Post {0} not found")]
    PostNotFound(i32),
    #[error("Schedule entry {0} not found")]
    EntryNotFound(i32),
}

impl Service {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_post(&self, copy_from_chat_id: i64, copy_from_message_id: i32) -> Result<post::Model, Error> {
        let post = post::ActiveModel {
            copy_from_chat_id: ActiveValue::Set(copy_from_chat_id),
            copy_from_message_id: ActiveValue::Set(copy_from_message_id),
            ..Default::default()
        }
            .insert(&self.db)
            .await?;

        tracing::debug!("Post created: {:?}", post);

        Ok(post)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_post(&self, post_id: i32) -> Result<Option<post::Model>, Error> {
        Ok(post::Entity::find_by_id(post_id).one(&self.db).await?)
    }

    /// Schedules a post weekly. The entry only becomes due at its next slot.
    #[tracing::instrument(skip(self))]
    pub async fn add_schedule_entry(&self, post_id: i32, weekday: i32, hour: i32, minute: i32) -> Result<post_weekly_schedule::Model, Error> {
        post_weekly_schedule::validate_slot(weekday, hour, minute)?;

        if post::Entity::find_by_id(post_id).one(&self.db).await?.is_none() {
            return Err(Error::PostNotFound(post_id));
        }

        let entry = post_weekly_schedule::ActiveModel {
            post_id: ActiveValue::Set(post_id),
            weekday: ActiveValue::Set(weekday),
            hour: ActiveValue::Set(hour),
            minute: ActiveValue::Set(minute),
            last_invoked: ActiveValue::Set(chrono_utils::now_timestamp()),
            ..Default::default()
        }
            .insert(&self.db)
            .await?;

        Ok(entry)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_schedule(&self, post_id: i32) -> Result<Vec<post_weekly_schedule::Model>, Error> {
        let entries = post_weekly_schedule::Entity::find()
            .filter(post_weekly_schedule::Column::PostId.eq(post_id))
            .order_by_asc(post_weekly_schedule::Column::Weekday)
            .order_by_asc(post_weekly_schedule::Column::Hour)
            .order_by_asc(post_weekly_schedule::Column::Minute)
            .all(&self.db)
            .await?;

        Ok(entries)
    }

    /// Entries whose slot came around since they were last invoked, with their posts.
    #[tracing::instrument(skip(self))]
    pub async fn due_entries(&self, now: NaiveDateTime) -> Result<Vec<(post_weekly_schedule::Model, post::Model)>, Error> {
        let due = post_weekly_schedule::Entity::find()
            .find_also_related(post::Entity)
            .order_by_asc(post_weekly_schedule::Column::EntryId)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(entry, parent)| match parent {
                Some(parent) if entry.is_due(now) => Some((entry, parent)),
                _ => None,
            })
            .collect::<Vec<_>>();

        log::debug!("{} schedule entries due at {}", due.len(), now);

        Ok(due)
    }

    /// Records that an entry's post was sent at `at`.
    #[tracing::instrument(skip(self))]
    pub async fn mark_invoked(&self, entry_id: i32, at: NaiveDateTime) -> Result<post_weekly_schedule::Model, Error> {
        let txn = self.db.begin().await?;

        let mut entry = post_weekly_schedule::Entity::find_by_id(entry_id)
            .one(&txn)
            .await?
            .ok_or(Error::EntryNotFound(entry_id))?
            .into_active_model();
        entry.last_invoked = ActiveValue::Set(chrono_utils::to_timestamp(at));
        let entry = entry.update(&txn).await?;

        post::Entity::update_many()
            .col_expr(post::Column::TimesSent, Expr::col(post::Column::TimesSent).add(1))
            .filter(post::Column::PostId.eq(entry.post_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::debug!(
            "Schedule entry {} invoked at {:?}",
            entry.entry_id,
            chrono_utils::from_timestamp(entry.last_invoked),
        );

        Ok(entry)
    }

    /// Deletes a post together with its schedule.
    #[tracing::instrument(skip(self))]
    pub async fn delete_post(&self, post_id: i32) -> Result<(), Error> {
        let txn = self.db.begin().await?;

        post_weekly_schedule::Entity::delete_many()
            .filter(post_weekly_schedule::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?;

        let result = post::Entity::delete_by_id(post_id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(Error::PostNotFound(post_id));
        }

        txn.commit().await?;

        Ok(())
    }
}
