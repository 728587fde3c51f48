use std::ops::RangeInclusive;

use chrono::{Datelike, Days, NaiveDateTime};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;

pub const WEEKDAYS: RangeInclusive<i32> = 0..=6;
pub const HOURS: RangeInclusive<i32> = 0..=23;
pub const MINUTES: RangeInclusive<i32> = 0..=59;

/// One weekly slot at which a post is due to be sent.
///
/// `weekday` counts from Monday (0) to Sunday (6); `last_invoked` is a unix
/// timestamp in seconds.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, serde::Serialize, serde::Deserialize)]
#[sea_orm(table_name = "post_weekly_schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub entry_id: i32,

    #[sea_orm(not_null)]
    pub post_id: i32,

    pub weekday: i32,
    pub hour: i32,
    pub minute: i32,
    pub last_invoked: i64,
}

impl Model {
    /// The latest instant at or before `now` that falls on this slot.
    pub fn last_occurrence(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        validate_slot(self.weekday, self.hour, self.minute).ok()?;

        let days_back = (now.weekday().num_days_from_monday() as i32 - self.weekday).rem_euclid(7);
        let candidate = now
            .date()
            .checked_sub_days(Days::new(days_back as u64))?
            .and_hms_opt(self.hour as u32, self.minute as u32, 0)?;

        if candidate > now {
            candidate.checked_sub_days(Days::new(7))
        } else {
            Some(candidate)
        }
    }

    /// Whether the slot has come around since `last_invoked`.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.last_occurrence(now)
            .map(|occurrence| occurrence.and_utc().timestamp() > self.last_invoked)
            .unwrap_or(false)
    }
}

/// Checks that a slot names a real weekday and time of day.
pub fn validate_slot(weekday: i32, hour: i32, minute: i32) -> Result<(), DbErr> {
    check_range("weekday", weekday, WEEKDAYS)?;
    check_range("hour", hour, HOURS)?;
    check_range("minute", minute, MINUTES)
}

fn check_range(field: &str, value: i32, range: RangeInclusive<i32>) -> Result<(), DbErr> {
    if range.contains(&value) {
        return Ok(());
    }

    Err(DbErr::Custom(format!(
        "schedule {} {} is outside {}..={}",
        field,
        value,
        range.start(),
        range.end()
    )))
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::PostId"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

fn known(value: &ActiveValue<i32>) -> Option<i32> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(*v),
        ActiveValue::NotSet => None,
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        // Partial updates only carry some of the fields.
        for (field, value, range) in [
            ("weekday", &self.weekday, WEEKDAYS),
            ("hour", &self.hour, HOURS),
            ("minute", &self.minute, MINUTES),
        ] {
            if let Some(value) = known(value) {
                check_range(field, value, range)?;
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn entry(weekday: i32, hour: i32, minute: i32, last_invoked: i64) -> Model {
        Model {
            entry_id: 1,
            post_id: 1,
            weekday,
            hour,
            minute,
            last_invoked,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn last_occurrence_same_day_after_slot() {
        // 2024-06-17 is a Monday.
        let now = at(2024, 6, 17, 12, 30);
        assert_eq!(entry(0, 9, 15, 0).last_occurrence(now), Some(at(2024, 6, 17, 9, 15)));
    }

    #[test]
    fn last_occurrence_same_day_before_slot_wraps_a_week() {
        let now = at(2024, 6, 17, 8, 0);
        assert_eq!(entry(0, 9, 15, 0).last_occurrence(now), Some(at(2024, 6, 10, 9, 15)));
    }

    #[test]
    fn last_occurrence_earlier_weekday() {
        // Sunday slot seen from Wednesday.
        let now = at(2024, 6, 19, 0, 0);
        assert_eq!(entry(6, 23, 59, 0).last_occurrence(now), Some(at(2024, 6, 16, 23, 59)));
    }

    #[test]
    fn exact_slot_counts_as_occurred() {
        let now = at(2024, 6, 21, 18, 0);
        assert_eq!(entry(4, 18, 0, 0).last_occurrence(now), Some(now));
    }

    #[test]
    fn due_only_once_per_slot() {
        let now = at(2024, 6, 17, 12, 30);
        let slot = at(2024, 6, 17, 9, 15).and_utc().timestamp();

        assert!(entry(0, 9, 15, slot - 1).is_due(now));
        assert!(!entry(0, 9, 15, slot).is_due(now));
        assert!(!entry(0, 9, 15, slot + 60).is_due(now));
    }

    #[test]
    fn invalid_slot_is_never_due() {
        let now = at(2024, 6, 17, 12, 30);
        assert_eq!(entry(7, 0, 0, 0).last_occurrence(now), None);
        assert!(!entry(0, 24, 0, 0).is_due(now));
    }

    #[test]
    fn validate_slot_bounds() {
        assert!(validate_slot(0, 0, 0).is_ok());
        assert!(validate_slot(6, 23, 59).is_ok());
        assert!(validate_slot(-1, 0, 0).is_err());
        assert!(validate_slot(0, 24, 0).is_err());
        assert!(validate_slot(0, 0, 60).is_err());
    }
}
