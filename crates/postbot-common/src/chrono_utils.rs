use chrono::{DateTime, NaiveDateTime, Utc};

/// Current UTC time without an offset, the form every datetime column uses.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn to_timestamp(datetime: NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp()
}

/// Inverse of [`to_timestamp`]. Returns `None` when the value is out of range.
pub fn from_timestamp(timestamp: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(timestamp, 0).map(|d| d.naive_utc())
}

pub fn now_timestamp() -> i64 {
    to_timestamp(now())
}
