use chrono::{DateTime, SubsecRound, Utc};

/// Current time at microsecond precision, so values survive a Postgres
/// round trip unchanged.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn unix_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}
