use chrono::{DateTime, Local, Utc};

/// Document id derived from the local time: `yyyyMMddHHmmssSSS`
pub fn date_id() -> String {
    date_id_at(&Local::now())
}

fn date_id_at<Tz: chrono::TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y%m%d%H%M%S%3f").to_string()
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
