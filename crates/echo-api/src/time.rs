use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without a timezone.
/// Parse as naive UTC and convert; corrupt values degrade to the epoch
/// rather than failing the whole response.
pub(crate) fn parse_db_time(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|naive| naive.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{raw}': {e}");
            DateTime::default()
        })
}
