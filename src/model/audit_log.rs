use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub username: Option<String>,
    #[schema(example = "UPDATE")]
    pub action: Option<String>,
    #[schema(example = "Staff")]
    pub entity_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(value_type = Option<String>)]
    pub entity_id: Option<String>,
    #[schema(example = "2025-03-14T10:22:05")]
    pub timestamp: Option<String>,
}

impl AuditLog {
    /// Wall-clock time of the entry as written by the server, offset ignored.
    pub fn logged_at(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn at(ts: &str) -> AuditLog {
        AuditLog {
            timestamp: Some(ts.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn parses_common_timestamp_shapes() {
        let plain = at("2025-03-14T10:22:05.123").logged_at().unwrap();
        assert_eq!((plain.year(), plain.month(), plain.day()), (2025, 3, 14));

        let zoned = at("2025-03-14T23:30:00+05:30").logged_at().unwrap();
        assert_eq!((zoned.day(), zoned.hour()), (14, 23));

        assert!(at("2025-03-14 08:00:00").logged_at().is_some());
        assert!(at("yesterday").logged_at().is_none());
        assert!(AuditLog::default().logged_at().is_none());
    }
}
