use crate::{api::error::ViewError, model::audit_log::AuditLog, state::AppState};
use actix_web::{HttpResponse, web};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

const RECENT_COUNT: usize = 5;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogFilter {
    /// Optional; only applies together with month and year.
    pub day: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub username: Option<String>,
    pub action: Option<String>,
    pub entity_name: Option<String>,
    pub entity_id: Option<String>,
    /// `dd/mm/yyyy`, or `NA` when the timestamp is unreadable.
    #[schema(example = "14/03/2025")]
    pub date: String,
    #[schema(example = "10:22:05")]
    pub time: String,
}

impl From<&AuditLog> for LogEntry {
    fn from(log: &AuditLog) -> Self {
        let (date, time) = match log.logged_at() {
            Some(at) => (
                at.format("%d/%m/%Y").to_string(),
                at.format("%H:%M:%S").to_string(),
            ),
            None => ("NA".to_string(), "NA".to_string()),
        };
        Self {
            username: log.username.clone(),
            action: log.action.clone(),
            entity_name: log.entity_name.clone(),
            entity_id: log.entity_id.clone(),
            date,
            time,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogView {
    #[schema(example = "RECENT LOGS")]
    pub heading: String,
    pub filtered: bool,
    pub logs: Vec<LogEntry>,
}

/// Newest first; entries without a readable timestamp go last.
pub fn sort_newest_first(logs: &mut [AuditLog]) {
    logs.sort_by_key(|log| std::cmp::Reverse(log.logged_at()));
}

fn number(raw: &str) -> Option<u32> {
    raw.parse().ok()
}

/// Picks the entries to show for a filter. `logs` must already be sorted.
pub fn select_logs(logs: &[AuditLog], filter: &LogFilter) -> Result<LogView, ViewError> {
    let day = present(&filter.day);
    let month = present(&filter.month);
    let year = present(&filter.year);

    let (month, year) = match (day, month, year) {
        (None, None, None) => {
            return Ok(LogView {
                heading: "RECENT LOGS".to_string(),
                filtered: false,
                logs: logs.iter().take(RECENT_COUNT).map(LogEntry::from).collect(),
            });
        }
        (_, Some(month), Some(year)) => (month, year),
        _ => return Err(ViewError::validation("Please enter month and year.")),
    };

    let heading = match day {
        Some(day) => format!("LOGS ON : {}/{}/{}", day, month, year),
        None => format!("LOGS ON : {}/{}", month, year),
    };

    let wanted_day = day.map(number);
    let wanted_month = number(month);
    let wanted_year = year.parse::<i32>().ok();

    let logs = logs
        .iter()
        .filter(|log| {
            log.logged_at().is_some_and(|at| {
                Some(at.month()) == wanted_month
                    && Some(at.year()) == wanted_year
                    && wanted_day.is_none_or(|d| d == Some(at.day()))
            })
        })
        .map(LogEntry::from)
        .collect();

    Ok(LogView {
        heading,
        filtered: true,
        logs,
    })
}

/// Audit trail, most recent first
#[utoipa::path(
    get,
    path = "/adminDashboard/audit-logs",
    params(LogFilter),
    responses(
        (status = 200, body = LogView),
        (status = 400, description = "Incomplete filter", body = Object, example = json!({
            "error": "Please enter month and year."
        })),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Audit Logs",
    security(("bearer_auth" = []))
)]
#[instrument(name = "audit_logs", skip(state, filter))]
pub async fn list_audit_logs(
    state: web::Data<AppState>,
    filter: web::Query<LogFilter>,
) -> Result<HttpResponse, ViewError> {
    // Reject a half-filled filter before calling out.
    select_logs(&[], &filter)?;

    let mut logs: Vec<AuditLog> = state
        .views
        .audit_logs
        .get_as::<Option<Vec<AuditLog>>>("")
        .await?
        .unwrap_or_default();
    sort_newest_first(&mut logs);

    let view = select_logs(&logs, &filter)?;
    debug!(shown = view.logs.len(), total = logs.len(), "Audit logs");
    Ok(HttpResponse::Ok().json(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn logs() -> Vec<AuditLog> {
        let mut logs: Vec<AuditLog> = serde_json::from_value(json!([
            {"username": "a", "action": "CREATE", "timestamp": "2025-03-01T09:00:00"},
            {"username": "b", "action": "UPDATE", "timestamp": "2025-03-14T10:22:05"},
            {"username": "c", "action": "DELETE", "timestamp": "not a date"},
            {"username": "d", "action": "UPDATE", "timestamp": "2025-02-14T08:00:00"},
            {"username": "e", "action": "LOGIN", "timestamp": "2025-03-14T18:45:10"},
            {"username": "f", "action": "LOGIN", "timestamp": "2024-03-14T18:45:10"},
            {"username": "g", "action": "LOGIN", "timestamp": "2025-04-02T07:00:00"}
        ]))
        .unwrap();
        sort_newest_first(&mut logs);
        logs
    }

    fn users(view: &LogView) -> Vec<&str> {
        view.logs
            .iter()
            .map(|l| l.username.as_deref().unwrap())
            .collect()
    }

    #[test]
    fn unfiltered_shows_five_most_recent() {
        let view = select_logs(&logs(), &LogFilter::default()).unwrap();
        assert_eq!(view.heading, "RECENT LOGS");
        assert!(!view.filtered);
        assert_eq!(users(&view), vec!["g", "e", "b", "a", "d"]);
    }

    #[test]
    fn month_and_year_filter() {
        let filter = LogFilter {
            day: None,
            month: Some("03".into()),
            year: Some("2025".into()),
        };
        let view = select_logs(&logs(), &filter).unwrap();
        assert_eq!(view.heading, "LOGS ON : 03/2025");
        assert_eq!(users(&view), vec!["e", "b", "a"]);
        assert_eq!(view.logs[0].date, "14/03/2025");
        assert_eq!(view.logs[0].time, "18:45:10");
    }

    #[test]
    fn day_narrows_the_filter() {
        let filter = LogFilter {
            day: Some("14".into()),
            month: Some("3".into()),
            year: Some("2025".into()),
        };
        let view = select_logs(&logs(), &filter).unwrap();
        assert_eq!(view.heading, "LOGS ON : 14/3/2025");
        assert_eq!(users(&view), vec!["e", "b"]);
    }

    #[test]
    fn partial_filter_is_rejected() {
        for filter in [
            LogFilter { day: Some("1".into()), ..Default::default() },
            LogFilter { month: Some("3".into()), ..Default::default() },
            LogFilter { year: Some("2025".into()), day: Some("2".into()), ..Default::default() },
        ] {
            assert_eq!(
                select_logs(&logs(), &filter).unwrap_err().to_string(),
                "Please enter month and year."
            );
        }
    }

    #[test]
    fn unreadable_timestamps_show_na() {
        let entry = LogEntry::from(&AuditLog {
            timestamp: Some("soon".into()),
            ..Default::default()
        });
        assert_eq!((entry.date.as_str(), entry.time.as_str()), ("NA", "NA"));
    }
}
