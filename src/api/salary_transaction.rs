use crate::{api::error::ViewError, model::lenient, state::AppState};
use actix_web::{HttpResponse, web};
use chrono::Datelike;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GenerateForm {
    /// Non-digits are dropped, as the form input does.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(value_type = String, example = "2025")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(value_type = String, example = "03")]
    pub month: Option<String>,
}

fn digits(raw: Option<&str>) -> String {
    raw.unwrap_or("").chars().filter(char::is_ascii_digit).collect()
}

/// Checks a generation period against `current_year`.
pub fn validate_period(form: &GenerateForm, current_year: i32) -> Result<(u32, u32), ViewError> {
    let year = digits(form.year.as_deref());
    let month = digits(form.month.as_deref());
    if year.is_empty() || month.is_empty() {
        return Err(ViewError::validation("Year and month are required."));
    }

    let year: i64 = year
        .parse()
        .map_err(|_| ViewError::validation(format!("Year cannot be greater than {}", current_year)))?;
    if year > i64::from(current_year) {
        return Err(ViewError::validation(format!(
            "Year cannot be greater than {}",
            current_year
        )));
    }

    let month: u32 = month.parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return Err(ViewError::validation("Month must be between 01 and 12"));
    }

    Ok((year as u32, month))
}

/// Generate salaries for every staff member for one month
#[utoipa::path(
    post,
    path = "/adminDashboard/salaries/generate",
    request_body = GenerateForm,
    responses(
        (status = 200, description = "Generated transactions", body = Object, example = json!({
            "message": "Salaries generated",
            "generated": [{"staffId": 3, "salaryMonth": "2025-03"}]
        })),
        (status = 400, description = "Invalid period", body = Object, example = json!({
            "error": "Month must be between 01 and 12"
        })),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Salary Transactions",
    security(("bearer_auth" = []))
)]
#[instrument(name = "salaries_generate", skip(state, form))]
pub async fn generate_salaries(
    state: web::Data<AppState>,
    form: web::Json<GenerateForm>,
) -> Result<HttpResponse, ViewError> {
    let current_year = chrono::Local::now().year();
    let (year, month) = validate_period(&form, current_year)?;

    let generated = state
        .views
        .generate
        .request(
            Method::POST,
            &format!("/generate?year={}&month={}", year, month),
            None,
        )
        .await?;

    info!(year, month, "Salaries generated");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Salaries generated",
        "generated": generated
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(year: &str, month: &str) -> GenerateForm {
        GenerateForm {
            year: Some(year.into()),
            month: Some(month.into()),
        }
    }

    fn message(result: Result<(u32, u32), ViewError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn accepts_a_past_month() {
        assert_eq!(validate_period(&form("2025", "03"), 2026).unwrap(), (2025, 3));
        assert_eq!(validate_period(&form("20x26", "1 2"), 2026).unwrap(), (2026, 12));
    }

    #[test]
    fn rejects_future_years() {
        assert_eq!(
            message(validate_period(&form("2027", "01"), 2026)),
            "Year cannot be greater than 2026"
        );
    }

    #[test]
    fn rejects_out_of_range_months() {
        for month in ["0", "00", "13"] {
            assert_eq!(
                message(validate_period(&form("2025", month), 2026)),
                "Month must be between 01 and 12"
            );
        }
    }

    #[test]
    fn requires_both_fields() {
        assert_eq!(
            message(validate_period(&GenerateForm::default(), 2026)),
            "Year and month are required."
        );
    }
}
