use crate::{
    api::error::ViewError,
    auth::auth::AuthUser,
    client::ApiHandle,
    model::{
        salary_transaction::{SalaryTransaction, rows_from_response},
        staff::Staff,
    },
    state::AppState,
};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

/// Flat amount the overview assumes for every assigned component.
const COMPONENT_ESTIMATE: f64 = 1000.0;

const DEDUCTION_COMPONENTS: [&str; 5] = ["PF", "ESI", "PT", "TDS", "OTHER_DEDUCTIONS"];

/// Organisation-wide estimate built from the staff directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[schema(example = 12)]
    pub total_staff: usize,
    pub total_salaries: f64,
    pub total_deductions: f64,
    pub net_gross: f64,
    /// Component name to number of staff it is assigned to, first-seen order.
    #[schema(value_type = Object, example = json!({"HRA": 9, "PF": 12}))]
    pub component_totals: Map<String, Value>,
}

pub fn overview(directory: &[Staff]) -> Overview {
    let mut summary = Overview {
        total_staff: directory.len(),
        ..Default::default()
    };

    for staff in directory {
        let details = staff.salary_details.as_ref();
        let basic = details.and_then(|d| d.basic_pay).unwrap_or(0.0);
        let components = details.map(|d| d.salary_components.as_slice()).unwrap_or(&[]);

        for name in components {
            let count = summary
                .component_totals
                .get(name)
                .and_then(Value::as_u64)
                .unwrap_or(0);
            summary
                .component_totals
                .insert(name.clone(), Value::from(count + 1));
        }

        let deductions = components
            .iter()
            .filter(|c| DEDUCTION_COMPONENTS.contains(&c.as_str()))
            .count();

        summary.total_salaries += basic + components.len() as f64 * COMPONENT_ESTIMATE;
        summary.total_deductions += deductions as f64 * COMPONENT_ESTIMATE;
    }

    summary.net_gross = summary.total_salaries - summary.total_deductions;
    summary
}

/// Figures of one staff member's most recent salary transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalarySummary {
    #[schema(example = "2025-03")]
    pub salary_month: Option<String>,
    pub gross_salary: f64,
    /// Gross minus basic pay.
    pub allowances: f64,
    pub deductions: f64,
    pub net_salary: f64,
    #[schema(value_type = Object)]
    pub component_breakdown: Map<String, Value>,
}

/// Summarises the last transaction in server order; an empty history is all zeros.
pub fn latest_summary(history: &[SalaryTransaction]) -> SalarySummary {
    let Some(last) = history.last() else {
        return SalarySummary::default();
    };

    let gross = last.gross_salary.unwrap_or(0.0);
    let basic = last.basic_pay.unwrap_or(0.0);
    let deductions = last.total_deductions.unwrap_or(0.0);

    SalarySummary {
        salary_month: last.salary_month.clone(),
        gross_salary: gross,
        allowances: gross - basic,
        deductions,
        net_salary: last.net_salary.unwrap_or(gross - deductions),
        component_breakdown: last.component_breakdown.clone().unwrap_or_default(),
    }
}

async fn summary_from(handle: &ApiHandle, staff_id: u64) -> Result<SalarySummary, ViewError> {
    let data = handle.get(&format!("/{}/all", staff_id)).await?;
    let history = rows_from_response(data).map_err(|e| {
        error!(error = %e, "Unreadable salary history");
        ViewError::Upstream("Failed to load salary history".into())
    })?;
    debug!(staff_id, records = history.len(), "Salary history loaded");
    Ok(latest_summary(&history))
}

/// Salary overview across all staff
#[utoipa::path(
    get,
    path = "/adminDashboard/dashboard",
    responses(
        (status = 200, body = Overview),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
#[instrument(name = "dashboard_overview", skip(state))]
pub async fn staff_overview(state: web::Data<AppState>) -> Result<HttpResponse, ViewError> {
    let directory: Vec<Staff> = state
        .views
        .dashboard
        .get_as::<Option<Vec<Staff>>>("")
        .await?
        .unwrap_or_default();
    Ok(HttpResponse::Ok().json(overview(&directory)))
}

/// Latest salary of the signed-in staff member
#[utoipa::path(
    get,
    path = "/staffDashboard/home",
    responses(
        (status = 200, body = SalarySummary),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
#[instrument(name = "dashboard_home", skip(state), fields(user_id = user.user_id))]
pub async fn staff_home(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ViewError> {
    let summary = summary_from(&state.views.home, user.staff_id()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Latest salary of the signed-in HR user
#[utoipa::path(
    get,
    path = "/hrDashboard/profile",
    responses(
        (status = 200, body = SalarySummary),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []))
)]
#[instrument(name = "dashboard_profile", skip(state), fields(user_id = user.user_id))]
pub async fn hr_profile(
    state: web::Data<AppState>,
    user: AuthUser,
) -> Result<HttpResponse, ViewError> {
    let summary = summary_from(&state.views.profile, user.staff_id()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
