use crate::{
    api::{attachment, error::ViewError, is_month},
    auth::auth::AuthUser,
    model::{salary_transaction::rows_from_response, staff::Staff},
    report::{
        payslip::{PayslipLayout, build_payslip_source, render_pdf},
        pipeline::{PAYSLIP_PAGE_SIZE, PageInfo, ReportRow, enrich, filter_payslips, paginate},
    },
    state::AppState,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PayslipMode {
    #[default]
    Latest,
    Month,
    All,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PayslipRequest {
    #[serde(default)]
    pub mode: PayslipMode,
    /// `YYYY-MM`, required in `month` mode.
    #[schema(example = "2025-03")]
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayslipQuery {
    /// Matches name, month or net salary.
    #[serde(default)]
    pub search: String,
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PayslipPage {
    pub rows: Vec<ReportRow>,
    pub pagination: PageInfo,
    /// Set when a fetch came back empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "No salary records found.")]
    pub notice: Option<String>,
}

/// Backend path (relative to `/api/staff/salary-transactions`) for one staff member.
pub fn payslip_endpoint(staff_id: u64, req: &PayslipRequest) -> Result<String, ViewError> {
    match req.mode {
        PayslipMode::Latest => Ok(format!("/{}/latest", staff_id)),
        PayslipMode::All => Ok(format!("/{}/all", staff_id)),
        PayslipMode::Month => {
            let month = req
                .month
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .ok_or_else(|| ViewError::validation("Please select a month first"))?;
            if !is_month(month) {
                return Err(ViewError::validation(
                    "Invalid month format. Please select a valid month.",
                ));
            }
            Ok(format!("/{}/month?month={}", staff_id, month))
        }
    }
}

fn empty_notice(req: &PayslipRequest) -> String {
    match (req.mode, req.month.as_deref()) {
        (PayslipMode::Month, Some(month)) => format!("No salary found for {}", month.trim()),
        _ => "No salary records found.".to_string(),
    }
}

fn page_of(rows: Vec<ReportRow>, query: &PayslipQuery) -> (Vec<ReportRow>, PageInfo) {
    let rows = filter_payslips(rows, &query.search);
    paginate(&rows, query.page, PAYSLIP_PAGE_SIZE)
}

fn stored_rows(state: &AppState) -> Result<Vec<ReportRow>, ViewError> {
    let stored = state
        .payslips
        .lock()
        .map_err(|_| ViewError::Render("payslip state poisoned".into()))?;
    Ok(enrich(&stored, &[]))
}

/// Renders one row to a PDF download. Shared by the report and payslip views.
pub async fn payslip_pdf(
    state: &AppState,
    row: &ReportRow,
    staff: Option<&Staff>,
) -> Result<HttpResponse, ViewError> {
    let layout = PayslipLayout::build(row, staff, &state.config.company_name);
    let source = build_payslip_source(&layout, state.logo.is_some());

    let pdf = render_pdf(source, state.logo.clone()).await.map_err(|e| {
        error!(error = %e, "Payslip rendering failed");
        ViewError::Render("Failed to generate payslip".into())
    })?;

    info!(file = %layout.file_name, bytes = pdf.len(), "Payslip generated");
    Ok(attachment(pdf, &layout.file_name, "application/pdf"))
}

/// Load the signed-in staff member's salary records
#[utoipa::path(
    post,
    path = "/staffDashboard/payslips/fetch",
    request_body = PayslipRequest,
    responses(
        (status = 200, description = "First page of the records", body = PayslipPage),
        (status = 400, description = "Missing or malformed month", body = Object, example = json!({
            "error": "Invalid month format. Please select a valid month."
        })),
        (status = 502, description = "Backend failure", body = Object, example = json!({
            "error": "Failed to fetch salary data. Please try again later."
        }))
    ),
    tag = "Payslips",
    security(("bearer_auth" = []))
)]
#[instrument(name = "payslips_fetch", skip(state, req), fields(user_id = user.user_id))]
pub async fn fetch_payslips(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<PayslipRequest>,
) -> Result<HttpResponse, ViewError> {
    let endpoint = payslip_endpoint(user.staff_id(), &req)?;

    let data = state.views.my_payslips.get(&endpoint).await.map_err(|e| {
        ViewError::upstream_as(e, "Failed to fetch salary data. Please try again later.")
    })?;

    let rows = rows_from_response(data).map_err(|e| {
        error!(error = %e, "Unreadable salary records");
        ViewError::Upstream("Failed to fetch salary data. Please try again later.".into())
    })?;

    let notice = rows.is_empty().then(|| empty_notice(&req));
    if let Some(notice) = &notice {
        warn!(notice = %notice, "Empty salary result");
    }

    let enriched = enrich(&rows, &[]);
    *state
        .payslips
        .lock()
        .map_err(|_| ViewError::Render("payslip state poisoned".into()))? = rows;

    let (rows, pagination) = page_of(enriched, &PayslipQuery {
        search: String::new(),
        page: 1,
    });
    Ok(HttpResponse::Ok().json(PayslipPage {
        rows,
        pagination,
        notice,
    }))
}

/// Search and page the loaded salary records
#[utoipa::path(
    get,
    path = "/staffDashboard/payslips",
    params(PayslipQuery),
    responses((status = 200, body = PayslipPage)),
    tag = "Payslips",
    security(("bearer_auth" = []))
)]
pub async fn payslip_table(
    state: web::Data<AppState>,
    query: web::Query<PayslipQuery>,
) -> Result<HttpResponse, ViewError> {
    let (rows, pagination) = page_of(stored_rows(&state)?, &query);
    Ok(HttpResponse::Ok().json(PayslipPage {
        rows,
        pagination,
        notice: None,
    }))
}

/// Download one loaded record as a payslip PDF
#[utoipa::path(
    get,
    path = "/staffDashboard/payslips/{row_id}/download",
    params(("row_id" = u64, Path, description = "Salary transaction id")),
    responses(
        (status = 200, description = "Payslip", content_type = "application/pdf"),
        (status = 404, description = "Row not loaded", body = Object, example = json!({
            "error": "Invalid report data."
        })),
        (status = 502, description = "Staff details unavailable", body = Object)
    ),
    tag = "Payslips",
    security(("bearer_auth" = []))
)]
#[instrument(name = "payslips_download", skip(state))]
pub async fn download_payslip(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ViewError> {
    let row_id = path.into_inner();
    let row = stored_rows(&state)?
        .into_iter()
        .find(|r| r.id == Some(row_id))
        .ok_or_else(|| ViewError::NotFound("Invalid report data.".into()))?;

    let staff_id = row
        .staff_id
        .clone()
        .ok_or_else(|| ViewError::NotFound("Invalid report data.".into()))?;

    let staff: Staff = state
        .views
        .my_details
        .get_as(&format!("/{}", staff_id))
        .await
        .map_err(|e| ViewError::upstream_as(e, "Failed to fetch employee details"))?;

    payslip_pdf(&state, &row, Some(&staff)).await
}
