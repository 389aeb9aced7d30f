use std::str::FromStr;

use crate::{
    api::{attachment, error::ViewError, is_month, payslips::payslip_pdf},
    model::{
        salary_transaction::rows_from_response,
        staff::Staff,
    },
    report::{
        excel::{EXPORT_FILE_NAME, export_rows},
        pipeline::{
            PageInfo, REPORT_PAGE_SIZE, ReportRow, SortField, SortOrder, TableQuery, enrich,
            filter_rows, paginate, sort_rows,
        },
    },
    state::{AppState, ReportBoard},
};
use actix_web::{HttpResponse, web};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Trailing `(id)` of a staff picker label.
static OPTION_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)\s*$").expect("valid regex"));

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, ToSchema)]
pub enum ReportType {
    #[strum(serialize = "All Staff - All Months")]
    #[serde(rename = "All Staff - All Months")]
    AllStaffAllMonths,
    #[strum(serialize = "All Staff - Specific Month")]
    #[serde(rename = "All Staff - Specific Month")]
    AllStaffSpecificMonth,
    #[strum(serialize = "All Staff - Latest Month")]
    #[serde(rename = "All Staff - Latest Month")]
    AllStaffLatestMonth,
    #[strum(serialize = "All Staff - Month Range")]
    #[serde(rename = "All Staff - Month Range")]
    AllStaffMonthRange,
    #[strum(serialize = "Specific Staff - All Months")]
    #[serde(rename = "Specific Staff - All Months")]
    SpecificStaffAllMonths,
    #[strum(serialize = "Specific Staff - Specific Month")]
    #[serde(rename = "Specific Staff - Specific Month")]
    SpecificStaffSpecificMonth,
    #[strum(serialize = "Specific Staff - Latest Month")]
    #[serde(rename = "Specific Staff - Latest Month")]
    SpecificStaffLatestMonth,
}

/// Report selection form. `reportType` stays free text so an unknown
/// value gets the form's own message instead of a decode error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    #[schema(example = "All Staff - Specific Month")]
    pub report_type: String,
    /// Staff id, or a picker label such as `Asha Rao (3)`.
    #[schema(example = "Asha Rao (3)")]
    pub staff: Option<String>,
    #[schema(example = "2025-03")]
    pub month: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StaffOption {
    #[schema(example = "3")]
    pub id: String,
    #[schema(example = "Asha Rao (3)")]
    pub label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub rows: Vec<ReportRow>,
    pub pagination: PageInfo,
    pub sort: SortField,
    pub order: SortOrder,
}

/// Accepts either a bare id or a picker label ending in `(id)`.
pub fn parse_staff_id(option: &str) -> String {
    let option = option.trim();
    OPTION_ID
        .captures(option)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| option.to_string())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn checked_month(month: &str) -> Result<&str, ViewError> {
    if is_month(month) {
        Ok(month)
    } else {
        Err(ViewError::validation(
            "Invalid month format. Please select a valid month.",
        ))
    }
}

/// Staff ids become a path segment, so only digits get through.
fn checked_staff(option: &str) -> Result<String, ViewError> {
    let id = parse_staff_id(option);
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(id)
    } else {
        Err(ViewError::validation("Please select a valid staff."))
    }
}

/// Backend path (relative to `/api/hr/salary-transactions`) for a report selection.
pub fn report_endpoint(req: &ReportRequest) -> Result<String, ViewError> {
    let kind = ReportType::from_str(req.report_type.trim())
        .map_err(|_| ViewError::validation("Please select a valid report type."))?;
    let staff = present(&req.staff);
    let month = present(&req.month);

    let endpoint = match kind {
        ReportType::AllStaffAllMonths => String::new(),
        ReportType::AllStaffSpecificMonth => {
            let month = month.ok_or_else(|| ViewError::validation("Please choose a month."))?;
            format!("/month?month={}", checked_month(month)?)
        }
        ReportType::AllStaffLatestMonth => "/latest".to_string(),
        ReportType::AllStaffMonthRange => {
            match (present(&req.start_month), present(&req.end_month)) {
                (Some(start), Some(end)) => format!(
                    "/range?start={}&end={}",
                    checked_month(start)?,
                    checked_month(end)?
                ),
                _ => return Err(ViewError::validation("Please choose start and end month.")),
            }
        }
        ReportType::SpecificStaffAllMonths => {
            let staff = staff.ok_or_else(|| ViewError::validation("Please choose a staff."))?;
            format!("/staff/{}/all", checked_staff(staff)?)
        }
        ReportType::SpecificStaffSpecificMonth => match (staff, month) {
            (Some(staff), Some(month)) => format!(
                "/staff/{}/month?month={}",
                checked_staff(staff)?,
                checked_month(month)?
            ),
            _ => return Err(ViewError::validation("Please choose staff and month.")),
        },
        ReportType::SpecificStaffLatestMonth => {
            let staff = staff.ok_or_else(|| ViewError::validation("Please choose a staff."))?;
            format!("/staff/{}/latest", checked_staff(staff)?)
        }
    };

    Ok(endpoint)
}

fn lock_board(state: &AppState) -> Result<std::sync::MutexGuard<'_, ReportBoard>, ViewError> {
    state
        .reports
        .lock()
        .map_err(|_| ViewError::Render("report state poisoned".into()))
}

/// Enriched, filtered, sorted and paged view of the stored report set.
pub fn build_page(board: &ReportBoard, query: &TableQuery) -> ReportPage {
    let rows = enrich(&board.rows, &board.directory);
    let mut rows = filter_rows(rows, &query.search);
    sort_rows(&mut rows, query.sort, query.order);
    let (rows, pagination) = paginate(&rows, query.page, REPORT_PAGE_SIZE);
    ReportPage {
        rows,
        pagination,
        sort: query.sort,
        order: query.order,
    }
}

/// Staff picker options for the report form
#[utoipa::path(
    get,
    path = "/adminDashboard/reports/staff",
    responses(
        (status = 200, body = [StaffOption]),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(name = "reports_staff", skip(state))]
pub async fn staff_options(state: web::Data<AppState>) -> Result<HttpResponse, ViewError> {
    let directory: Vec<Staff> = match state.views.report_directory.get_as("").await {
        Ok(list) => list,
        Err(e) => {
            error!(error = %e, "Failed to load staff");
            if !e.is_cancelled() {
                lock_board(&state)?.directory.clear();
            }
            return Err(e.into());
        }
    };

    let options: Vec<StaffOption> = directory
        .iter()
        .map(|s| StaffOption {
            id: s.id.to_string(),
            label: s.option_label(),
        })
        .collect();

    lock_board(&state)?.directory = directory;
    Ok(HttpResponse::Ok().json(options))
}

/// Run a report query and keep the result for the table views
#[utoipa::path(
    post,
    path = "/adminDashboard/reports/fetch",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "First page of the new result set", body = ReportPage),
        (status = 400, description = "Incomplete selection", body = Object, example = json!({
            "error": "Please choose a month."
        })),
        (status = 409, description = "Superseded by a newer query", body = Object),
        (status = 502, description = "Backend failure", body = Object, example = json!({
            "error": "Error fetching reports. See console."
        }))
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(name = "reports_fetch", skip(state, req), fields(report_type = %req.report_type))]
pub async fn fetch_reports(
    state: web::Data<AppState>,
    req: web::Json<ReportRequest>,
) -> Result<HttpResponse, ViewError> {
    let endpoint = report_endpoint(&req)?;

    let data = state
        .views
        .reports
        .get(&endpoint)
        .await
        .map_err(|e| ViewError::upstream_as(e, "Error fetching reports. See console."))?;

    let rows = rows_from_response(data).map_err(|e| {
        error!(error = %e, "Unreadable report rows");
        ViewError::Upstream("Error fetching reports. See console.".into())
    })?;

    info!(rows = rows.len(), "Reports fetched");

    let mut board = lock_board(&state)?;
    board.rows = rows;
    let page = build_page(&board, &TableQuery {
        page: 1,
        ..Default::default()
    });
    Ok(HttpResponse::Ok().json(page))
}

/// Search, sort and page the last fetched report set
#[utoipa::path(
    get,
    path = "/adminDashboard/reports",
    params(TableQuery),
    responses((status = 200, body = ReportPage)),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
pub async fn report_table(
    state: web::Data<AppState>,
    query: web::Query<TableQuery>,
) -> Result<HttpResponse, ViewError> {
    let board = lock_board(&state)?;
    let page = build_page(&board, &query);
    debug!(page = page.pagination.page, total = page.pagination.total, "Report page");
    Ok(HttpResponse::Ok().json(page))
}

/// Export every fetched row as `SalaryReports.xlsx`
#[utoipa::path(
    get,
    path = "/adminDashboard/reports/export",
    responses(
        (status = 200, description = "Workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Nothing fetched yet", body = Object, example = json!({
            "error": "No reports to export!"
        }))
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(name = "reports_export", skip(state))]
pub async fn export_reports(state: web::Data<AppState>) -> Result<HttpResponse, ViewError> {
    let rows = {
        let board = lock_board(&state)?;
        enrich(&board.rows, &board.directory)
    };
    if rows.is_empty() {
        return Err(ViewError::validation("No reports to export!"));
    }

    let bytes = export_rows(&rows).map_err(|e| {
        error!(error = %e, "Excel export failed");
        ViewError::Render("Failed to build the spreadsheet".into())
    })?;

    info!(rows = rows.len(), "Reports exported");
    Ok(attachment(bytes, EXPORT_FILE_NAME, XLSX_CONTENT_TYPE))
}

/// Download the payslip PDF of one fetched row
#[utoipa::path(
    get,
    path = "/adminDashboard/reports/{row_id}/payslip",
    params(("row_id" = u64, Path, description = "Salary transaction id")),
    responses(
        (status = 200, description = "Payslip", content_type = "application/pdf"),
        (status = 404, description = "Row not in the current result set", body = Object),
        (status = 502, description = "Staff details unavailable", body = Object, example = json!({
            "error": "Failed to fetch employee details"
        }))
    ),
    tag = "Reports",
    security(("bearer_auth" = []))
)]
#[instrument(name = "reports_payslip", skip(state))]
pub async fn download_payslip(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ViewError> {
    let row_id = path.into_inner();
    let row = {
        let board = lock_board(&state)?;
        enrich(&board.rows, &board.directory)
            .into_iter()
            .find(|r| r.id == Some(row_id))
    }
    .ok_or_else(|| ViewError::NotFound("Invalid report data.".into()))?;

    let staff_id = row
        .staff_id
        .clone()
        .ok_or_else(|| ViewError::NotFound("Invalid report data.".into()))?;

    let staff: Staff = state
        .views
        .payslip_staff
        .get_as(&format!("/{}", staff_id))
        .await
        .map_err(|e| ViewError::upstream_as(e, "Failed to fetch employee details"))?;

    payslip_pdf(&state, &row, Some(&staff)).await
}
