use crate::api::audit_log::{LogEntry, LogView};
use crate::api::dashboard::{Overview, SalarySummary};
use crate::api::payslips::{PayslipMode, PayslipPage, PayslipRequest};
use crate::api::reports::{ReportPage, ReportRequest, ReportType, StaffOption};
use crate::api::salary_component::ComponentForm;
use crate::api::salary_transaction::GenerateForm;
use crate::api::staff::StaffListResponse;
use crate::model::audit_log::AuditLog;
use crate::model::role::Role;
use crate::model::salary_component::{ComponentName, ComponentType, SalaryComponent};
use crate::model::staff::{AccountRole, NewStaffForm, SalaryDetails, SalaryDetailsForm, Staff, StaffForm};
use crate::models::{LoginReqDto, LoginResponse, RegisterReqDto};
use crate::report::pipeline::{PageInfo, ReportRow, SortField, SortOrder};
use crate::theme::{Theme, ThemeResponse};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SalaryGen Console API",
        version = "1.0.0",
        description = r#"
## SalaryGen Console

Browser-facing console for the **SalaryGen** payroll backend. It keeps the
operator's session, forwards every call with the stored bearer token and
turns salary data into tables, payslips and spreadsheets.

### 🔹 Key Features
- **Staff Management**
  - List, search, create, update and delete staff with their salary details
- **Salary Components**
  - Allowances and deductions per staff member
- **Salary Generation**
  - Generate a month's salaries for everyone
- **Reports**
  - Seven report types, search, sort, paging, Excel export and PDF payslips
- **Self Service**
  - Staff see their own payslips and salary summary

### 🔐 Access
Three role dashboards: `/adminDashboard` (ADMIN), `/hrDashboard` (HR) and
`/staffDashboard` (STAFF). Requests without a session are answered with a
`303` to `/login`; a signed-in operator with another role is sent to `/unauth`.

### 📦 Response Format
- JSON bodies; errors as `{"error": "<message>"}`
- A call replaced by a newer one on the same view answers `409 superseded`
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register,
        crate::auth::handlers::logout,

        crate::theme::get_theme,
        crate::theme::toggle_theme,

        crate::api::staff::list_staff,
        crate::api::staff::get_staff,
        crate::api::staff::create_staff,
        crate::api::staff::update_staff,
        crate::api::staff::delete_staff,

        crate::api::salary_component::list_components,
        crate::api::salary_component::create_component,
        crate::api::salary_component::update_component,
        crate::api::salary_component::delete_component,

        crate::api::salary_transaction::generate_salaries,

        crate::api::reports::staff_options,
        crate::api::reports::fetch_reports,
        crate::api::reports::report_table,
        crate::api::reports::export_reports,
        crate::api::reports::download_payslip,

        crate::api::payslips::fetch_payslips,
        crate::api::payslips::payslip_table,
        crate::api::payslips::download_payslip,

        crate::api::audit_log::list_audit_logs,

        crate::api::dashboard::staff_overview,
        crate::api::dashboard::staff_home,
        crate::api::dashboard::hr_profile
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            RegisterReqDto,
            Role,
            Theme,
            ThemeResponse,
            Staff,
            SalaryDetails,
            StaffForm,
            NewStaffForm,
            SalaryDetailsForm,
            AccountRole,
            StaffListResponse,
            SalaryComponent,
            ComponentName,
            ComponentType,
            ComponentForm,
            GenerateForm,
            ReportType,
            ReportRequest,
            ReportRow,
            ReportPage,
            StaffOption,
            SortField,
            SortOrder,
            PageInfo,
            PayslipMode,
            PayslipRequest,
            PayslipPage,
            AuditLog,
            LogEntry,
            LogView,
            Overview,
            SalarySummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign in, registration and sign out"),
        (name = "Staff", description = "Staff management APIs"),
        (name = "Salary Components", description = "Allowances and deductions per staff member"),
        (name = "Salary Transactions", description = "Monthly salary generation"),
        (name = "Reports", description = "Salary reports, Excel export and payslips"),
        (name = "Payslips", description = "Staff self-service payslips"),
        (name = "Audit Logs", description = "Backend audit trail"),
        (name = "Dashboard", description = "Salary summaries"),
        (name = "Theme", description = "Display preference"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
