use std::fs;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::session_store::SessionStore;
use crate::client::{ApiContext, ApiHandle, HandleState};
use crate::config::Config;
use crate::model::salary_transaction::SalaryTransaction;
use crate::model::staff::Staff;
use crate::storage::{FileStorage, LocalStorage};
use crate::theme::ThemeStore;

/// One request handle per view. A new call on a view supersedes that
/// view's pending call and nothing else.
pub struct Views {
    pub login: ApiHandle,
    pub register: ApiHandle,
    pub staff: ApiHandle,
    pub staff_details: ApiHandle,
    pub components: ApiHandle,
    pub generate: ApiHandle,
    pub report_directory: ApiHandle,
    pub reports: ApiHandle,
    pub payslip_staff: ApiHandle,
    pub my_payslips: ApiHandle,
    pub my_details: ApiHandle,
    pub audit_logs: ApiHandle,
    pub dashboard: ApiHandle,
    pub home: ApiHandle,
    pub profile: ApiHandle,
}

impl Views {
    fn new(ctx: &Arc<ApiContext>) -> Self {
        let handle = |prefix: &str| ApiHandle::new(ctx.clone(), prefix);
        Self {
            login: handle("/api/auth/login"),
            register: handle("/register"),
            staff: handle("/api/admin/staff"),
            staff_details: handle("/api/hr/staff"),
            components: handle("/api/hr/salary-components/staff"),
            generate: handle("/api/hr/salary-transactions"),
            report_directory: handle("/api/hr/staff"),
            reports: handle("/api/hr/salary-transactions"),
            payslip_staff: handle("/api/hr/staff"),
            my_payslips: handle("/api/staff/salary-transactions"),
            my_details: handle("/api/staff"),
            audit_logs: handle("/api/admin/audit-logs"),
            dashboard: handle("/api/hr/staff"),
            home: handle("/api/staff/salary-transactions"),
            profile: handle("/api/hr/salary-transactions/staff"),
        }
    }

    fn named(&self) -> [(&'static str, &ApiHandle); 15] {
        [
            ("login", &self.login),
            ("register", &self.register),
            ("staff", &self.staff),
            ("staffDetails", &self.staff_details),
            ("components", &self.components),
            ("generate", &self.generate),
            ("reportDirectory", &self.report_directory),
            ("reports", &self.reports),
            ("payslipStaff", &self.payslip_staff),
            ("myPayslips", &self.my_payslips),
            ("myDetails", &self.my_details),
            ("auditLogs", &self.audit_logs),
            ("dashboard", &self.dashboard),
            ("home", &self.home),
            ("profile", &self.profile),
        ]
    }

    /// Cancels every pending call and forgets what each view loaded; used on logout.
    pub fn teardown_all(&self) {
        for (_, handle) in self.named() {
            handle.teardown();
            handle.reset();
        }
    }

    /// Views that are loading or whose last call failed.
    pub fn activity(&self) -> Vec<ViewActivity> {
        self.named()
            .into_iter()
            .filter_map(|(view, handle)| {
                let HandleState { loading, error, .. } = handle.snapshot();
                (loading || error.is_some()).then_some(ViewActivity {
                    view,
                    loading,
                    error,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ViewActivity {
    #[schema(example = "reports")]
    pub view: &'static str,
    pub loading: bool,
    pub error: Option<String>,
}

/// Last fetched report set and the directory used to name its rows.
#[derive(Debug, Default)]
pub struct ReportBoard {
    pub directory: Vec<Staff>,
    pub rows: Vec<SalaryTransaction>,
}

pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub theme: ThemeStore,
    pub views: Views,
    pub reports: Mutex<ReportBoard>,
    pub payslips: Mutex<Vec<SalaryTransaction>>,
    pub logo: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(config: Config, storage: Arc<dyn LocalStorage>, http: Client) -> Result<Self> {
        let session = Arc::new(SessionStore::hydrate(storage.clone()));
        let theme = ThemeStore::hydrate(storage)?;
        let ctx = Arc::new(ApiContext::new(http, config.api_base_url.clone(), session.clone()));

        let logo = match &config.logo_path {
            Some(path) => Some(
                fs::read(path).with_context(|| format!("failed to read logo {}", path.display()))?,
            ),
            None => None,
        };

        Ok(Self {
            views: Views::new(&ctx),
            config,
            session,
            theme,
            reports: Mutex::new(ReportBoard::default()),
            payslips: Mutex::new(Vec::new()),
            logo,
        })
    }

    /// Forgets the report and payslip rows loaded by the previous operator.
    pub fn reset_views(&self) {
        *self.reports.lock().unwrap_or_else(PoisonError::into_inner) = ReportBoard::default();
        self.payslips
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Production wiring: file-backed storage and a fresh HTTP client.
    pub fn from_config(config: Config) -> Result<Self> {
        let storage = FileStorage::open(&config.storage_path)?;
        let http = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        info!(
            storage = %config.storage_path.display(),
            backend = %config.api_base_url,
            "Application state initialised"
        );
        Self::new(config, Arc::new(storage), http)
    }
}
