use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::lenient;
use crate::model::salary_component::ComponentName;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryDetails {
    #[schema(example = 42000.0)]
    pub basic_pay: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(example = "0012345678")]
    pub bank_account_number: Option<String>,
    #[schema(example = "SBIN0000123")]
    pub ifsc_code: Option<String>,
    #[schema(example = "State Bank")]
    pub bank_name: Option<String>,
    #[serde(default)]
    #[schema(example = json!(["HRA", "PF"]))]
    pub salary_components: Vec<String>,
}

/// Staff record as returned by the admin and HR staff endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "Asha Rao")]
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "CSE")]
    pub department: Option<String>,
    #[schema(example = "2023-06-01")]
    pub joining_date: Option<String>,
    pub relieved_date: Option<String>,
    pub salary_details: Option<SalaryDetails>,
}

impl Staff {
    /// `name`, or `firstName lastName` for directory entries that split it.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        let combined = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let combined = combined.trim();
        (!combined.is_empty()).then(|| combined.to_string())
    }

    /// Label used by the staff pickers: `Name (id)`.
    pub fn option_label(&self) -> String {
        let name = self.display_name().unwrap_or_else(|| "(No Name)".to_string());
        format!("{} ({})", name, self.id)
    }
}

/// Account roles accepted when an admin creates a login for new staff.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountRole {
    Admin,
    Hr,
    #[default]
    Staff,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryDetailsForm {
    /// Free text from the form; parsed as a number before it is sent.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(value_type = String, example = "42000")]
    pub basic_pay: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(value_type = String)]
    pub bank_account_number: Option<String>,
    #[serde(default)]
    pub ifsc_code: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub salary_components: Vec<ComponentName>,
}

/// Fields shared by the add and update staff forms.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[schema(example = "2024-01-15")]
    pub joining_date: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub salary_details: SalaryDetailsForm,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffForm {
    #[schema(example = "asha.rao")]
    pub user_name: String,
    #[schema(example = "asha@example.com")]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: AccountRole,
    #[serde(flatten)]
    pub profile: StaffForm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryDetailsPayload {
    pub basic_pay: f64,
    pub bank_account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    pub salary_components: Vec<ComponentName>,
}

/// Body of `PUT /api/admin/staff/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPayload {
    pub name: String,
    pub joining_date: String,
    pub department: String,
    pub salary_details: SalaryDetailsPayload,
}

/// Body of `POST /api/admin/staff`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStaffPayload {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub role: AccountRole,
    #[serde(flatten)]
    pub profile: StaffPayload,
}
