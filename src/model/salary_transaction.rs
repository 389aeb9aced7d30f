use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffRef {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    pub name: Option<String>,
}

/// One generated payslip row.
///
/// The report endpoints are not uniform: some rows name the staff member
/// directly, some nest it, some carry status or relieved markers. Anything
/// not modelled here is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryTransaction {
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub staff_id: Option<String>,
    pub staff_name: Option<String>,
    pub employee_name: Option<String>,
    pub staff: Option<StaffRef>,
    pub salary_month: Option<String>,
    pub basic_pay: Option<f64>,
    pub gross_salary: Option<f64>,
    pub total_deductions: Option<f64>,
    pub net_salary: Option<f64>,
    pub amount: Option<f64>,
    /// Component name to amount, in the order the backend sent them.
    pub component_breakdown: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    pub active: Option<bool>,
    pub company_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SalaryTransaction {
    /// `staffId`, falling back to the nested `staff.id`.
    pub fn effective_staff_id(&self) -> Option<&str> {
        self.staff_id
            .as_deref()
            .or_else(|| self.staff.as_ref().and_then(|s| s.id.as_deref()))
    }

    /// Breakdown entries with a numeric amount; nulls are dropped.
    pub fn breakdown_amounts(&self) -> Vec<(String, f64)> {
        self.component_breakdown
            .iter()
            .flatten()
            .filter_map(|(name, value)| value.as_f64().map(|amount| (name.clone(), amount)))
            .collect()
    }
}

/// Accepts the three shapes report endpoints answer with: a list, a
/// single row, or nothing.
pub fn rows_from_response(value: Value) -> Result<Vec<SalaryTransaction>, serde_json::Error> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(value),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}
