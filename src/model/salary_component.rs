use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Salary components the backend knows how to compute.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentName {
    Da,
    Hra,
    SpecialAllowance,
    TransportAllowance,
    MedicalAllowance,
    Pf,
    Esi,
    Pt,
    Tds,
    OtherDeductions,
}

impl ComponentName {
    pub fn is_deduction(self) -> bool {
        matches!(
            self,
            ComponentName::Pf
                | ComponentName::Esi
                | ComponentName::Pt
                | ComponentName::Tds
                | ComponentName::OtherDeductions
        )
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ComponentType {
    Allowance,
    Deduction,
}

/// Departments offered by the component form.
pub const DEPARTMENTS: [&str; 6] = ["CSE", "HR", "EEE", "ECE", "MECH", "CIVIL"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryComponent {
    #[schema(example = 12)]
    pub id: Option<u64>,
    pub name: Option<ComponentName>,
    #[schema(example = 1500.0)]
    pub fixed_amount: Option<f64>,
    #[schema(example = 12.5)]
    pub percentage: Option<f64>,
    pub component_type: Option<ComponentType>,
    #[schema(example = "2025-04-01")]
    pub effective_date: Option<String>,
    #[schema(example = "CSE")]
    pub department: Option<String>,
}
