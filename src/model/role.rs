use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Role carried by the session, as the backend spells it on login.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum Role {
    #[serde(rename = "isAdmin")]
    #[strum(serialize = "isAdmin")]
    Admin,
    #[serde(rename = "isHr")]
    #[strum(serialize = "isHr")]
    Hr,
    #[serde(rename = "isStaff")]
    #[strum(serialize = "isStaff")]
    Staff,
}

impl Role {
    /// Landing route of the dashboard owned by this role.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Admin => "/adminDashboard",
            Role::Hr => "/hrDashboard",
            Role::Staff => "/staffDashboard",
        }
    }
}
