use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Identity of the operator currently signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[schema(example = 7)]
    pub user_id: u64,
    pub token: String,
    #[schema(example = "asha")]
    pub username: String,
    pub role: Role,
}
