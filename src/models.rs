use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginReqDto {
    #[serde(default)]
    #[schema(example = "asha.rao")]
    pub username: String,
    #[serde(default)]
    #[schema(example = "secret")]
    pub password: String,
}

/// Same shape as login; kept separate so the two forms can drift.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RegisterReqDto {
    #[serde(default)]
    #[schema(example = "asha.rao")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// What `POST /api/auth/login` answers with. The role stays a raw string
/// until it is checked against the known roles.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendLogin {
    pub id: u64,
    pub token: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(example = "/adminDashboard")]
    pub redirect: String,
    pub username: String,
    #[schema(example = "isAdmin")]
    pub role: String,
}
