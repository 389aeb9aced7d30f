use actix_web::HttpResponse;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::IntoParams;

pub mod audit_log;
pub mod dashboard;
pub mod error;
pub mod payslips;
pub mod reports;
pub mod salary_component;
pub mod salary_transaction;
pub mod staff;

static MONTH_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid regex"));

/// `YYYY-MM` as produced by a month picker.
pub fn is_month(value: &str) -> bool {
    MONTH_INPUT.is_match(value)
}

/// Destructive actions ask first; the browser repeats the call with `confirm=true`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// File download response.
pub fn attachment(bytes: Vec<u8>, file_name: &str, content_type: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type.to_string())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name.to_string())],
        })
        .body(bytes)
}
