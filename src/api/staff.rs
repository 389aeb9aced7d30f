use crate::{
    api::{error::ViewError, ConfirmQuery},
    model::staff::{
        NewStaffForm, NewStaffPayload, SalaryDetailsForm, SalaryDetailsPayload, Staff, StaffForm,
        StaffPayload,
    },
    state::AppState,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StaffQuery {
    /// Matches name or department (case-insensitive) or any part of the id.
    #[serde(default)]
    pub search: String,
}

#[derive(Serialize, ToSchema)]
pub struct StaffListResponse {
    pub staff: Vec<Staff>,
    #[schema(example = 3)]
    pub total: usize,
}

/// Ascending numeric id.
pub fn sort_by_id(staff: &mut [Staff]) {
    staff.sort_by_key(|s| s.id);
}

pub fn filter_staff(staff: Vec<Staff>, search: &str) -> Vec<Staff> {
    if search.is_empty() {
        return staff;
    }
    let needle = search.to_lowercase();
    staff
        .into_iter()
        .filter(|s| {
            s.name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
                || s.department
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                || s.id.to_string().contains(search)
        })
        .collect()
}

fn salary_details_payload(form: &SalaryDetailsForm) -> Result<SalaryDetailsPayload, ViewError> {
    let basic_pay = form
        .basic_pay
        .as_deref()
        .map(str::trim)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| ViewError::validation("Basic pay must be a number."))?;

    Ok(SalaryDetailsPayload {
        basic_pay,
        bank_account_number: form.bank_account_number.clone().unwrap_or_default(),
        ifsc_code: form.ifsc_code.clone(),
        bank_name: form.bank_name.clone(),
        salary_components: form.salary_components.clone(),
    })
}

pub fn staff_payload(form: &StaffForm) -> Result<StaffPayload, ViewError> {
    Ok(StaffPayload {
        name: form.name.clone(),
        joining_date: form.joining_date.clone(),
        department: form.department.clone(),
        salary_details: salary_details_payload(&form.salary_details)?,
    })
}

pub fn new_staff_payload(form: &NewStaffForm) -> Result<NewStaffPayload, ViewError> {
    Ok(NewStaffPayload {
        user_name: form.user_name.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
        role: form.role,
        profile: staff_payload(&form.profile)?,
    })
}

/// List staff
#[utoipa::path(
    get,
    path = "/adminDashboard/staff",
    params(StaffQuery),
    responses(
        (status = 200, description = "Staff sorted by id", body = StaffListResponse),
        (status = 303, description = "Not signed in as admin"),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Staff",
    security(("bearer_auth" = []))
)]
#[instrument(name = "staff_list", skip(state, query), fields(search = %query.search))]
pub async fn list_staff(
    state: web::Data<AppState>,
    query: web::Query<StaffQuery>,
) -> Result<HttpResponse, ViewError> {
    let mut staff: Vec<Staff> = state.views.staff.get_as("").await?;
    sort_by_id(&mut staff);
    let staff = filter_staff(staff, &query.search);

    debug!(count = staff.len(), "Staff listed");

    Ok(HttpResponse::Ok().json(StaffListResponse {
        total: staff.len(),
        staff,
    }))
}

/// View one staff record
#[utoipa::path(
    get,
    path = "/adminDashboard/staff/{id}",
    params(("id" = u64, Path, description = "Staff id")),
    responses(
        (status = 200, body = Staff),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Staff",
    security(("bearer_auth" = []))
)]
pub async fn get_staff(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ViewError> {
    let id = path.into_inner();
    let staff: Staff = state.views.staff_details.get_as(&format!("/{}", id)).await?;
    Ok(HttpResponse::Ok().json(staff))
}

/// Create a staff member together with their login
#[utoipa::path(
    post,
    path = "/adminDashboard/staff",
    request_body = NewStaffForm,
    responses(
        (status = 200, description = "Created", body = Object, example = json!({
            "message": "Staff created successfully"
        })),
        (status = 400, description = "Invalid form", body = Object),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Staff",
    security(("bearer_auth" = []))
)]
#[instrument(name = "staff_create", skip(state, form), fields(user_name = %form.user_name))]
pub async fn create_staff(
    state: web::Data<AppState>,
    form: web::Json<NewStaffForm>,
) -> Result<HttpResponse, ViewError> {
    let payload = new_staff_payload(&form)?;
    let created = state.views.staff.post("", &payload).await?;
    info!("Staff created");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Staff created successfully",
        "staff": created
    })))
}

/// Update a staff member's profile and salary details
#[utoipa::path(
    put,
    path = "/adminDashboard/staff/{id}",
    params(("id" = u64, Path, description = "Staff id")),
    request_body = StaffForm,
    responses(
        (status = 200, description = "Updated", body = Object, example = json!({
            "message": "Staff updated successfully"
        })),
        (status = 400, description = "Invalid form", body = Object),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Staff",
    security(("bearer_auth" = []))
)]
#[instrument(name = "staff_update", skip(state, form))]
pub async fn update_staff(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    form: web::Json<StaffForm>,
) -> Result<HttpResponse, ViewError> {
    let id = path.into_inner();
    let payload = staff_payload(&form)?;
    let updated = state.views.staff.put(&format!("/{}", id), &payload).await?;
    info!(id, "Staff updated");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Staff updated successfully",
        "staff": updated
    })))
}

/// Delete a staff member (requires `confirm=true`)
#[utoipa::path(
    delete,
    path = "/adminDashboard/staff/{id}",
    params(("id" = u64, Path, description = "Staff id"), ConfirmQuery),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "message": "Staff deleted successfully"
        })),
        (status = 400, description = "Not confirmed", body = Object, example = json!({
            "error": "Delete this staff member?"
        }))
    ),
    tag = "Staff",
    security(("bearer_auth" = []))
)]
#[instrument(name = "staff_delete", skip(state, confirm))]
pub async fn delete_staff(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    confirm: web::Query<ConfirmQuery>,
) -> Result<HttpResponse, ViewError> {
    if !confirm.confirm {
        return Err(ViewError::validation("Delete this staff member?"));
    }
    let id = path.into_inner();
    state.views.staff.delete(&format!("/{}", id)).await?;
    info!(id, "Staff deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Staff deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::testing::{sign_in, spawn_backend, test_state};
    use actix_web::{App, http::StatusCode, test as actix_test};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::sync::Mutex;

    type Records = web::Data<Mutex<Vec<Value>>>;

    fn backend(records: Records) -> impl Fn(&mut web::ServiceConfig) + Send + Clone + 'static {
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(records.clone())
                .route(
                    "/api/admin/staff",
                    web::get().to(|records: Records| async move {
                        let list = records.lock().unwrap().clone();
                        HttpResponse::Ok().json(list)
                    }),
                )
                .route(
                    "/api/admin/staff/{id}",
                    web::delete().to(|records: Records, path: web::Path<u64>| async move {
                        let id = path.into_inner();
                        records.lock().unwrap().retain(|r| r["id"] != id);
                        HttpResponse::Ok().finish()
                    }),
                );
        }
    }

    fn app_routes(cfg: &mut web::ServiceConfig) {
        cfg.route("/staff", web::get().to(list_staff))
            .route("/staff/{id}", web::delete().to(delete_staff));
    }

    fn ids(body: &Value) -> Vec<u64> {
        body["staff"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_u64().unwrap())
            .collect()
    }

    #[actix_web::test]
    async fn list_is_sorted_and_delete_needs_confirmation() {
        let records: Records = web::Data::new(Mutex::new(vec![
            json!({"id": 12, "name": "Ravi", "department": "ECE"}),
            json!({"id": 3, "name": "Asha", "department": "CSE"}),
            json!({"id": 7, "name": "Meera", "department": "HR"}),
        ]));
        let (base, server) = spawn_backend(backend(records.clone()));
        let state = test_state(&base);
        sign_in(&state, 1, Role::Admin);

        let app = actix_test::init_service(App::new().app_data(state.clone()).configure(app_routes)).await;

        let body: Value =
            actix_test::call_and_read_body_json(&app, actix_test::TestRequest::get().uri("/staff").to_request())
                .await;
        assert_eq!(ids(&body), vec![3, 7, 12]);
        assert_eq!(body["total"], 3);

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete().uri("/staff/7").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(records.lock().unwrap().len(), 3);

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete().uri("/staff/7?confirm=true").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value =
            actix_test::call_and_read_body_json(&app, actix_test::TestRequest::get().uri("/staff").to_request())
                .await;
        assert_eq!(ids(&body), vec![3, 12]);

        server.stop(false).await;
    }

    #[test]
    fn search_covers_name_department_and_id() {
        let staff: Vec<Staff> = serde_json::from_value(json!([
            {"id": 3, "name": "Asha", "department": "CSE"},
            {"id": 12, "name": "Ravi", "department": "ECE"},
            {"id": 31, "name": "Meera", "department": "HR"}
        ]))
        .unwrap();

        let names = |hits: Vec<Staff>| hits.into_iter().map(|s| s.id).collect::<Vec<_>>();
        assert_eq!(names(filter_staff(staff.clone(), "asha")), vec![3]);
        assert_eq!(names(filter_staff(staff.clone(), "ce")), vec![12]);
        assert_eq!(names(filter_staff(staff.clone(), "3")), vec![3, 31]);
        assert_eq!(names(filter_staff(staff, "")), vec![3, 12, 31]);
    }

    #[test]
    fn basic_pay_must_parse() {
        let mut form = StaffForm::default();
        form.salary_details.basic_pay = Some(" 42000.5 ".into());
        assert_eq!(staff_payload(&form).unwrap().salary_details.basic_pay, 42_000.5);

        form.salary_details.basic_pay = Some("lots".into());
        assert!(matches!(staff_payload(&form), Err(ViewError::Validation(_))));

        form.salary_details.basic_pay = None;
        assert!(staff_payload(&form).is_err());
    }
}
