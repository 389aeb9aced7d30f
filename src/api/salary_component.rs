use crate::{
    api::{ConfirmQuery, error::ViewError},
    model::{
        lenient,
        salary_component::{ComponentName, ComponentType, SalaryComponent},
    },
    state::AppState,
};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentForm {
    pub name: ComponentName,
    /// Empty means "not set".
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(value_type = Option<String>, example = "1500")]
    pub fixed_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    #[schema(value_type = Option<String>, example = "")]
    pub percentage: Option<String>,
    pub component_type: ComponentType,
    #[schema(example = "2025-04-01")]
    pub effective_date: String,
    #[schema(example = "CSE")]
    pub department: String,
}

/// Body sent to the backend; unset amounts go out as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPayload {
    pub name: ComponentName,
    pub fixed_amount: Option<f64>,
    pub percentage: Option<f64>,
    pub component_type: ComponentType,
    pub effective_date: String,
    pub department: String,
}

fn optional_amount(raw: Option<&str>, label: &str) -> Result<Option<f64>, ViewError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| ViewError::validation(format!("{} must be a number.", label))),
    }
}

impl ComponentForm {
    pub fn to_payload(&self) -> Result<ComponentPayload, ViewError> {
        Ok(ComponentPayload {
            name: self.name,
            fixed_amount: optional_amount(self.fixed_amount.as_deref(), "Fixed amount")?,
            percentage: optional_amount(self.percentage.as_deref(), "Percentage")?,
            component_type: self.component_type,
            effective_date: self.effective_date.clone(),
            department: self.department.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ComponentQuery {
    /// Case-insensitive substring of the component name.
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    #[param(value_type = Option<String>, example = "DEDUCTION")]
    pub component_type: Option<ComponentType>,
}

fn effective(c: &SalaryComponent) -> Option<NaiveDate> {
    c.effective_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.get(..10).unwrap_or(d), "%Y-%m-%d").ok())
}

/// Newest effective date first; undated components last.
pub fn sort_by_effective_date(components: &mut [SalaryComponent]) {
    components.sort_by(|a, b| effective(b).cmp(&effective(a)));
}

pub fn filter_components(
    components: Vec<SalaryComponent>,
    query: &ComponentQuery,
) -> Vec<SalaryComponent> {
    let needle = query.name.to_lowercase();
    components
        .into_iter()
        .filter(|c| {
            needle.is_empty()
                || c.name
                    .is_some_and(|n| n.as_ref().to_lowercase().contains(&needle))
        })
        .filter(|c| query.component_type.is_none() || c.component_type == query.component_type)
        .collect()
}

/// List the salary components of one staff member
#[utoipa::path(
    get,
    path = "/adminDashboard/staff/{staff_id}/components",
    params(("staff_id" = u64, Path, description = "Staff id"), ComponentQuery),
    responses(
        (status = 200, body = [SalaryComponent]),
        (status = 502, description = "Backend failure", body = Object)
    ),
    tag = "Salary Components",
    security(("bearer_auth" = []))
)]
#[instrument(name = "components_list", skip(state, query))]
pub async fn list_components(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    query: web::Query<ComponentQuery>,
) -> Result<HttpResponse, ViewError> {
    let staff_id = path.into_inner();
    let mut components: Vec<SalaryComponent> = state
        .views
        .components
        .get_as(&format!("/{}", staff_id))
        .await?;
    sort_by_effective_date(&mut components);
    Ok(HttpResponse::Ok().json(filter_components(components, &query)))
}

/// Add a salary component
#[utoipa::path(
    post,
    path = "/adminDashboard/staff/{staff_id}/components",
    params(("staff_id" = u64, Path, description = "Staff id")),
    request_body = ComponentForm,
    responses(
        (status = 200, description = "Created", body = Object, example = json!({
            "message": "Salary component saved"
        })),
        (status = 400, description = "Invalid amount", body = Object)
    ),
    tag = "Salary Components",
    security(("bearer_auth" = []))
)]
#[instrument(name = "components_create", skip(state, form))]
pub async fn create_component(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    form: web::Json<ComponentForm>,
) -> Result<HttpResponse, ViewError> {
    let staff_id = path.into_inner();
    let payload = form.to_payload()?;
    let saved = state
        .views
        .components
        .post(&format!("/{}", staff_id), &payload)
        .await?;
    info!(staff_id, component = %payload.name, "Salary component created");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary component saved",
        "component": saved
    })))
}

/// Update a salary component
#[utoipa::path(
    put,
    path = "/adminDashboard/staff/{staff_id}/components/{component_id}",
    params(
        ("staff_id" = u64, Path, description = "Staff id"),
        ("component_id" = u64, Path, description = "Component id")
    ),
    request_body = ComponentForm,
    responses(
        (status = 200, description = "Updated", body = Object),
        (status = 400, description = "Invalid amount", body = Object)
    ),
    tag = "Salary Components",
    security(("bearer_auth" = []))
)]
#[instrument(name = "components_update", skip(state, form))]
pub async fn update_component(
    state: web::Data<AppState>,
    path: web::Path<(u64, u64)>,
    form: web::Json<ComponentForm>,
) -> Result<HttpResponse, ViewError> {
    let (staff_id, component_id) = path.into_inner();
    let payload = form.to_payload()?;
    let saved = state
        .views
        .components
        .put(&format!("/{}/{}", staff_id, component_id), &payload)
        .await?;
    info!(staff_id, component_id, "Salary component updated");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary component saved",
        "component": saved
    })))
}

/// Delete a salary component (requires `confirm=true`)
#[utoipa::path(
    delete,
    path = "/adminDashboard/staff/{staff_id}/components/{component_id}",
    params(
        ("staff_id" = u64, Path, description = "Staff id"),
        ("component_id" = u64, Path, description = "Component id"),
        ConfirmQuery
    ),
    responses(
        (status = 200, description = "Deleted", body = Object),
        (status = 400, description = "Not confirmed", body = Object, example = json!({
            "error": "Delete this salary component?"
        }))
    ),
    tag = "Salary Components",
    security(("bearer_auth" = []))
)]
#[instrument(name = "components_delete", skip(state, confirm))]
pub async fn delete_component(
    state: web::Data<AppState>,
    path: web::Path<(u64, u64)>,
    confirm: web::Query<ConfirmQuery>,
) -> Result<HttpResponse, ViewError> {
    if !confirm.confirm {
        return Err(ViewError::validation("Delete this salary component?"));
    }
    let (staff_id, component_id) = path.into_inner();
    state
        .views
        .components
        .delete(&format!("/{}/{}", staff_id, component_id))
        .await?;
    info!(staff_id, component_id, "Salary component deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Salary component deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn components() -> Vec<SalaryComponent> {
        serde_json::from_value(json!([
            {"id": 1, "name": "HRA", "componentType": "ALLOWANCE", "effectiveDate": "2024-04-01"},
            {"id": 2, "name": "PF", "componentType": "DEDUCTION", "effectiveDate": "2025-01-01"},
            {"id": 3, "name": "SPECIAL_ALLOWANCE", "componentType": "ALLOWANCE"},
            {"id": 4, "name": "TDS", "componentType": "DEDUCTION", "effectiveDate": "2024-10-15T00:00:00"}
        ]))
        .unwrap()
    }

    #[test]
    fn newest_effective_date_first() {
        let mut list = components();
        sort_by_effective_date(&mut list);
        let ids: Vec<_> = list.iter().map(|c| c.id.unwrap()).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn filters_by_name_and_exact_type() {
        let query = ComponentQuery {
            name: "allow".into(),
            component_type: None,
        };
        let ids: Vec<_> = filter_components(components(), &query)
            .iter()
            .map(|c| c.id.unwrap())
            .collect();
        assert_eq!(ids, vec![3]);

        let query = ComponentQuery {
            name: String::new(),
            component_type: Some(ComponentType::Deduction),
        };
        assert_eq!(filter_components(components(), &query).len(), 2);
    }

    #[test]
    fn empty_amounts_become_null() {
        let form: ComponentForm = serde_json::from_value(json!({
            "name": "HRA",
            "fixedAmount": "",
            "percentage": 12.5,
            "componentType": "ALLOWANCE",
            "effectiveDate": "2025-04-01",
            "department": "CSE"
        }))
        .unwrap();

        let payload = serde_json::to_value(form.to_payload().unwrap()).unwrap();
        assert_eq!(payload["fixedAmount"], serde_json::Value::Null);
        assert_eq!(payload["percentage"], 12.5);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let form: ComponentForm = serde_json::from_value(json!({
            "name": "PF",
            "fixedAmount": "abc",
            "componentType": "DEDUCTION",
            "effectiveDate": "2025-04-01",
            "department": "HR"
        }))
        .unwrap();
        assert!(matches!(form.to_payload(), Err(ViewError::Validation(_))));
    }
}
