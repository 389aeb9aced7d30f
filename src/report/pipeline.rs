use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::model::salary_transaction::SalaryTransaction;
use crate::model::staff::Staff;

pub const REPORT_PAGE_SIZE: usize = 10;
pub const PAYSLIP_PAGE_SIZE: usize = 8;

/// Keys some report rows use to mark a relieved employee, checked in this order.
const RELIEVED_MARKERS: [&str; 5] = ["relived", "relieved", "relivedAt", "relievedAt", "relivedDate"];

/// A salary transaction after enrichment: resolved name, normalized status,
/// net salary with the `amount` fallback applied.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: Option<u64>,
    #[schema(example = "42")]
    pub staff_id: Option<String>,
    #[schema(example = "Asha Rao")]
    pub staff_name: String,
    #[schema(example = "2025-01")]
    pub salary_month: Option<String>,
    #[schema(example = "Active")]
    pub status: String,
    pub basic_pay: Option<f64>,
    pub gross_salary: Option<f64>,
    pub total_deductions: Option<f64>,
    pub net_salary: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub component_breakdown: Option<Map<String, Value>>,
    pub company_name: Option<String>,
}

impl ReportRow {
    pub fn breakdown_amounts(&self) -> Vec<(String, f64)> {
        self.component_breakdown
            .iter()
            .flatten()
            .filter_map(|(name, value)| value.as_f64().map(|amount| (name.clone(), amount)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    StaffName,
    NetSalary,
    SalaryMonth,
    #[default]
    Id,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string accepted by the report table views.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TableQuery {
    /// Case-insensitive substring.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    #[param(value_type = Option<String>, example = "netSalary")]
    pub sort: SortField,
    #[serde(default)]
    #[param(value_type = Option<String>, example = "desc")]
    pub order: SortOrder,
    /// 1-based, clamped into range.
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    /// Rows after filtering, across all pages.
    pub total: usize,
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Display name for a row: names carried on the row win, then the staff
/// directory, then the bare id.
pub fn resolve_staff_name(row: &SalaryTransaction, directory: &[Staff]) -> String {
    let carried = clean(row.staff_name.as_deref())
        .or_else(|| clean(row.employee_name.as_deref()))
        .or_else(|| clean(row.staff.as_ref().and_then(|s| s.name.as_deref())));
    if let Some(name) = carried {
        return name;
    }

    match row.effective_staff_id() {
        Some(id) => directory
            .iter()
            .find(|s| s.id.to_string() == id)
            .and_then(Staff::display_name)
            .unwrap_or_else(|| format!("({})", id)),
        None => "(unknown)".to_string(),
    }
}

pub fn compute_status(row: &SalaryTransaction) -> String {
    if let Some(raw) = row.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let lowered = raw.trim().to_lowercase();
        if lowered.contains("reliev")
            || lowered.contains("resign")
            || lowered.contains("left")
            || lowered == "inactive"
        {
            return "Relieved".to_string();
        }
        if matches!(lowered.as_str(), "active" | "working" | "employed") {
            return "Active".to_string();
        }
        let mut chars = raw.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    for key in RELIEVED_MARKERS {
        if let Some(value) = row.extra.get(key) {
            let blank = match value {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                _ => false,
            };
            return if blank { "Active" } else { "Relieved" }.to_string();
        }
    }

    "Unknown".to_string()
}

pub fn enrich(rows: &[SalaryTransaction], directory: &[Staff]) -> Vec<ReportRow> {
    rows.iter()
        .map(|row| ReportRow {
            id: row.id,
            staff_id: row.effective_staff_id().map(str::to_string),
            staff_name: resolve_staff_name(row, directory),
            salary_month: row.salary_month.clone(),
            status: compute_status(row),
            basic_pay: row.basic_pay,
            gross_salary: row.gross_salary,
            total_deductions: row.total_deductions,
            net_salary: row.net_salary.or(row.amount),
            component_breakdown: row.component_breakdown.clone(),
            company_name: row.company_name.clone(),
        })
        .collect()
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Report table search over name, staff id, month and status.
pub fn filter_rows(rows: Vec<ReportRow>, query: &str) -> Vec<ReportRow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| {
            contains(Some(&r.staff_name), &needle)
                || contains(r.staff_id.as_deref(), &needle)
                || contains(r.salary_month.as_deref(), &needle)
                || contains(Some(&r.status), &needle)
        })
        .collect()
}

/// Staff payslip search over name, month and net salary.
pub fn filter_payslips(rows: Vec<ReportRow>, query: &str) -> Vec<ReportRow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| {
            let net = r.net_salary.map(|n| n.to_string());
            contains(Some(&r.staff_name), &needle)
                || contains(r.salary_month.as_deref(), &needle)
                || contains(net.as_deref(), &needle)
        })
        .collect()
}

/// Stable: rows that compare equal keep their relative order in both directions.
pub fn sort_rows(rows: &mut [ReportRow], field: SortField, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = match field {
            SortField::StaffName => a
                .staff_name
                .to_lowercase()
                .cmp(&b.staff_name.to_lowercase()),
            SortField::NetSalary => a
                .net_salary
                .unwrap_or(0.0)
                .partial_cmp(&b.net_salary.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal),
            SortField::SalaryMonth => a
                .salary_month
                .as_deref()
                .unwrap_or("")
                .cmp(b.salary_month.as_deref().unwrap_or("")),
            SortField::Id => a.id.unwrap_or(0).cmp(&b.id.unwrap_or(0)),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Slices out one page. Out-of-range pages are clamped to the nearest
/// existing one; an empty input still has one (empty) page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> (Vec<T>, PageInfo) {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let slice = items.iter().skip(start).take(page_size).cloned().collect();
    (
        slice,
        PageInfo {
            page,
            total_pages,
            page_size,
            total: items.len(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tx(value: Value) -> SalaryTransaction {
        serde_json::from_value(value).unwrap()
    }

    fn directory() -> Vec<Staff> {
        serde_json::from_value(json!([
            {"id": 7, "name": "  Meera Das "},
            {"id": 8, "firstName": "Ravi", "lastName": "Kumar"}
        ]))
        .unwrap()
    }

    fn row(id: u64, name: &str, month: &str, net: Option<f64>) -> ReportRow {
        ReportRow {
            id: Some(id),
            staff_id: Some(id.to_string()),
            staff_name: name.to_string(),
            salary_month: Some(month.to_string()),
            status: "Active".to_string(),
            basic_pay: None,
            gross_salary: None,
            total_deductions: None,
            net_salary: net,
            component_breakdown: None,
            company_name: None,
        }
    }

    #[test]
    fn name_resolution_order() {
        let dir = directory();
        assert_eq!(
            resolve_staff_name(&tx(json!({"staffName": " A ", "employeeName": "B"})), &dir),
            "A"
        );
        assert_eq!(
            resolve_staff_name(&tx(json!({"staffName": "  ", "employeeName": "B"})), &dir),
            "B"
        );
        assert_eq!(
            resolve_staff_name(&tx(json!({"staff": {"id": 7, "name": "C"}})), &dir),
            "C"
        );
        assert_eq!(resolve_staff_name(&tx(json!({"staffId": 7})), &dir), "Meera Das");
        assert_eq!(resolve_staff_name(&tx(json!({"staffId": "8"})), &dir), "Ravi Kumar");
        assert_eq!(resolve_staff_name(&tx(json!({"staff": {"id": 99}})), &dir), "(99)");
        assert_eq!(resolve_staff_name(&tx(json!({})), &dir), "(unknown)");
    }

    #[test]
    fn status_from_explicit_value() {
        assert_eq!(compute_status(&tx(json!({"status": "Resigned"}))), "Relieved");
        assert_eq!(compute_status(&tx(json!({"status": "LEFT company"}))), "Relieved");
        assert_eq!(compute_status(&tx(json!({"status": "inactive"}))), "Relieved");
        assert_eq!(compute_status(&tx(json!({"status": "Working"}))), "Active");
        assert_eq!(compute_status(&tx(json!({"status": "probation"}))), "Probation");
    }

    #[test]
    fn status_from_relieved_markers() {
        assert_eq!(compute_status(&tx(json!({"relievedAt": null}))), "Active");
        assert_eq!(compute_status(&tx(json!({"relived": ""}))), "Active");
        assert_eq!(compute_status(&tx(json!({"relivedDate": "2024-03-01"}))), "Relieved");
        // first marker in the fixed order decides
        assert_eq!(
            compute_status(&tx(json!({"relievedAt": "2024-01-01", "relived": null}))),
            "Active"
        );
        assert_eq!(compute_status(&tx(json!({"status": ""}))), "Unknown");
    }

    #[test]
    fn net_salary_falls_back_to_amount() {
        let rows = enrich(
            &[tx(json!({"id": 1, "amount": 900.0})), tx(json!({"id": 2, "netSalary": 10, "amount": 5}))],
            &[],
        );
        assert_eq!(rows[0].net_salary, Some(900.0));
        assert_eq!(rows[1].net_salary, Some(10.0));
    }

    #[test]
    fn filter_is_case_insensitive_and_exact() {
        let rows = vec![
            row(1, "Asha Rao", "2025-01", Some(100.0)),
            row(2, "Ravi Kumar", "2025-02", Some(200.0)),
            row(3, "Meera", "2024-12", Some(300.0)),
        ];
        let hits = filter_rows(rows.clone(), "  RAVI ");
        assert_eq!(hits.iter().map(|r| r.id).collect::<Vec<_>>(), vec![Some(2)]);

        let by_month = filter_rows(rows.clone(), "2025");
        assert_eq!(by_month.len(), 2);

        let by_status = filter_rows(rows.clone(), "active");
        assert_eq!(by_status.len(), 3);

        assert_eq!(filter_rows(rows.clone(), "").len(), 3);
        assert!(filter_rows(rows, "nobody").is_empty());
    }

    #[test]
    fn payslip_search_matches_net_salary_text() {
        let rows = vec![
            row(1, "Asha", "2025-01", Some(45_250.0)),
            row(2, "Asha", "2025-02", Some(45_250.5)),
            row(3, "Asha", "2025-03", None),
        ];
        assert_eq!(filter_payslips(rows.clone(), "45250").len(), 2);
        assert_eq!(filter_payslips(rows.clone(), "250.5").len(), 1);
        assert_eq!(filter_payslips(rows, "2025-03").len(), 1);
    }

    #[test]
    fn net_salary_sort_is_numeric_and_reversible() {
        let mut rows = vec![
            row(1, "a", "m", Some(900.0)),
            row(2, "b", "m", Some(10_000.0)),
            row(3, "c", "m", None),
            row(4, "d", "m", Some(95.5)),
        ];
        sort_rows(&mut rows, SortField::NetSalary, SortOrder::Asc);
        let asc: Vec<_> = rows.iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(asc, vec![3, 4, 1, 2]);

        sort_rows(&mut rows, SortField::NetSalary, SortOrder::Desc);
        let desc: Vec<_> = rows.iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(desc, vec![2, 1, 4, 3]);
    }

    #[test]
    fn sort_ties_keep_input_order() {
        let mut rows = vec![
            row(5, "same", "2025-01", Some(1.0)),
            row(2, "Same", "2025-01", Some(1.0)),
            row(9, "other", "2025-01", Some(1.0)),
        ];
        sort_rows(&mut rows, SortField::StaffName, SortOrder::Asc);
        let ids: Vec<_> = rows.iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(ids, vec![9, 5, 2]);

        sort_rows(&mut rows, SortField::SalaryMonth, SortOrder::Desc);
        let ids: Vec<_> = rows.iter().map(|r| r.id.unwrap()).collect();
        assert_eq!(ids, vec![9, 5, 2]);
    }

    #[test]
    fn pages_partition_the_input() {
        let items: Vec<u32> = (0..23).collect();
        let (_, info) = paginate(&items, 1, REPORT_PAGE_SIZE);
        assert_eq!(info.total_pages, 3);

        let mut seen = Vec::new();
        for page in 1..=info.total_pages {
            let (slice, _) = paginate(&items, page, REPORT_PAGE_SIZE);
            assert!(slice.len() <= REPORT_PAGE_SIZE);
            seen.extend(slice);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn page_numbers_are_clamped() {
        let items: Vec<u32> = (0..9).collect();
        let (slice, info) = paginate(&items, 5, PAYSLIP_PAGE_SIZE);
        assert_eq!(info.page, 2);
        assert_eq!(slice, vec![8]);

        let (slice, info) = paginate::<u32>(&[], 0, PAYSLIP_PAGE_SIZE);
        assert_eq!(info.total_pages, 1);
        assert_eq!(info.page, 1);
        assert!(slice.is_empty());
    }
}
