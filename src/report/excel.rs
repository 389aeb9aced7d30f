use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};

use super::pipeline::ReportRow;

pub const EXPORT_FILE_NAME: &str = "SalaryReports.xlsx";
pub const SHEET_NAME: &str = "Reports";

const HEADERS: [&str; 7] = [
    "Employee Name",
    "Employee ID",
    "Salary Month",
    "Basic Salary",
    "Allowances",
    "Deductions",
    "Net Salary",
];

/// Columns from this index on are amounts.
const FIRST_AMOUNT_COLUMN: u16 = 3;

/// One spreadsheet line, with the derived amount columns computed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportLine {
    pub name: String,
    pub staff_id: String,
    pub month: String,
    pub basic: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net: f64,
}

impl From<&ReportRow> for ExportLine {
    fn from(row: &ReportRow) -> Self {
        let basic = row.basic_pay.unwrap_or(0.0);
        let gross = row.gross_salary.unwrap_or(0.0);
        let deductions = row.total_deductions.unwrap_or(0.0);
        Self {
            name: row.staff_name.clone(),
            staff_id: row.staff_id.clone().unwrap_or_else(|| "-".into()),
            month: row.salary_month.clone().unwrap_or_else(|| "-".into()),
            basic,
            allowances: gross - basic,
            deductions,
            net: row.net_salary.unwrap_or(gross - deductions),
        }
    }
}

/// Builds the `Reports` workbook in memory.
pub fn export_rows(rows: &[ReportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let centered = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header = centered.clone().set_bold().set_font_size(12);
    let money = centered.clone().set_num_format("\"₹\"#,##0.00");

    sheet.set_column_width(0, 20)?;
    for col in 1..HEADERS.len() as u16 {
        sheet.set_column_width(col, 15)?;
    }

    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let line = ExportLine::from(row);
        let r = i as u32 + 1;
        sheet.write_string_with_format(r, 0, &line.name, &centered)?;
        sheet.write_string_with_format(r, 1, &line.staff_id, &centered)?;
        sheet.write_string_with_format(r, 2, &line.month, &centered)?;
        let amounts = [line.basic, line.allowances, line.deductions, line.net];
        for (offset, amount) in amounts.into_iter().enumerate() {
            sheet.write_number_with_format(r, FIRST_AMOUNT_COLUMN + offset as u16, amount, &money)?;
        }
    }

    sheet.set_freeze_panes(1, 0)?;

    workbook.save_to_buffer()
}
