use anyhow::{Result, anyhow};
use chrono::Datelike;
use ecow::EcoVec;
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult, SourceDiagnostic};
use typst::foundations::{Bytes, Datetime};
use typst::layout::PagedDocument;
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};

use super::format::rupees;
use super::pipeline::ReportRow;
use super::words::to_words;
use crate::model::staff::Staff;

/// Breakdown keys that go in the deductions column (compared upper-case).
const DEDUCTION_KEYS: [&str; 6] = ["PF", "PT", "ESI", "TDS", "INSURANCE", "OTHER_DEDUCTIONS"];

const LOGO_PATH: &str = "/logo.png";

pub const FOOTER_NOTICE: &str = "This is a system-generated payslip and does not require a signature.";
pub const FOOTER_SIGNATURE: &str = "Generated by SalaryGen";

/// Everything printed on one payslip, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct PayslipLayout {
    pub company_name: String,
    pub staff_name: String,
    pub salary_month: String,
    pub staff_id: String,
    /// Staff metadata table: header label and value.
    pub details: Vec<(&'static str, String)>,
    /// Earnings name, amount, deductions name, amount; short side padded with "".
    pub lines: Vec<[String; 4]>,
    pub summary: Vec<(&'static str, String)>,
    pub amount_in_words: String,
    pub file_name: String,
}

impl PayslipLayout {
    pub fn build(row: &ReportRow, staff: Option<&Staff>, default_company: &str) -> Self {
        let dash = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or("-").to_string();
        let bank = staff.and_then(|s| s.salary_details.as_ref());

        let details = vec![
            ("Department", dash(staff.and_then(|s| s.department.as_deref()))),
            ("Joining Date", dash(staff.and_then(|s| s.joining_date.as_deref()))),
            (
                "Relieved Date",
                staff
                    .and_then(|s| s.relieved_date.clone())
                    .unwrap_or_else(|| "Working".to_string()),
            ),
            ("Bank Name", dash(bank.and_then(|b| b.bank_name.as_deref()))),
            ("IFSC Code", dash(bank.and_then(|b| b.ifsc_code.as_deref()))),
            (
                "Account Number",
                dash(bank.and_then(|b| b.bank_account_number.as_deref())),
            ),
        ];

        let mut earnings = Vec::new();
        let mut deductions = Vec::new();
        if let Some(basic) = row.basic_pay {
            earnings.push(("Basic Salary".to_string(), rupees(Some(basic))));
        }
        for (name, amount) in row.breakdown_amounts() {
            let cell = (name.clone(), rupees(Some(amount)));
            if DEDUCTION_KEYS.contains(&name.to_uppercase().as_str()) {
                deductions.push(cell);
            } else {
                earnings.push(cell);
            }
        }

        let rows = earnings.len().max(deductions.len());
        let lines = (0..rows)
            .map(|i| {
                let (en, ea) = earnings.get(i).cloned().unwrap_or_default();
                let (dn, da) = deductions.get(i).cloned().unwrap_or_default();
                [en, ea, dn, da]
            })
            .collect();

        let summary = vec![
            ("Gross Salary", rupees(row.gross_salary)),
            ("Total Deductions", rupees(row.total_deductions)),
            ("Net Pay", rupees(row.net_salary)),
        ];

        let file_name = format!(
            "Payslip_{}_{}.pdf",
            row.staff_id.as_deref().unwrap_or("Staff"),
            row.salary_month.as_deref().unwrap_or("Month")
        );

        Self {
            company_name: row
                .company_name
                .clone()
                .unwrap_or_else(|| default_company.to_string()),
            staff_name: row.staff_name.clone(),
            salary_month: dash(row.salary_month.as_deref()),
            staff_id: dash(row.staff_id.as_deref()),
            details,
            lines,
            summary,
            amount_in_words: to_words(row.net_salary),
            file_name,
        }
    }
}

/// Escapes a value for use inside a Typst string literal.
pub fn escape_typst(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", escape_typst(s))
}

/// Typst array literal; the trailing comma keeps one-element arrays arrays.
fn array(items: impl IntoIterator<Item = String>) -> String {
    let items: Vec<String> = items.into_iter().collect();
    if items.is_empty() {
        "()".to_string()
    } else {
        format!("({},)", items.join(", "))
    }
}

fn pairs(items: &[(&str, String)]) -> String {
    array(
        items
            .iter()
            .map(|(label, value)| array([quoted(label), quoted(value)])),
    )
}

/// Prepends `#let` bindings to the payslip template.
pub fn build_payslip_source(layout: &PayslipLayout, has_logo: bool) -> String {
    let lines = array(
        layout
            .lines
            .iter()
            .map(|cells| array(cells.iter().map(|c| quoted(c)))),
    );

    let bindings = format!(
        r##"#let company_name = {company_name}
#let has_logo = {has_logo}
#let staff_name = {staff_name}
#let salary_month = {salary_month}
#let staff_id = {staff_id}
#let details = {details}
#let lines = {lines}
#let summary = {summary}
#let amount_in_words = {amount_in_words}
#let footer_notice = {footer_notice}
#let footer_signature = {footer_signature}

"##,
        company_name = quoted(&layout.company_name),
        has_logo = has_logo,
        staff_name = quoted(&layout.staff_name),
        salary_month = quoted(&layout.salary_month),
        staff_id = quoted(&layout.staff_id),
        details = pairs(&layout.details),
        lines = lines,
        summary = pairs(&layout.summary),
        amount_in_words = quoted(&layout.amount_in_words),
        footer_notice = quoted(FOOTER_NOTICE),
        footer_signature = quoted(FOOTER_SIGNATURE),
    );

    let template = include_str!("../../templates/payslip.typ");
    format!("{bindings}{template}")
}

static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect()
});

static FONT_BOOK: Lazy<LazyHash<FontBook>> =
    Lazy::new(|| LazyHash::new(FontBook::from_fonts(FONTS.iter())));

static LIBRARY: Lazy<LazyHash<Library>> = Lazy::new(|| LazyHash::new(Library::default()));

/// Single-file world; the only extra file it serves is the header logo.
struct PayslipWorld {
    source: Source,
    logo: Option<Bytes>,
}

impl World for PayslipWorld {
    fn library(&self) -> &LazyHash<Library> {
        &LIBRARY
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &FONT_BOOK
    }

    fn main(&self) -> FileId {
        self.source.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.source.id() {
            Ok(self.source.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rooted_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        let path = id.vpath().as_rooted_path();
        match &self.logo {
            Some(logo) if path == std::path::Path::new(LOGO_PATH) => Ok(logo.clone()),
            _ => Err(FileError::NotFound(path.into())),
        }
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, offset: Option<i64>) -> Option<Datetime> {
        let now = chrono::Utc::now();
        let naive = match offset {
            Some(hours) => {
                let tz = chrono::FixedOffset::east_opt((hours as i32) * 3600)?;
                now.with_timezone(&tz).naive_local()
            }
            None => now.naive_utc(),
        };
        Datetime::from_ymd(naive.year(), naive.month() as u8, naive.day() as u8)
    }
}

/// Compiles a payslip source to PDF on a blocking thread.
pub async fn render_pdf(source: String, logo: Option<Vec<u8>>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || render_pdf_sync(&source, logo))
        .await
        .map_err(|e| anyhow!("payslip render task panicked: {e}"))?
}

fn render_pdf_sync(source: &str, logo: Option<Vec<u8>>) -> Result<Vec<u8>> {
    let world = PayslipWorld {
        source: Source::detached(source),
        logo: logo.map(Bytes::new),
    };

    let document = typst::compile::<PagedDocument>(&world)
        .output
        .map_err(|d| diagnostics("Typst compilation failed", &d))?;

    typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
        .map_err(|d| diagnostics("PDF export failed", &d))
}

fn diagnostics(prefix: &str, diagnostics: &EcoVec<SourceDiagnostic>) -> anyhow::Error {
    let messages: Vec<String> = diagnostics.iter().map(|d| d.message.to_string()).collect();
    anyhow!("{prefix}: {}", messages.join("; "))
}
