use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tera::{Context, Tera};

use laundry_chemicals::Chemical;
use laundry_linens::Linen;

use super::{ExportError, ReportKind};

const TEMPLATE_NAME: &str = "report.html";
const TEMPLATE: &str = include_str!("../../templates/report.html");

/// A rendered report ready to hand to a [`super::ReportSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub kind: ReportKind,
    pub generated_at: DateTime<Utc>,
    pub html: String,
}

#[derive(Debug, Serialize)]
struct ReportRow {
    low_stock: bool,
    cells: Vec<String>,
}

/// One row per chemical; rows at or below `low_stock_threshold` are flagged.
pub fn render_chemical_report(
    chemicals: &[Chemical],
    low_stock_threshold: Decimal,
    generated_at: DateTime<Utc>,
) -> Result<ReportDocument, ExportError> {
    if chemicals.is_empty() {
        return Err(ExportError::Empty(ReportKind::Chemicals));
    }

    let rows: Vec<ReportRow> = chemicals
        .iter()
        .map(|chemical| {
            let low_stock = chemical.is_low_stock(low_stock_threshold);
            ReportRow {
                low_stock,
                cells: vec![
                    chemical.name().to_string(),
                    chemical.opening_balance().normalize().to_string(),
                    chemical.current_balance().normalize().to_string(),
                    chemical.unit().to_string(),
                    if low_stock { "LOW STOCK" } else { "OK" }.to_string(),
                ],
            }
        })
        .collect();

    let headers = [
        "Chemical Name",
        "Opening Balance",
        "Current Balance",
        "Unit",
        "Status",
    ];
    document(ReportKind::Chemicals, &headers, &rows, generated_at)
}

/// One row per linen item with its lifetime counters.
pub fn render_linen_report(
    linens: &[Linen],
    generated_at: DateTime<Utc>,
) -> Result<ReportDocument, ExportError> {
    if linens.is_empty() {
        return Err(ExportError::Empty(ReportKind::Linens));
    }

    let rows: Vec<ReportRow> = linens
        .iter()
        .map(|linen| ReportRow {
            low_stock: false,
            cells: vec![
                linen.name().to_string(),
                linen.linen_type().label().to_string(),
                linen.opening_balance().to_string(),
                linen.new_count().to_string(),
                linen.dirty_count().to_string(),
                linen.thrown_count().to_string(),
                linen.current_balance().to_string(),
            ],
        })
        .collect();

    let headers = [
        "Item Name",
        "Type",
        "Opening",
        "New",
        "Dirty",
        "Thrown",
        "Current Balance",
    ];
    document(ReportKind::Linens, &headers, &rows, generated_at)
}

fn templates() -> Result<Tera, ExportError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html"]);
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)
        .map_err(ExportError::Render)?;
    Ok(tera)
}

fn document(
    kind: ReportKind,
    headers: &[&str],
    rows: &[ReportRow],
    generated_at: DateTime<Utc>,
) -> Result<ReportDocument, ExportError> {
    let mut context = Context::new();
    context.insert("title", kind.title());
    context.insert(
        "generated_on",
        &generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    context.insert("headers", headers);
    context.insert("rows", rows);

    let html = templates()?
        .render(TEMPLATE_NAME, &context)
        .map_err(ExportError::Render)?;

    Ok(ReportDocument {
        kind,
        generated_at,
        html,
    })
}
