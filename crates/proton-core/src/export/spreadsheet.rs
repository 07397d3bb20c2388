//! Spreadsheet export: one sheet per document category.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{escape_csv, format_date_br, ExportError, ExportResult};
use crate::models::{DocumentCategory, ProtocolRecord};

/// Merged title row of every sheet.
pub const SHEET_TITLE: &str = "RECEIPT CONTROL - MOVDOC PROTOCOL";
/// Column headers.
pub const SHEET_COLUMNS: [&str; 4] = ["PROTOCOL", "TYPE", "QTY.", "NOTE"];
/// Column widths, in characters.
pub const SHEET_COLUMN_WIDTHS: [u32; 4] = [20, 12, 12, 45];

const DEFAULT_NOTE: &str = "OK";
const UNKNOWN_RESPONSIBLE: &str = "Not informed";

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    pub protocol: String,
    pub type_code: String,
    pub quantity: u32,
    pub note: String,
}

/// One worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub category: DocumentCategory,
    pub name: String,
    pub title: String,
    pub date_line: String,
    pub responsible_line: String,
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Render header block and rows as CSV.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str(&escape_csv(&self.title));
        csv.push('\n');
        csv.push_str(&format!(
            "{},{}\n",
            escape_csv(&self.date_line),
            escape_csv(&self.responsible_line)
        ));
        csv.push_str(&SHEET_COLUMNS.join(","));
        csv.push('\n');

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                escape_csv(&row.protocol),
                escape_csv(&row.type_code),
                row.quantity,
                escape_csv(&row.note),
            ));
        }

        csv
    }
}

/// Workbook handed to the spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookExport {
    pub reference_date: NaiveDate,
    pub responsible: String,
    pub exported_at: String,
    /// Number of processed protocols considered
    pub processed_count: usize,
    pub sheets: Vec<Sheet>,
}

impl WorkbookExport {
    /// Build the workbook from the store's records. Only processed ones are exported.
    pub fn from_records(
        records: &[ProtocolRecord],
        reference_date: NaiveDate,
        responsible: Option<&str>,
    ) -> ExportResult<Self> {
        let processed: Vec<&ProtocolRecord> =
            records.iter().filter(|r| r.conference().is_some()).collect();
        if processed.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let responsible = responsible
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNKNOWN_RESPONSIBLE)
            .to_string();
        let date_line = format!("DATE: {}", format_date_br(reference_date));
        let responsible_line = format!("RESPONSIBLE: {}", responsible);

        let sheets: Vec<Sheet> = DocumentCategory::ALL
            .iter()
            .filter_map(|category| {
                let rows: Vec<SheetRow> = processed
                    .iter()
                    .filter_map(|record| {
                        let conference = record.conference()?;
                        let quantity = conference.quantities.get(*category);
                        (quantity > 0).then(|| SheetRow {
                            protocol: record.id().to_string(),
                            type_code: category.code(),
                            quantity,
                            note: if conference.notes.trim().is_empty() {
                                DEFAULT_NOTE.to_string()
                            } else {
                                conference.notes.clone()
                            },
                        })
                    })
                    .collect();

                (!rows.is_empty()).then(|| Sheet {
                    category: *category,
                    name: sheet_name(*category).to_string(),
                    title: SHEET_TITLE.to_string(),
                    date_line: date_line.clone(),
                    responsible_line: responsible_line.clone(),
                    rows,
                })
            })
            .collect();

        if sheets.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        Ok(Self {
            reference_date,
            responsible,
            exported_at: Utc::now().to_rfc3339(),
            processed_count: processed.len(),
            sheets,
        })
    }

    /// Suggested file name, e.g. `Report_MOVDOC_05-01-2024.xlsx`.
    pub fn file_name(&self) -> String {
        format!(
            "Report_MOVDOC_{}.xlsx",
            format_date_br(self.reference_date).replace('/', "-")
        )
    }

    /// Total data rows across sheets.
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn sheet_name(category: DocumentCategory) -> &'static str {
    match category {
        DocumentCategory::Outpatient => "Outpatient",
        DocumentCategory::Imaging => "Imaging",
        DocumentCategory::Emergency => "Emergency Sheet",
        DocumentCategory::Inpatient => "Inpatient",
    }
}
