//! One-page digitization summary handed to the PDF writer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::format_date_br;
use crate::models::{TallyCounter, TallyKind};

pub const REPORT_TITLE: &str = "Digitization Report";
pub const REPORT_FOOTER: &str = "Proton | Generated by the Digitization Counter";
pub const EMPTY_CHART_MESSAGE: &str = "No data to display in the chart.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyRow {
    pub kind: TallyKind,
    pub label: String,
    pub count: u64,
}

/// Donut chart slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub label: String,
    pub count: u64,
    /// Share of the total, one decimal place
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyReport {
    pub title: String,
    pub generated_on: String,
    pub rows: Vec<TallyRow>,
    pub total: u64,
    /// Absent when nothing was counted
    pub chart: Option<Vec<ChartSlice>>,
    pub chart_placeholder: Option<String>,
    pub footer: String,
    pub file_name: String,
}

impl TallyReport {
    pub fn from_counter(tally: &TallyCounter, generated_on: NaiveDate) -> Self {
        let total = tally.total();
        let rows: Vec<TallyRow> = TallyKind::ALL
            .iter()
            .map(|kind| TallyRow {
                kind: *kind,
                label: kind.label().to_string(),
                count: tally.get(*kind),
            })
            .collect();

        let chart = (total > 0).then(|| {
            rows.iter()
                .map(|row| ChartSlice {
                    label: row.label.clone(),
                    count: row.count,
                    percent: (row.count as f64 * 1000.0 / total as f64).round() / 10.0,
                })
                .collect()
        });
        let chart_placeholder = chart
            .is_none()
            .then(|| EMPTY_CHART_MESSAGE.to_string());

        let date = format_date_br(generated_on);
        Self {
            title: REPORT_TITLE.to_string(),
            file_name: format!("digitization-report-{}.pdf", date.replace('/', "-")),
            generated_on: date,
            rows,
            total,
            chart,
            chart_placeholder,
            footer: REPORT_FOOTER.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
