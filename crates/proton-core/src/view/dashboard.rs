//! Summary statistics for the dashboard panel.

use serde::{Deserialize, Serialize};

use crate::models::{DocumentCategory, ProtocolRecord, ProtocolStatus};

/// Documents counted for one category, used for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: DocumentCategory,
    pub documents: u64,
}

/// Statistics over the current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub processed: usize,
    pub pending: usize,
    /// Processed share, rounded to a whole percentage
    pub completion_rate: u32,
    /// Non-zero category totals across processed records, in category order
    pub category_totals: Vec<CategoryTotal>,
    /// Distinct convênios of the whole store, first-seen order
    pub convenios: Vec<String>,
}

impl DashboardStats {
    /// `view` is the filtered projection; `all` is the whole store (for filter options).
    pub fn compute(view: &[&ProtocolRecord], all: &[ProtocolRecord]) -> Self {
        let total = view.len();
        let processed = view
            .iter()
            .filter(|r| r.status() == ProtocolStatus::Processed)
            .count();
        let completion_rate = if total > 0 {
            ((processed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        let category_totals = DocumentCategory::ALL
            .iter()
            .map(|category| CategoryTotal {
                category: *category,
                documents: view
                    .iter()
                    .filter_map(|r| r.conference())
                    .map(|c| u64::from(c.quantities.get(*category)))
                    .sum(),
            })
            .filter(|t| t.documents > 0)
            .collect();

        let mut convenios: Vec<String> = Vec::new();
        for record in all {
            if !convenios.iter().any(|c| c == record.convenio()) {
                convenios.push(record.convenio().to_string());
            }
        }

        Self {
            total,
            processed,
            pending: total - processed,
            completion_rate,
            category_totals,
            convenios,
        }
    }
}
