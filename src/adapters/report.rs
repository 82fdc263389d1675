use crate::domain::model::{AgeCategory, AgeHistogram, ReportFormat};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HistogramReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub total_players: u64,
    pub brackets: &'a AgeHistogram,
}

pub fn render(histogram: &AgeHistogram, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(histogram)),
        ReportFormat::Json => render_json(histogram),
    }
}

/// One line per non-empty bracket, youngest first.
pub fn render_text(histogram: &AgeHistogram) -> String {
    if histogram.is_empty() {
        return "No players found".to_string();
    }

    AgeCategory::ALL
        .iter()
        .filter_map(|category| {
            histogram
                .get(*category)
                .map(|count| format!("{} -> {} players", category, count))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(histogram: &AgeHistogram) -> Result<String> {
    let report = HistogramReport {
        generated_at: Utc::now(),
        total_players: histogram.total(),
        brackets: histogram,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
