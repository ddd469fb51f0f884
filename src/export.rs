use crate::categories::SeatCodeParts;
use crate::eligibility::ScoreMetric;
use crate::models::{RankedResult, ALL_INDIA_SEAT_CODE};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One (college, branch) line of a preference list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceRow {
    #[serde(rename = "#")]
    pub position: usize,
    #[serde(rename = "College Code")]
    pub college_code: String,
    #[serde(rename = "College Name")]
    pub college_name: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Choice Code")]
    pub choice_code: String,
    #[serde(rename = "Seat Code")]
    pub seat_code: String,
    #[serde(rename = "Seat Type")]
    pub seat_type: String,
    #[serde(rename = "Primary Category")]
    pub primary_category: bool,
    #[serde(rename = "Cutoff Percentile")]
    pub cutoff_percentile: f64,
    #[serde(rename = "Cutoff Rank")]
    pub cutoff_rank: u32,
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "Region")]
    pub region: String,
}

const CSV_HEADERS: [&str; 12] = [
    "#",
    "College Code",
    "College Name",
    "Branch",
    "Choice Code",
    "Seat Code",
    "Seat Type",
    "Primary Category",
    "Cutoff Percentile",
    "Cutoff Rank",
    "District",
    "Region",
];

fn seat_type_label(seat_code: &str) -> String {
    if seat_code == ALL_INDIA_SEAT_CODE {
        return "All India".to_string();
    }
    SeatCodeParts::parse(seat_code)
        .map(|parts| parts.seat_type.label().to_string())
        .unwrap_or_default()
}

/// Flatten a ranked result into one row per (college, branch), keeping the ranked order.
pub fn flatten(result: &RankedResult) -> Vec<PreferenceRow> {
    result
        .colleges
        .iter()
        .flat_map(|college| {
            college.branches.iter().map(move |branch| (college, branch))
        })
        .enumerate()
        .map(|(i, (college, branch))| PreferenceRow {
            position: i + 1,
            college_code: college.institute_code.clone(),
            college_name: college.display_name.clone(),
            branch: branch.branch.clone(),
            choice_code: branch.choice_code.clone().unwrap_or_default(),
            seat_code: branch.matched_seat_code.clone(),
            seat_type: seat_type_label(&branch.matched_seat_code),
            primary_category: branch.is_primary_category,
            cutoff_percentile: branch.best_cutoff,
            cutoff_rank: branch.best_cutoff_rank,
            district: college.district.clone(),
            region: college.region.clone(),
        })
        .collect()
}

/// Write the preference list as CSV. The header row is written even when nothing matched.
pub fn write_csv(result: &RankedResult, path: &Path) -> Result<usize> {
    let rows = flatten(result);
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer.write_record(CSV_HEADERS)?;
    for row in &rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(rows.len())
}

pub fn write_json(result: &RankedResult, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, result)?;
    Ok(())
}

/// Plain-text report of a ranked result.
pub fn render_report(result: &RankedResult) -> String {
    let mut content = String::new();
    content.push_str(&format!(
        "College Predictor Results ({} round {})\n",
        result.selector.exam_type, result.selector.round
    ));
    content.push_str("==========================================\n\n");

    if result.is_empty() {
        content.push_str("No matching colleges found for the given profile.\n");
        return content;
    }

    if result.total_matches > result.colleges.len() {
        content.push_str(&format!(
            "Showing top {} of {} matching colleges\n\n",
            result.colleges.len(),
            result.total_matches
        ));
    }

    for (i, college) in result.colleges.iter().enumerate() {
        let closing = match result.metric {
            ScoreMetric::Percentile => format!("closing percentile {:.2}", college.closing_percentile),
            ScoreMetric::Rank => format!("closing rank {}", college.closing_rank),
        };
        content.push_str(&format!(
            "{}. {} [{}] - {}, {} ({})\n",
            i + 1,
            college.display_name,
            college.institute_code,
            college.district,
            college.region,
            closing
        ));

        for branch in &college.branches {
            let marker = if branch.is_primary_category { "*" } else { " " };
            content.push_str(&format!(
                "   {} {} - {} : {:.2} (rank {})\n",
                marker, branch.branch, branch.matched_seat_code, branch.best_cutoff, branch.best_cutoff_rank
            ));
        }
        content.push('\n');
    }

    content.push_str("* seat matched in your own category\n");
    content
}

pub fn write_report(result: &RankedResult, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(render_report(result).as_bytes())?;
    Ok(())
}
