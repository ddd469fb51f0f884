use crate::models::{
    BranchRecord, CollegeRecord, CutoffDataset, DatasetSelector, ExamType, SeatRow,
    ALL_INDIA_SEAT_CODE,
};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static INSTITUTE_CODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*-\s*").expect("Invalid regex"));

#[derive(Debug, Deserialize)]
struct RawCapCollege {
    #[serde(default)]
    institute_code: Value,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    district: Option<String>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default)]
    branches: Option<Vec<RawCapBranch>>,
}

#[derive(Debug, Deserialize)]
struct RawCapBranch {
    branch_info: String,
    #[serde(default)]
    table_data: Vec<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawAllIndiaInstitute {
    #[serde(rename = "Institute Code", default)]
    institute_code: Value,
    #[serde(rename = "Institute Name")]
    institute_name: String,
    #[serde(rename = "District", default)]
    district: Option<String>,
    #[serde(rename = "Courses", default)]
    courses: Vec<RawAllIndiaCourse>,
}

#[derive(Debug, Deserialize)]
struct RawAllIndiaCourse {
    #[serde(rename = "Course Name")]
    course_name: String,
    #[serde(rename = "Choice Code", default)]
    choice_code: Value,
    #[serde(rename = "All India Merit", default)]
    all_india_merit: Option<String>,
    #[serde(rename = "Merit Exam", default)]
    merit_exam: Option<String>,
}

/// Institute codes and choice codes show up both as strings and as numbers.
fn value_to_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads published cutoff files from a data directory.
pub struct DatasetLoader {
    data_dir: PathBuf,
    mht_cet_pattern: String,
    all_india_pattern: String,
}

impl DatasetLoader {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        mht_cet_pattern: impl Into<String>,
        all_india_pattern: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            mht_cet_pattern: mht_cet_pattern.into(),
            all_india_pattern: all_india_pattern.into(),
        }
    }

    pub fn path_for(&self, selector: DatasetSelector) -> PathBuf {
        let pattern = match selector.exam_type {
            ExamType::MhtCet => &self.mht_cet_pattern,
            ExamType::AllIndia => &self.all_india_pattern,
        };
        self.data_dir
            .join(pattern.replace("{round}", &selector.round.to_string()))
    }

    pub fn load(&self, selector: DatasetSelector) -> Result<CutoffDataset> {
        let path = self.path_for(selector);
        load_file(&path, selector)
    }
}

pub fn load_file(path: &Path, selector: DatasetSelector) -> Result<CutoffDataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cutoff file: {}", path.display()))?;

    let dataset = parse_dataset(&content, selector)
        .with_context(|| format!("Failed to parse cutoff file: {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        colleges = dataset.colleges.len(),
        "loaded cutoff dataset"
    );
    Ok(dataset)
}

pub fn parse_dataset(content: &str, selector: DatasetSelector) -> Result<CutoffDataset> {
    let colleges = match selector.exam_type {
        ExamType::MhtCet => parse_mht_cet(content)?,
        ExamType::AllIndia => parse_all_india(content)?,
    };
    Ok(CutoffDataset::new(selector, colleges))
}

/// State CAP format: an object keyed by college name.
fn parse_mht_cet(content: &str) -> Result<Vec<CollegeRecord>> {
    let raw: BTreeMap<String, RawCapCollege> =
        serde_json::from_str(content).context("Invalid MHT-CET cutoff JSON")?;

    let mut colleges = Vec::with_capacity(raw.len());
    for (name, college) in raw {
        let Some(raw_branches) = college.branches else {
            tracing::debug!(college = %name, "college has no branches, skipping");
            continue;
        };

        let branches = raw_branches
            .into_iter()
            .map(|branch| BranchRecord {
                label: branch.branch_info,
                choice_code: None,
                rows: branch
                    .table_data
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .filter(|(code, _)| code != "null")
                            .filter_map(|(code, cell)| match cell {
                                Value::String(cell) => Some((code, cell)),
                                _ => None,
                            })
                            .collect::<SeatRow>()
                    })
                    .collect(),
            })
            .collect();

        colleges.push(CollegeRecord {
            identifier: name.clone(),
            display_name: name,
            institute_code: value_to_code(&college.institute_code).unwrap_or_default(),
            status: college.status.unwrap_or_default(),
            district: college.district.unwrap_or_default(),
            level: college.level.unwrap_or_default(),
            branches,
        });
    }

    Ok(colleges)
}

/// All-India format: an array of institutes, each course carrying one merit cell.
fn parse_all_india(content: &str) -> Result<Vec<CollegeRecord>> {
    let raw: Vec<RawAllIndiaInstitute> =
        serde_json::from_str(content).context("Invalid All-India cutoff JSON")?;

    let colleges = raw
        .into_iter()
        .map(|institute| {
            let code_in_name = INSTITUTE_CODE_PREFIX
                .captures(&institute.institute_name)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string());
            let display_name = INSTITUTE_CODE_PREFIX
                .replace(&institute.institute_name, "")
                .trim()
                .to_string();
            let institute_code = value_to_code(&institute.institute_code)
                .or(code_in_name)
                .unwrap_or_default();
            let identifier = if institute_code.is_empty() {
                display_name.clone()
            } else {
                format!("{} - {}", institute_code, display_name)
            };
            let status = institute
                .courses
                .iter()
                .find_map(|c| c.merit_exam.clone())
                .unwrap_or_default();

            let branches = institute
                .courses
                .into_iter()
                .map(|course| BranchRecord {
                    label: course.course_name,
                    choice_code: value_to_code(&course.choice_code),
                    rows: course
                        .all_india_merit
                        .map(|merit| vec![SeatRow::from_iter([(ALL_INDIA_SEAT_CODE, merit)])])
                        .unwrap_or_default(),
                })
                .collect();

            CollegeRecord {
                identifier,
                display_name,
                institute_code,
                status,
                district: institute.district.unwrap_or_default(),
                level: "All India".to_string(),
                branches,
            }
        })
        .collect();

    Ok(colleges)
}
