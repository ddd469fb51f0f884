use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Seat code under which the category-less All-India dataset stores its single cutoff cell.
pub const ALL_INDIA_SEAT_CODE: &str = "JEE-AI";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamType {
    #[serde(rename = "mht-cet")]
    MhtCet,
    #[serde(rename = "all-india")]
    AllIndia,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::MhtCet => "mht-cet",
            ExamType::AllIndia => "all-india",
        }
    }

    /// Whether datasets of this exam carry reservation categories in their seat codes.
    pub fn has_categories(&self) -> bool {
        matches!(self, ExamType::MhtCet)
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mht-cet" | "mhtcet" | "cet" => Ok(ExamType::MhtCet),
            "all-india" | "allindia" | "jee" => Ok(ExamType::AllIndia),
            other => Err(format!("unknown exam type: {}", other)),
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chooses which pre-loaded cutoff dataset a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetSelector {
    pub exam_type: ExamType,
    pub round: u8,
}

/// Admission level of a college as published in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelDescriptor {
    HomeUniversity,
    OtherUniversity,
    StateLevel,
}

impl LevelDescriptor {
    pub fn from_level(level: &str) -> Self {
        let level = level.to_lowercase();
        if level.contains("outside") {
            LevelDescriptor::OtherUniversity
        } else if level.contains("home university") {
            LevelDescriptor::HomeUniversity
        } else {
            LevelDescriptor::StateLevel
        }
    }
}

/// One published cutoff row of a branch: seat code -> raw cutoff cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatRow(pub BTreeMap<String, String>);

impl SeatRow {
    pub fn get(&self, seat_code: &str) -> Option<&str> {
        self.0.get(seat_code).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SeatRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SeatRow(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub label: String,
    pub choice_code: Option<String>,
    pub rows: Vec<SeatRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeRecord {
    pub identifier: String,
    pub display_name: String,
    pub institute_code: String,
    pub status: String,
    pub district: String,
    pub level: String,
    pub branches: Vec<BranchRecord>,
}

impl CollegeRecord {
    pub fn level_descriptor(&self) -> LevelDescriptor {
        LevelDescriptor::from_level(&self.level)
    }
}

/// Immutable cutoff data for one (exam type, round) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffDataset {
    pub selector: DatasetSelector,
    pub colleges: Vec<CollegeRecord>,
}

impl CutoffDataset {
    pub fn new(selector: DatasetSelector, colleges: Vec<CollegeRecord>) -> Self {
        Self { selector, colleges }
    }

    pub fn has_categories(&self) -> bool {
        self.selector.exam_type.has_categories()
    }
}

/// A parsed cutoff cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cutoff {
    pub rank: u32,
    pub percentile: f64,
}

/// A seat of one branch row that the candidate qualifies for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleSeat {
    pub seat_code: String,
    pub rank: u32,
    pub percentile: f64,
    pub is_primary_category: bool,
    /// 0 for the candidate's own category, 1 for a fallback category.
    pub tie_break_priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchMatch {
    pub branch: String,
    pub choice_code: Option<String>,
    pub best_cutoff: f64,
    pub best_cutoff_rank: u32,
    pub matched_seat_code: String,
    pub is_primary_category: bool,
    pub tie_break_priority: u8,
    pub eligible_seat_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollegeMatch {
    pub identifier: String,
    pub display_name: String,
    pub institute_code: String,
    pub status: String,
    pub district: String,
    pub level: String,
    pub region: String,
    pub branches: Vec<BranchMatch>,
    pub closing_percentile: f64,
    pub closing_rank: u32,
    pub has_primary_category_match: bool,
}

/// Ranked colleges for one query, capped to the engine's result limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub selector: DatasetSelector,
    pub metric: crate::eligibility::ScoreMetric,
    /// Number of matching colleges before the cap was applied.
    pub total_matches: usize,
    pub colleges: Vec<CollegeMatch>,
}

impl RankedResult {
    pub fn is_empty(&self) -> bool {
        self.colleges.is_empty()
    }

    pub fn branch_count(&self) -> usize {
        self.colleges.iter().map(|c| c.branches.len()).sum()
    }
}
