use crate::categories::{Category, Gender};
use crate::eligibility::{ScoreFilter, ScoreMetric, ScoreMode};
use crate::error::PredictorError;
use crate::models::LevelDescriptor;
use serde::{Deserialize, Serialize};

/// Institution-type narrowing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UniversityType {
    #[default]
    Any,
    HomeUniversity,
    OtherUniversity,
    StateLevel,
}

impl UniversityType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "any" | "" => Some(UniversityType::Any),
            "hu" | "home-university" | "home" => Some(UniversityType::HomeUniversity),
            "ohu" | "other-university" | "outside" => Some(UniversityType::OtherUniversity),
            "sl" | "state-level" | "state" => Some(UniversityType::StateLevel),
            _ => None,
        }
    }

    pub fn accepts(&self, level: LevelDescriptor) -> bool {
        match self {
            UniversityType::Any => true,
            UniversityType::HomeUniversity => level == LevelDescriptor::HomeUniversity,
            UniversityType::OtherUniversity => level == LevelDescriptor::OtherUniversity,
            UniversityType::StateLevel => level == LevelDescriptor::StateLevel,
        }
    }
}

/// Raw query as entered by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionQuery {
    pub metric: ScoreMetric,
    pub mode: ScoreMode,
    pub percentile: Option<f64>,
    pub rank: Option<i64>,
    pub min_percentile: Option<f64>,
    pub max_percentile: Option<f64>,
    pub min_rank: Option<i64>,
    pub max_rank: Option<i64>,
    pub category: Option<String>,
    pub gender: Gender,
    pub defence: bool,
    pub pwd: bool,
    pub branches: Vec<String>,
    pub regions: Vec<String>,
    pub university_type: UniversityType,
}

/// A validated query.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateProfile {
    pub score: ScoreFilter,
    /// Absent only for datasets without reservation categories.
    pub category: Option<Category>,
    pub gender: Gender,
    pub defence: bool,
    pub pwd: bool,
    pub branches: Vec<String>,
    pub regions: Vec<String>,
    pub university_type: UniversityType,
}

impl CandidateProfile {
    pub fn new(score: ScoreFilter, category: Option<Category>) -> Self {
        Self {
            score,
            category,
            gender: Gender::General,
            defence: false,
            pwd: false,
            branches: Vec::new(),
            regions: Vec::new(),
            university_type: UniversityType::Any,
        }
    }

    pub fn metric(&self) -> ScoreMetric {
        self.score.metric()
    }

    /// Case-insensitive, trimmed match against the requested branches; empty means all.
    pub fn wants_branch(&self, label: &str) -> bool {
        self.branches.is_empty()
            || self
                .branches
                .iter()
                .any(|b| b.trim().eq_ignore_ascii_case(label.trim()))
    }

    pub fn wants_region(&self, region: &str) -> bool {
        self.regions.is_empty()
            || self
                .regions
                .iter()
                .any(|r| r.trim().eq_ignore_ascii_case(region.trim()))
    }
}

fn check_percentile(value: f64) -> Result<f64, PredictorError> {
    if value.is_nan() || !(0.0..=100.0).contains(&value) {
        return Err(PredictorError::PercentileOutOfRange(value));
    }
    Ok(value)
}

fn check_rank(value: i64) -> Result<u32, PredictorError> {
    if value <= 0 {
        return Err(PredictorError::RankNotPositive(value));
    }
    u32::try_from(value).map_err(|_| PredictorError::RankNotPositive(value))
}

impl PredictionQuery {
    /// Validate the raw query into a profile. `requires_category` is set for
    /// category-aware datasets.
    pub fn validate(&self, requires_category: bool) -> Result<CandidateProfile, PredictorError> {
        let score = match (self.mode, self.metric) {
            (ScoreMode::Single, ScoreMetric::Percentile) => {
                let value = self.percentile.ok_or(PredictorError::MissingPercentile)?;
                ScoreFilter::Percentile(check_percentile(value)?)
            }
            (ScoreMode::Single, ScoreMetric::Rank) => {
                let value = self.rank.ok_or(PredictorError::MissingRank)?;
                ScoreFilter::Rank(check_rank(value)?)
            }
            (ScoreMode::Range, ScoreMetric::Percentile) => {
                let (min, max) = self
                    .min_percentile
                    .zip(self.max_percentile)
                    .ok_or(PredictorError::MissingPercentileRange)?;
                let (min, max) = (check_percentile(min)?, check_percentile(max)?);
                if min > max {
                    return Err(PredictorError::InvertedRange {
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
                ScoreFilter::PercentileRange { min, max }
            }
            (ScoreMode::Range, ScoreMetric::Rank) => {
                let (min, max) = self
                    .min_rank
                    .zip(self.max_rank)
                    .ok_or(PredictorError::MissingRankRange)?;
                let (min, max) = (check_rank(min)?, check_rank(max)?);
                if min > max {
                    return Err(PredictorError::InvertedRange {
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
                ScoreFilter::RankRange { min, max }
            }
        };

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Category::parse);
        if requires_category && category.is_none() {
            return Err(PredictorError::MissingCategory);
        }

        Ok(CandidateProfile {
            score,
            category: if requires_category { category } else { None },
            gender: self.gender,
            defence: self.defence,
            pwd: self.pwd,
            branches: self.branches.clone(),
            regions: self.regions.clone(),
            university_type: self.university_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percentile_query(value: f64) -> PredictionQuery {
        PredictionQuery {
            percentile: Some(value),
            category: Some("open".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_single_percentile_query() {
        let profile = percentile_query(99.0).validate(true).unwrap();
        assert_eq!(profile.score, ScoreFilter::Percentile(99.0));
        assert_eq!(profile.category, Some(Category::Open));
    }

    #[test]
    fn missing_score_is_reported_per_mode() {
        let query = PredictionQuery {
            category: Some("SC".to_string()),
            ..Default::default()
        };
        assert_eq!(query.validate(true), Err(PredictorError::MissingPercentile));

        let query = PredictionQuery {
            metric: ScoreMetric::Rank,
            mode: ScoreMode::Range,
            min_rank: Some(10),
            category: Some("SC".to_string()),
            ..Default::default()
        };
        assert_eq!(query.validate(true), Err(PredictorError::MissingRankRange));
    }

    #[test]
    fn out_of_bounds_values_are_rejected() {
        assert_eq!(
            percentile_query(100.5).validate(true),
            Err(PredictorError::PercentileOutOfRange(100.5))
        );

        let query = PredictionQuery {
            metric: ScoreMetric::Rank,
            rank: Some(0),
            category: Some("OPEN".to_string()),
            ..Default::default()
        };
        assert_eq!(query.validate(true), Err(PredictorError::RankNotPositive(0)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = PredictionQuery {
            mode: ScoreMode::Range,
            min_percentile: Some(95.0),
            max_percentile: Some(90.0),
            category: Some("OPEN".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.validate(true),
            Err(PredictorError::InvertedRange { .. })
        ));
    }

    #[test]
    fn category_required_only_for_category_aware_datasets() {
        let query = PredictionQuery {
            percentile: Some(90.0),
            category: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.validate(true), Err(PredictorError::MissingCategory));

        let profile = query.validate(false).unwrap();
        assert_eq!(profile.category, None);
    }

    #[test]
    fn branch_and_region_matching_ignores_case_and_padding() {
        let mut profile = percentile_query(90.0).validate(true).unwrap();
        assert!(profile.wants_branch("Anything"));

        profile.branches = vec![" Computer Engineering ".to_string()];
        profile.regions = vec!["pune".to_string()];
        assert!(profile.wants_branch("computer engineering"));
        assert!(!profile.wants_branch("Civil Engineering"));
        assert!(profile.wants_region("Pune"));
        assert!(!profile.wants_region("Mumbai"));
    }

    #[test]
    fn university_type_accepts_matching_levels() {
        assert!(UniversityType::Any.accepts(LevelDescriptor::StateLevel));
        assert!(UniversityType::HomeUniversity.accepts(LevelDescriptor::HomeUniversity));
        assert!(!UniversityType::StateLevel.accepts(LevelDescriptor::OtherUniversity));
        assert_eq!(UniversityType::parse("OHU"), Some(UniversityType::OtherUniversity));
        assert_eq!(UniversityType::parse("bogus"), None);
    }
}
