use crate::models::Cutoff;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMetric {
    #[default]
    Percentile,
    Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    #[default]
    Single,
    Range,
}

/// A validated score constraint.
///
/// Single values ask "does my score clear this cutoff"; ranges ask "does this cutoff fall
/// inside my band".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScoreFilter {
    Percentile(f64),
    Rank(u32),
    PercentileRange { min: f64, max: f64 },
    RankRange { min: u32, max: u32 },
}

impl ScoreFilter {
    pub fn metric(&self) -> ScoreMetric {
        match self {
            ScoreFilter::Percentile(_) | ScoreFilter::PercentileRange { .. } => ScoreMetric::Percentile,
            ScoreFilter::Rank(_) | ScoreFilter::RankRange { .. } => ScoreMetric::Rank,
        }
    }

    pub fn mode(&self) -> ScoreMode {
        match self {
            ScoreFilter::Percentile(_) | ScoreFilter::Rank(_) => ScoreMode::Single,
            ScoreFilter::PercentileRange { .. } | ScoreFilter::RankRange { .. } => ScoreMode::Range,
        }
    }

    /// Whether a parsed cutoff qualifies under this filter.
    pub fn admits(&self, cutoff: &Cutoff) -> bool {
        match *self {
            ScoreFilter::Percentile(percentile) => percentile >= cutoff.percentile,
            ScoreFilter::Rank(rank) => rank <= cutoff.rank,
            ScoreFilter::PercentileRange { min, max } => {
                cutoff.percentile >= min && cutoff.percentile <= max
            }
            ScoreFilter::RankRange { min, max } => cutoff.rank >= min && cutoff.rank <= max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cutoff(rank: u32, percentile: f64) -> Cutoff {
        Cutoff { rank, percentile }
    }

    #[test]
    fn single_percentile_clears_lower_cutoff() {
        let filter = ScoreFilter::Percentile(95.0);
        assert!(filter.admits(&cutoff(3000, 94.2)));
        assert!(filter.admits(&cutoff(2500, 95.0)));
        assert!(!filter.admits(&cutoff(1000, 97.8)));
    }

    #[test]
    fn single_rank_clears_higher_cutoff_rank() {
        let filter = ScoreFilter::Rank(5000);
        assert!(filter.admits(&cutoff(7000, 90.0)));
        assert!(filter.admits(&cutoff(5000, 92.0)));
        assert!(!filter.admits(&cutoff(4999, 93.0)));
    }

    #[test]
    fn ranges_are_boundary_inclusive() {
        let filter = ScoreFilter::PercentileRange { min: 90.0, max: 95.0 };
        assert!(filter.admits(&cutoff(1, 90.0)));
        assert!(filter.admits(&cutoff(1, 95.0)));
        assert!(!filter.admits(&cutoff(1, 95.01)));
        assert!(!filter.admits(&cutoff(1, 89.99)));

        let filter = ScoreFilter::RankRange { min: 100, max: 200 };
        assert!(filter.admits(&cutoff(100, 0.0)));
        assert!(filter.admits(&cutoff(200, 0.0)));
        assert!(!filter.admits(&cutoff(201, 0.0)));
    }

    #[test]
    fn range_mode_does_not_mean_clearing_the_cutoff() {
        // A candidate band of 80-85 does not include a 70 cutoff even though 80 would clear it.
        let filter = ScoreFilter::PercentileRange { min: 80.0, max: 85.0 };
        assert!(!filter.admits(&cutoff(9000, 70.0)));
        assert_eq!(filter.mode(), ScoreMode::Range);
        assert_eq!(filter.metric(), ScoreMetric::Percentile);
    }
}
