use thiserror::Error;

/// Query validation failures, reported before any matching work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    #[error("Please enter your percentile.")]
    MissingPercentile,

    #[error("Please enter your rank.")]
    MissingRank,

    #[error("Please enter both minimum and maximum percentile.")]
    MissingPercentileRange,

    #[error("Please enter both minimum and maximum rank.")]
    MissingRankRange,

    #[error("Percentile must be between 0 and 100 (got {0}).")]
    PercentileOutOfRange(f64),

    #[error("Rank must be a positive number (got {0}).")]
    RankNotPositive(i64),

    #[error("Range minimum {min} is greater than maximum {max}.")]
    InvertedRange { min: String, max: String },

    #[error("Please select a caste category.")]
    MissingCategory,
}
