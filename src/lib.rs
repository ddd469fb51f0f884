//! Matches an exam candidate's score and reservation category against published
//! admission cutoffs and ranks the colleges and branches they qualify for.

pub mod analyzer;
pub mod categories;
pub mod config;
pub mod cutoff;
pub mod eligibility;
pub mod error;
pub mod export;
pub mod loader;
pub mod logging;
pub mod lookup;
pub mod models;
pub mod options;
pub mod query;

pub use analyzer::{CollegePredictor, RESULT_LIMIT};
pub use error::PredictorError;
pub use models::{CutoffDataset, RankedResult};
pub use query::{CandidateProfile, PredictionQuery};
