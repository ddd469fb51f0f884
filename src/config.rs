use crate::categories::CategoryFallbacks;
use crate::lookup::{InstituteExclusions, RegionTable};
use crate::models::{DatasetSelector, ExamType};
use crate::query::PredictionQuery;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub exam_type: ExamType,
    pub cap_round: u8,
    // Data source configuration
    pub data_directory: Option<String>,
    pub output_directory: Option<String>,
    pub mht_cet_file_pattern: String,
    pub all_india_file_pattern: String,
    pub query: PredictionQuery,
    // Reference tables
    pub regions: RegionTable,
    pub exclusions: InstituteExclusions,
    pub category_fallbacks: CategoryFallbacks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exam_type: ExamType::MhtCet,
            cap_round: 1,
            data_directory: Some("data".to_string()),
            output_directory: Some("output".to_string()),
            mht_cet_file_pattern: "cap{round}_2025_formatted.json".to_string(),
            all_india_file_pattern: "AI_CAP{round}_25-26.json".to_string(),
            query: PredictionQuery::default(),
            regions: RegionTable::default(),
            exclusions: InstituteExclusions::default(),
            category_fallbacks: CategoryFallbacks::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        if !(1..=4).contains(&config.cap_round) {
            anyhow::bail!("cap_round must be between 1 and 4, got {}", config.cap_round);
        }
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }

    pub fn selector(&self) -> DatasetSelector {
        DatasetSelector {
            exam_type: self.exam_type,
            round: self.cap_round,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Category;

    #[test]
    fn default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = Config::default();
        config.save_to_file(path).unwrap();
        let loaded = Config::load_from_file(path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
exam_type = "all-india"
cap_round = 2

[query]
metric = "rank"
rank = 4200

[category_fallbacks]
SEBC = ["OBC"]
"#,
        )
        .unwrap();

        let config = Config::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.exam_type, ExamType::AllIndia);
        assert_eq!(config.query.rank, Some(4200));
        assert_eq!(config.regions, RegionTable::default());
        assert_eq!(
            config.category_fallbacks.resolve(&Category::Sebc),
            vec![Category::Sebc, Category::Obc, Category::Open]
        );
        assert_eq!(
            config.category_fallbacks.resolve(&Category::Sc),
            vec![Category::Sc, Category::Open]
        );
        assert_eq!(
            config.category_fallbacks.resolve(&Category::Vj),
            vec![
                Category::Vj,
                Category::Nt1,
                Category::Nt2,
                Category::Nt3,
                Category::Open
            ]
        );
    }

    #[test]
    fn out_of_range_round_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cap_round = 7\n").unwrap();
        assert!(Config::load_from_file(path.to_str().unwrap()).is_err());
    }
}
