use crate::categories::Gender;
use serde::{Deserialize, Serialize};

pub const OTHER_REGION: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPrefix {
    pub prefix: String,
    pub region: String,
}

/// Institute-code prefix to region lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTable {
    pub prefixes: Vec<RegionPrefix>,
}

impl Default for RegionTable {
    fn default() -> Self {
        let prefixes = [
            ("01", "Amravati"),
            ("02", "Chhatrapati Sambhaji Nagar"),
            ("03", "Mumbai"),
            ("04", "Nagpur"),
            ("05", "Nashik"),
            ("06", "Pune"),
            ("16", "Pune"),
        ]
        .into_iter()
        .map(|(prefix, region)| RegionPrefix {
            prefix: prefix.to_string(),
            region: region.to_string(),
        })
        .collect();

        Self { prefixes }
    }
}

impl RegionTable {
    pub fn region_for(&self, institute_code: &str) -> &str {
        let code = institute_code.trim();
        if code.is_empty() {
            return OTHER_REGION;
        }
        self.prefixes
            .iter()
            .find(|p| code.starts_with(&p.prefix))
            .map(|p| p.region.as_str())
            .unwrap_or(OTHER_REGION)
    }
}

/// Institutes that admit only female candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstituteExclusions {
    pub women_only: Vec<String>,
}

impl Default for InstituteExclusions {
    fn default() -> Self {
        Self {
            women_only: vec!["06276".to_string()],
        }
    }
}

fn normalize_code(code: &str) -> &str {
    let code = code.trim();
    let stripped = code.trim_start_matches('0');
    if stripped.is_empty() { code } else { stripped }
}

impl InstituteExclusions {
    /// Whether a college must be skipped entirely for a candidate of `gender`.
    pub fn excludes(&self, institute_code: &str, gender: Gender) -> bool {
        if gender == Gender::Female {
            return false;
        }
        let code = normalize_code(institute_code);
        !code.is_empty() && self.women_only.iter().any(|w| normalize_code(w) == code)
    }
}
