use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reservation category of a candidate, or the category component of a seat code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Open,
    Ews,
    Sc,
    St,
    Vj,
    Nt1,
    Nt2,
    Nt3,
    Obc,
    Sebc,
    /// A code outside the known enumeration, kept verbatim (upper-cased).
    Unrecognized(String),
}

impl Category {
    pub const KNOWN: [Category; 10] = [
        Category::Open,
        Category::Ews,
        Category::Sc,
        Category::St,
        Category::Vj,
        Category::Nt1,
        Category::Nt2,
        Category::Nt3,
        Category::Obc,
        Category::Sebc,
    ];

    pub fn parse(code: &str) -> Self {
        let code = code.trim().to_uppercase();
        match code.as_str() {
            "OPEN" => Category::Open,
            "EWS" => Category::Ews,
            "SC" => Category::Sc,
            "ST" => Category::St,
            "VJ" => Category::Vj,
            "NT1" => Category::Nt1,
            "NT2" => Category::Nt2,
            "NT3" => Category::Nt3,
            "OBC" => Category::Obc,
            "SEBC" => Category::Sebc,
            _ => Category::Unrecognized(code),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Category::Open => "OPEN",
            Category::Ews => "EWS",
            Category::Sc => "SC",
            Category::St => "ST",
            Category::Vj => "VJ",
            Category::Nt1 => "NT1",
            Category::Nt2 => "NT2",
            Category::Nt3 => "NT3",
            Category::Obc => "OBC",
            Category::Sebc => "SEBC",
            Category::Unrecognized(code) => code,
        }
    }
}

impl From<String> for Category {
    fn from(code: String) -> Self {
        Category::parse(&code)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.code().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered category fallback chains, keyed by the candidate's own category.
///
/// Loaded once from configuration and only read afterwards. A configured table is laid over
/// the built-in chains, so categories it does not mention keep their default fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryFallbacks {
    chains: BTreeMap<Category, Vec<Category>>,
}

impl Default for CategoryFallbacks {
    fn default() -> Self {
        use Category::*;

        let chains = BTreeMap::from([
            (Open, vec![Open]),
            (Ews, vec![Ews, Open]),
            (Sc, vec![Sc, Open]),
            (St, vec![St, Open]),
            (Obc, vec![Obc, Open]),
            (Sebc, vec![Sebc, Obc, Open]),
            (Vj, vec![Vj, Nt1, Nt2, Nt3, Open]),
            (Nt1, vec![Nt1, Nt2, Nt3, Open]),
            (Nt2, vec![Nt2, Nt1, Nt3, Open]),
            (Nt3, vec![Nt3, Nt2, Nt1, Open]),
        ]);
        Self { chains }
    }
}

impl CategoryFallbacks {
    /// Build a table from configured chains, repairing chains that do not start at their
    /// own category or do not end at OPEN.
    pub fn from_chains(chains: BTreeMap<Category, Vec<Category>>) -> Self {
        let chains = chains
            .into_iter()
            .map(|(category, chain)| {
                if category == Category::Open {
                    return (category, vec![Category::Open]);
                }
                let mut normalized = vec![category.clone()];
                for step in chain {
                    if !normalized.contains(&step) {
                        normalized.push(step);
                    }
                }
                normalized.retain(|c| *c != Category::Open);
                normalized.push(Category::Open);
                (category, normalized)
            })
            .collect();
        Self { chains }
    }

    /// Replace the chains of the listed categories, keeping every other default chain.
    pub fn with_overrides(overrides: BTreeMap<Category, Vec<Category>>) -> Self {
        let mut chains = Self::default().chains;
        chains.extend(overrides);
        Self::from_chains(chains)
    }

    /// Ordered categories to probe for a candidate of `category`.
    ///
    /// An unknown category degrades to probing only itself.
    pub fn resolve(&self, category: &Category) -> Vec<Category> {
        match self.chains.get(category) {
            Some(chain) => chain.clone(),
            None => {
                tracing::warn!(
                    category = %category,
                    "no fallback chain for category, probing it without fallback"
                );
                vec![category.clone()]
            }
        }
    }
}

impl<'de> Deserialize<'de> for CategoryFallbacks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<Category, Vec<Category>>::deserialize(deserializer)?;
        Ok(Self::with_overrides(overrides))
    }
}

/// Prefixes used when the candidate declares a disability.
pub const DISABILITY_PREFIXES: [&str; 2] = ["PWD", "PWDR"];
/// Prefixes used when the candidate declares a defence background.
pub const DEFENCE_PREFIXES: [&str; 2] = ["DEF", "DEFR"];
/// Seat-type suffixes in probe order: state level, other university, home university, none.
pub const SEAT_SUFFIXES: [&str; 4] = ["S", "O", "H", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    General,
    Female,
}

/// One seat code to look up in a seat row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatProbe {
    pub code: String,
    pub category: Category,
    pub is_primary: bool,
}

/// Enumerates the seat codes a candidate may hold, in probe priority order.
#[derive(Debug, Clone)]
pub struct SeatCodeGenerator {
    prefixes: Vec<&'static str>,
    chain: Vec<Category>,
    primary: Category,
    suffixes: Vec<&'static str>,
}

impl SeatCodeGenerator {
    pub fn new(gender: Gender, defence: bool, disability: bool, chain: Vec<Category>) -> Self {
        let prefixes = if disability {
            DISABILITY_PREFIXES.to_vec()
        } else if defence {
            DEFENCE_PREFIXES.to_vec()
        } else {
            match gender {
                Gender::Female => vec!["L", "G"],
                Gender::General => vec!["G", "L"],
            }
        };
        let primary = chain.first().cloned().unwrap_or(Category::Open);

        Self {
            prefixes,
            chain,
            primary,
            suffixes: SEAT_SUFFIXES.to_vec(),
        }
    }

    /// Prefix × category × suffix, restartable on every call.
    pub fn probes(&self) -> impl Iterator<Item = SeatProbe> + '_ {
        self.prefixes.iter().flat_map(move |prefix| {
            self.chain.iter().flat_map(move |category| {
                self.suffixes.iter().map(move |suffix| SeatProbe {
                    code: format!("{}{}{}", prefix, category.code(), suffix),
                    category: category.clone(),
                    is_primary: *category == self.primary,
                })
            })
        })
    }
}

/// Seat type encoded in the last character of a seat code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatType {
    State,
    HomeUniversity,
    OtherUniversity,
}

impl SeatType {
    pub fn label(&self) -> &'static str {
        match self {
            SeatType::State => "State",
            SeatType::HomeUniversity => "Home University",
            SeatType::OtherUniversity => "Other",
        }
    }
}

/// Decomposition of a published seat code such as `LOBCH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatCodeParts {
    pub gender: Gender,
    pub category: Category,
    pub seat_type: SeatType,
}

/// Category markers searched for inside a seat code, longest first so `SEBC` wins over `SC`.
const SEAT_CODE_CATEGORIES: [(&str, Category); 10] = [
    ("SEBC", Category::Sebc),
    ("OPEN", Category::Open),
    ("OBC", Category::Obc),
    ("EWS", Category::Ews),
    ("NT1", Category::Nt1),
    ("NT2", Category::Nt2),
    ("NT3", Category::Nt3),
    ("SC", Category::Sc),
    ("ST", Category::St),
    ("VJ", Category::Vj),
];

impl SeatCodeParts {
    /// Best-effort labelling of a seat code. Not used for eligibility.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() || code == "null" {
            return None;
        }

        let gender = if code.starts_with('L') {
            Gender::Female
        } else {
            Gender::General
        };
        let seat_type = match code.chars().last() {
            Some('H') => SeatType::HomeUniversity,
            Some('O') => SeatType::OtherUniversity,
            _ => SeatType::State,
        };
        // Bare class codes such as the flat `EWS` seat carry no prefix or suffix.
        let middle = if SEAT_CODE_CATEGORIES.iter().any(|(marker, _)| *marker == code) {
            code
        } else {
            code.get(1..code.len().saturating_sub(1)).unwrap_or(code)
        };
        let category = SEAT_CODE_CATEGORIES
            .iter()
            .find(|(marker, _)| middle.contains(marker))
            .map(|(_, category)| category.clone())
            .unwrap_or(Category::Open);

        Some(Self {
            gender,
            category,
            seat_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tribe_subclass_falls_back_through_broader_classes() {
        let fallbacks = CategoryFallbacks::default();
        assert_eq!(
            fallbacks.resolve(&Category::Vj),
            vec![
                Category::Vj,
                Category::Nt1,
                Category::Nt2,
                Category::Nt3,
                Category::Open
            ]
        );
        assert_eq!(fallbacks.resolve(&Category::Open), vec![Category::Open]);
    }

    #[test]
    fn every_known_chain_ends_at_open() {
        let fallbacks = CategoryFallbacks::default();
        for category in Category::KNOWN.iter() {
            let chain = fallbacks.resolve(category);
            assert_eq!(chain.first(), Some(category));
            assert_eq!(chain.last(), Some(&Category::Open));
        }
    }

    #[test]
    fn unknown_category_has_no_fallback() {
        let fallbacks = CategoryFallbacks::default();
        let tfws = Category::parse("tfws");
        assert_eq!(tfws, Category::Unrecognized("TFWS".to_string()));
        assert_eq!(fallbacks.resolve(&tfws), vec![tfws.clone()]);
    }

    #[test]
    fn configured_chains_are_normalized() {
        let chains = BTreeMap::from([
            (Category::Sc, vec![Category::Open, Category::St]),
            (Category::Open, vec![Category::Open, Category::Sc]),
        ]);
        let fallbacks = CategoryFallbacks::from_chains(chains);
        assert_eq!(
            fallbacks.resolve(&Category::Sc),
            vec![Category::Sc, Category::St, Category::Open]
        );
        assert_eq!(fallbacks.resolve(&Category::Open), vec![Category::Open]);
    }

    #[test]
    fn overrides_keep_unlisted_default_chains() {
        let fallbacks =
            CategoryFallbacks::with_overrides(BTreeMap::from([(Category::Sebc, vec![Category::Obc])]));
        assert_eq!(
            fallbacks.resolve(&Category::Sebc),
            vec![Category::Sebc, Category::Obc, Category::Open]
        );
        assert_eq!(fallbacks.resolve(&Category::Sc), vec![Category::Sc, Category::Open]);
        assert_eq!(fallbacks.resolve(&Category::Vj).len(), 5);
    }

    #[test]
    fn female_candidate_probes_ladies_then_general_codes() {
        let generator =
            SeatCodeGenerator::new(Gender::Female, false, false, vec![Category::Sc, Category::Open]);
        let codes: Vec<String> = generator.probes().map(|p| p.code).collect();
        assert_eq!(&codes[..4], &["LSCS", "LSCO", "LSCH", "LSC"]);
        assert_eq!(codes[4], "LOPENS");
        assert_eq!(&codes[8..12], &["GSCS", "GSCO", "GSCH", "GSC"]);
    }

    #[test]
    fn general_candidate_probes_general_then_ladies_codes() {
        let generator =
            SeatCodeGenerator::new(Gender::General, false, false, vec![Category::Sc, Category::Open]);
        let codes: Vec<String> = generator.probes().map(|p| p.code).collect();
        assert_eq!(codes.len(), 2 * 2 * 4);
        assert_eq!(&codes[..4], &["GSCS", "GSCO", "GSCH", "GSC"]);
        assert_eq!(codes[4], "GOPENS");
        assert_eq!(codes[8], "LSCS");
    }

    #[test]
    fn disability_prefix_takes_precedence_over_defence_and_gender() {
        let generator = SeatCodeGenerator::new(Gender::Female, true, true, vec![Category::Open]);
        let codes: Vec<String> = generator.probes().map(|p| p.code).collect();
        assert_eq!(
            codes,
            vec!["PWDOPENS", "PWDOPENO", "PWDOPENH", "PWDOPEN", "PWDROPENS", "PWDROPENO", "PWDROPENH", "PWDROPEN"]
        );

        let defence = SeatCodeGenerator::new(Gender::Female, true, false, vec![Category::Open]);
        assert!(defence.probes().all(|p| p.code.starts_with("DEF")));
    }

    #[test]
    fn probes_mark_only_own_category_as_primary() {
        let generator =
            SeatCodeGenerator::new(Gender::Female, false, false, vec![Category::Obc, Category::Open]);
        for probe in generator.probes() {
            assert_eq!(probe.is_primary, probe.category == Category::Obc, "{}", probe.code);
        }
        // Restartable: a second pass yields the same sequence.
        assert_eq!(generator.probes().count(), generator.probes().count());
    }

    #[test]
    fn seat_code_parts_decompose_published_codes() {
        let parts = SeatCodeParts::parse("LSEBCH").unwrap();
        assert_eq!(parts.gender, Gender::Female);
        assert_eq!(parts.category, Category::Sebc);
        assert_eq!(parts.seat_type, SeatType::HomeUniversity);

        let parts = SeatCodeParts::parse("GNT2O").unwrap();
        assert_eq!(parts.category, Category::Nt2);
        assert_eq!(parts.seat_type.label(), "Other");

        let parts = SeatCodeParts::parse("EWS").unwrap();
        assert_eq!(parts.category, Category::Ews);
        assert_eq!(parts.gender, Gender::General);

        assert!(SeatCodeParts::parse("null").is_none());
    }
}
