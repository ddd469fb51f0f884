use crate::categories::{Category, CategoryFallbacks, SeatCodeGenerator, SeatProbe};
use crate::cutoff::parse_cutoff;
use crate::eligibility::ScoreMetric;
use crate::error::PredictorError;
use crate::lookup::{InstituteExclusions, RegionTable};
use crate::models::{
    BranchMatch, BranchRecord, CollegeMatch, CollegeRecord, CutoffDataset, EligibleSeat,
    RankedResult, ALL_INDIA_SEAT_CODE,
};
use crate::query::{CandidateProfile, PredictionQuery};
use std::cmp::Ordering;

/// Maximum number of colleges returned for one query.
pub const RESULT_LIMIT: usize = 30;

/// Bare seat class layered on top of the composed codes for EWS candidates.
const FLAT_EWS_SEAT_CODE: &str = "EWS";

/// Matches candidate profiles against a cutoff dataset.
///
/// Holds only read-only reference tables, so one predictor can serve any number of
/// queries, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct CollegePredictor {
    fallbacks: CategoryFallbacks,
    regions: RegionTable,
    exclusions: InstituteExclusions,
}

impl CollegePredictor {
    pub fn new(
        fallbacks: CategoryFallbacks,
        regions: RegionTable,
        exclusions: InstituteExclusions,
    ) -> Self {
        Self {
            fallbacks,
            regions,
            exclusions,
        }
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Validate a raw query, then rank the dataset for it.
    pub fn predict(
        &self,
        dataset: &CutoffDataset,
        query: &PredictionQuery,
    ) -> Result<RankedResult, PredictorError> {
        let profile = query.validate(dataset.has_categories())?;
        Ok(self.rank_colleges(dataset, &profile))
    }

    /// Main matching function: resolve every branch, aggregate per college, then rank.
    pub fn rank_colleges(&self, dataset: &CutoffDataset, profile: &CandidateProfile) -> RankedResult {
        // Step 1: Build the seat codes to probe once for the whole dataset
        let probes = self.seat_probes(dataset, profile);
        tracing::debug!(
            exam = %dataset.selector.exam_type,
            round = dataset.selector.round,
            probes = probes.len(),
            colleges = dataset.colleges.len(),
            "matching profile against dataset"
        );

        // Step 2: Resolve and aggregate each college
        let mut colleges: Vec<CollegeMatch> = dataset
            .colleges
            .iter()
            .filter_map(|college| self.aggregate_college(college, &probes, profile, dataset.has_categories()))
            .collect();

        // Step 3: Rank and cap
        let total_matches = colleges.len();
        sort_colleges(&mut colleges, profile.metric(), dataset.has_categories());
        colleges.truncate(RESULT_LIMIT);

        tracing::info!(
            total_matches,
            returned = colleges.len(),
            "ranked colleges for profile"
        );

        RankedResult {
            selector: dataset.selector,
            metric: profile.metric(),
            total_matches,
            colleges,
        }
    }

    /// Seat codes to look up in every row, in probe priority order.
    pub fn seat_probes(&self, dataset: &CutoffDataset, profile: &CandidateProfile) -> Vec<SeatProbe> {
        let category = match (&profile.category, dataset.has_categories()) {
            (Some(category), true) => category,
            _ => {
                return vec![SeatProbe {
                    code: ALL_INDIA_SEAT_CODE.to_string(),
                    category: Category::Open,
                    is_primary: true,
                }];
            }
        };

        let chain = self.fallbacks.resolve(category);
        let generator = SeatCodeGenerator::new(profile.gender, profile.defence, profile.pwd, chain);
        let mut probes: Vec<SeatProbe> = generator.probes().collect();

        if *category == Category::Ews {
            probes.push(SeatProbe {
                code: FLAT_EWS_SEAT_CODE.to_string(),
                category: Category::Ews,
                is_primary: true,
            });
        }

        probes
    }

    /// Resolve every branch of a college and summarise the ones that survive the filters.
    fn aggregate_college(
        &self,
        college: &CollegeRecord,
        probes: &[SeatProbe],
        profile: &CandidateProfile,
        has_categories: bool,
    ) -> Option<CollegeMatch> {
        if self.exclusions.excludes(&college.institute_code, profile.gender) {
            tracing::debug!(college = %college.identifier, "skipping women-only institute");
            return None;
        }

        let region = self.regions.region_for(&college.institute_code);

        let mut branches: Vec<BranchMatch> = college
            .branches
            .iter()
            .filter_map(|branch| resolve_branch(branch, probes, profile))
            .collect();

        // Filters narrow the resolved set; they never change how a branch is resolved.
        branches.retain(|b| profile.wants_branch(&b.branch));
        if !profile.wants_region(region) {
            return None;
        }
        if has_categories && !profile.university_type.accepts(college.level_descriptor()) {
            return None;
        }
        if branches.is_empty() {
            return None;
        }

        branches.sort_by(|a, b| {
            a.tie_break_priority
                .cmp(&b.tie_break_priority)
                .then_with(|| b.best_cutoff.total_cmp(&a.best_cutoff))
        });

        let closing_percentile = branches
            .iter()
            .map(|b| b.best_cutoff)
            .fold(f64::NEG_INFINITY, f64::max);
        let closing_rank = branches
            .iter()
            .map(|b| b.best_cutoff_rank)
            .min()
            .unwrap_or(u32::MAX);
        let has_primary_category_match = branches.iter().any(|b| b.tie_break_priority == 0);

        Some(CollegeMatch {
            identifier: college.identifier.clone(),
            display_name: college.display_name.clone(),
            institute_code: college.institute_code.clone(),
            status: college.status.clone(),
            district: college.district.clone(),
            level: college.level.clone(),
            region: region.to_string(),
            branches,
            closing_percentile,
            closing_rank,
            has_primary_category_match,
        })
    }
}

/// Collect every eligible seat of a branch across all of its rows.
pub fn eligible_seats(
    branch: &BranchRecord,
    probes: &[SeatProbe],
    profile: &CandidateProfile,
) -> Vec<EligibleSeat> {
    let mut seats = Vec::new();

    for row in &branch.rows {
        for probe in probes {
            let Some(cell) = row.get(&probe.code) else {
                continue;
            };
            let Some(cutoff) = parse_cutoff(cell) else {
                tracing::trace!(
                    branch = %branch.label,
                    seat_code = %probe.code,
                    cell,
                    "skipping malformed cutoff cell"
                );
                continue;
            };
            if profile.score.admits(&cutoff) {
                seats.push(EligibleSeat {
                    seat_code: probe.code.clone(),
                    rank: cutoff.rank,
                    percentile: cutoff.percentile,
                    is_primary_category: probe.is_primary,
                    tie_break_priority: if probe.is_primary { 0 } else { 1 },
                });
            }
        }
    }

    seats
}

/// Pick the best seat of a branch: own category first, then highest cutoff percentile.
/// Earlier seats win exact ties.
pub fn best_seat(seats: &[EligibleSeat]) -> Option<&EligibleSeat> {
    seats.iter().fold(None, |best: Option<&EligibleSeat>, seat| match best {
        None => Some(seat),
        Some(current) => {
            let better = seat
                .tie_break_priority
                .cmp(&current.tie_break_priority)
                .then_with(|| current.percentile.total_cmp(&seat.percentile))
                == Ordering::Less;
            if better { Some(seat) } else { Some(current) }
        }
    })
}

/// Resolve one branch to its single winning seat, or drop it.
pub fn resolve_branch(
    branch: &BranchRecord,
    probes: &[SeatProbe],
    profile: &CandidateProfile,
) -> Option<BranchMatch> {
    let seats = eligible_seats(branch, probes, profile);
    let best = best_seat(&seats)?;

    Some(BranchMatch {
        branch: branch.label.clone(),
        choice_code: branch.choice_code.clone(),
        best_cutoff: best.percentile,
        best_cutoff_rank: best.rank,
        matched_seat_code: best.seat_code.clone(),
        is_primary_category: best.is_primary_category,
        tie_break_priority: best.tie_break_priority,
        eligible_seat_count: seats.len(),
    })
}

/// Primary-category colleges first (category-aware datasets only), then by closing score.
pub fn sort_colleges(colleges: &mut [CollegeMatch], metric: ScoreMetric, has_categories: bool) {
    colleges.sort_by(|a, b| {
        let primary = if has_categories {
            b.has_primary_category_match.cmp(&a.has_primary_category_match)
        } else {
            Ordering::Equal
        };
        primary.then_with(|| match metric {
            ScoreMetric::Percentile => b.closing_percentile.total_cmp(&a.closing_percentile),
            ScoreMetric::Rank => a.closing_rank.cmp(&b.closing_rank),
        })
    });
}
