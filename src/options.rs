use crate::categories::SeatCodeParts;
use crate::lookup::{RegionTable, OTHER_REGION};
use crate::models::CutoffDataset;
use serde::Serialize;
use std::collections::BTreeSet;

/// Values a query form can offer for a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub branches: Vec<String>,
    pub districts: Vec<String>,
    pub regions: Vec<String>,
    /// Category codes published in the seat rows; empty for datasets without categories.
    pub categories: Vec<String>,
}

pub fn extract_filter_options(dataset: &CutoffDataset, regions: &RegionTable) -> FilterOptions {
    let mut branches = BTreeSet::new();
    let mut districts = BTreeSet::new();
    let mut found_regions = BTreeSet::new();
    let mut categories = BTreeSet::new();

    for college in &dataset.colleges {
        for branch in &college.branches {
            let label = branch.label.trim();
            if !label.is_empty() {
                branches.insert(label.to_string());
            }
            if dataset.has_categories() {
                let parts = branch
                    .rows
                    .iter()
                    .flat_map(|row| row.0.keys())
                    .filter_map(|code| SeatCodeParts::parse(code));
                for parts in parts {
                    categories.insert(parts.category.code().to_string());
                }
            }
        }
        let district = college.district.trim();
        if !district.is_empty() {
            districts.insert(district.to_string());
        }
        let region = regions.region_for(&college.institute_code);
        if region != OTHER_REGION {
            found_regions.insert(region.to_string());
        }
    }

    FilterOptions {
        branches: branches.into_iter().collect(),
        districts: districts.into_iter().collect(),
        regions: found_regions.into_iter().collect(),
        categories: categories.into_iter().collect(),
    }
}
