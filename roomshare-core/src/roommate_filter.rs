//! Roommate search filter compiler
//!
//! Same shape as the room compiler but targets the Users collection: only
//! verified users with an active roommate profile are searchable.

use serde::Deserialize;

use crate::params;
use crate::query::{Filter, FieldPath, Query, Sort};
use crate::{Error, Result};

pub const DEFAULT_ROOMMATE_PAGE_SIZE: u64 = 10;

/// Gender value meaning "no preference"
pub const ANY_GENDER: &str = "Any";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommateSearchParams {
    pub location: Option<String>,
    pub min_budget: Option<String>,
    pub max_budget: Option<String>,
    pub gender: Option<String>,
    pub occupation_type: Option<String>,
    /// Comma-separated `key:value` pairs, all of which must match
    pub lifestyle: Option<String>,
    /// Comma-separated terms, any of which may match
    pub interests: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Lifestyle keys a search may constrain, with their document paths
const LIFESTYLE_FIELDS: [(&str, FieldPath); 6] = [
    ("sleepSchedule", "roommateProfile.lifestyle.sleepSchedule"),
    ("cleanliness", "roommateProfile.lifestyle.cleanliness"),
    ("smoking", "roommateProfile.lifestyle.smoking"),
    ("drinking", "roommateProfile.lifestyle.drinking"),
    ("pets", "roommateProfile.lifestyle.pets"),
    ("diet", "roommateProfile.lifestyle.diet"),
];

fn lifestyle_path(key: &str) -> Option<FieldPath> {
    LIFESTYLE_FIELDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, path)| *path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoommateSort {
    Newest,
    Oldest,
    BudgetLow,
    BudgetHigh,
}

impl RoommateSort {
    pub const NAMES: [&'static str; 4] = ["newest", "oldest", "budget-low", "budget-high"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(RoommateSort::Newest),
            "oldest" => Some(RoommateSort::Oldest),
            "budget-low" => Some(RoommateSort::BudgetLow),
            "budget-high" => Some(RoommateSort::BudgetHigh),
            _ => None,
        }
    }

    pub fn sort(&self) -> Sort {
        match self {
            RoommateSort::Newest => Sort::desc("createdAt"),
            RoommateSort::Oldest => Sort::asc("createdAt"),
            RoommateSort::BudgetLow => Sort::asc("roommateProfile.budget"),
            RoommateSort::BudgetHigh => Sort::desc("roommateProfile.budget"),
        }
    }
}

/// Base predicate of every roommate search
pub fn discoverable_filter() -> Filter {
    Filter::And(vec![
        Filter::eq("roommateProfile.isActive", true),
        Filter::eq("isVerified", true),
    ])
}

fn lifestyle_clauses(raw: &Option<String>) -> Result<Vec<Filter>> {
    params::list(raw)
        .into_iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once(':')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .ok_or_else(|| {
                    Error::parameter("lifestyle", format!("'{}' is not a key:value pair", pair))
                })?;
            let path = lifestyle_path(key).ok_or_else(|| {
                let keys: Vec<&str> = LIFESTYLE_FIELDS.iter().map(|(k, _)| *k).collect();
                Error::parameter(
                    "lifestyle",
                    format!("unknown key '{}', expected one of {}", key, keys.join(", ")),
                )
            })?;
            Ok(Filter::eq(path, value))
        })
        .collect()
}

/// Compile search parameters into a query over users
pub fn compile_roommate_query(params: &RoommateSearchParams) -> Result<Query> {
    let mut clauses = vec![discoverable_filter()];

    if let Some(location) = params::non_blank(&params.location) {
        clauses.push(Filter::Or(vec![
            Filter::contains("roommateProfile.locationPreference", location),
            Filter::contains("roommateProfile.currentLocation", location),
        ]));
    }

    let min = params::integer("minBudget", &params.min_budget)?;
    let max = params::integer("maxBudget", &params.max_budget)?;
    if min.is_some() || max.is_some() {
        clauses.push(Filter::Range {
            field: "roommateProfile.budget",
            min,
            max,
        });
    }

    if let Some(gender) = params::non_blank(&params.gender) {
        if !gender.eq_ignore_ascii_case(ANY_GENDER) {
            clauses.push(Filter::eq(
                "roommateProfile.gender",
                gender.to_lowercase(),
            ));
        }
    }

    if let Some(occupation) = params::non_blank(&params.occupation_type) {
        clauses.push(Filter::eq(
            "roommateProfile.occupationType",
            occupation.to_lowercase(),
        ));
    }

    clauses.extend(lifestyle_clauses(&params.lifestyle)?);

    let interests = params::list(&params.interests);
    if !interests.is_empty() {
        clauses.push(Filter::any_element_contains(
            "roommateProfile.interests",
            interests,
        ));
    }

    let sort = match params::non_blank(&params.sort_by) {
        Some(name) => RoommateSort::parse(name).ok_or_else(|| {
            Error::parameter(
                "sortBy",
                format!("expected one of {}", RoommateSort::NAMES.join(", ")),
            )
        })?,
        None => RoommateSort::Newest,
    };

    Ok(Query {
        filter: Filter::And(clauses),
        sort: sort.sort(),
        page: params::page(&params.page, &params.limit, DEFAULT_ROOMMATE_PAGE_SIZE)?,
    })
}
