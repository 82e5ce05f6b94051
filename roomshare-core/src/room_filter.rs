//! Room search filter compiler
//!
//! Translates the flat `GET /rooms` query string into a [`Query`] over the
//! Rooms collection. Only vacant rooms are ever searchable.

use serde::Deserialize;

use crate::params;
use crate::query::{Filter, Query, Sort};
use crate::{normalize_amenities, Error, Result};

/// Page size when the client does not ask for one
pub const DEFAULT_ROOM_PAGE_SIZE: u64 = 12;

/// Raw search parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSearchParams {
    pub search: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub room_type: Option<String>,
    /// Comma-separated tags, all of which must be present
    pub amenities: Option<String>,
    pub property_type: Option<String>,
    pub furnishing: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Room-type labels offered by the search form
///
/// "Single Room" and "1 BHK" select the same rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    SingleRoom,
    SharedRoom,
    OneBhk,
    TwoBhk,
    ThreeBhk,
}

impl RoomType {
    pub const LABELS: [&'static str; 5] =
        ["Single Room", "Shared Room", "1 BHK", "2 BHK", "3 BHK"];

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Single Room" => Some(RoomType::SingleRoom),
            "Shared Room" => Some(RoomType::SharedRoom),
            "1 BHK" => Some(RoomType::OneBhk),
            "2 BHK" => Some(RoomType::TwoBhk),
            "3 BHK" => Some(RoomType::ThreeBhk),
            _ => None,
        }
    }

    /// Predicate on `availableBeds`
    pub fn filter(&self) -> Filter {
        match self {
            RoomType::SingleRoom | RoomType::OneBhk => Filter::eq("availableBeds", 1),
            RoomType::SharedRoom => Filter::Range {
                field: "availableBeds",
                min: Some(2),
                max: None,
            },
            RoomType::TwoBhk => Filter::eq("availableBeds", 2),
            RoomType::ThreeBhk => Filter::eq("availableBeds", 3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSort {
    PriceLow,
    PriceHigh,
    Newest,
    Oldest,
    /// Rooms carry no rating yet; orders like `Newest`
    Rating,
}

impl RoomSort {
    pub const NAMES: [&'static str; 5] = ["price-low", "price-high", "newest", "oldest", "rating"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "price-low" => Some(RoomSort::PriceLow),
            "price-high" => Some(RoomSort::PriceHigh),
            "newest" => Some(RoomSort::Newest),
            "oldest" => Some(RoomSort::Oldest),
            "rating" => Some(RoomSort::Rating),
            _ => None,
        }
    }

    pub fn sort(&self) -> Sort {
        match self {
            RoomSort::PriceLow => Sort::asc("price"),
            RoomSort::PriceHigh => Sort::desc("price"),
            RoomSort::Newest | RoomSort::Rating => Sort::desc("createdAt"),
            RoomSort::Oldest => Sort::asc("createdAt"),
        }
    }
}

/// Base predicate of every room search
pub fn vacancy_filter() -> Filter {
    Filter::eq("isVacant", true)
}

/// Compile search parameters into a room query
pub fn compile_room_query(params: &RoomSearchParams) -> Result<Query> {
    let mut clauses = vec![vacancy_filter()];

    if let Some(search) = params::non_blank(&params.search) {
        clauses.push(Filter::Or(vec![
            Filter::contains("address.city", search),
            Filter::contains("address.street", search),
            Filter::contains("address.area", search),
            Filter::contains("title", search),
        ]));
    }

    if let Some(city) = params::non_blank(&params.city) {
        clauses.push(Filter::contains("address.city", city));
    }

    let min = params::integer("minPrice", &params.min_price)?;
    let max = params::integer("maxPrice", &params.max_price)?;
    if min.is_some() || max.is_some() {
        clauses.push(Filter::Range {
            field: "price",
            min,
            max,
        });
    }

    if let Some(label) = params::non_blank(&params.room_type) {
        let room_type = RoomType::from_label(label).ok_or_else(|| {
            Error::parameter(
                "roomType",
                format!("expected one of {}", RoomType::LABELS.join(", ")),
            )
        })?;
        clauses.push(room_type.filter());
    }

    let amenities = normalize_amenities(params::list(&params.amenities));
    if !amenities.is_empty() {
        clauses.push(Filter::ContainsAll("amenities", amenities));
    }

    if let Some(property_type) = params::non_blank(&params.property_type) {
        clauses.push(Filter::eq(
            "metadata.propertyType",
            property_type.to_lowercase(),
        ));
    }

    if let Some(furnishing) = params::non_blank(&params.furnishing) {
        clauses.push(Filter::eq("metadata.furnishing", furnishing.to_lowercase()));
    }

    let sort = match params::non_blank(&params.sort_by) {
        Some(name) => RoomSort::parse(name).ok_or_else(|| {
            Error::parameter(
                "sortBy",
                format!("expected one of {}", RoomSort::NAMES.join(", ")),
            )
        })?,
        None => RoomSort::Newest,
    };

    Ok(Query {
        filter: Filter::And(clauses),
        sort: sort.sort(),
        page: params::page(&params.page, &params.limit, DEFAULT_ROOM_PAGE_SIZE)?,
    })
}
