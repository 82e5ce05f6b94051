//! Structured document queries
//!
//! The search filter compilers produce a [`Query`]; store backends execute
//! it. [`Filter::matches`] and [`Sort::compare`] evaluate a query directly
//! against a JSON document and define the semantics every backend must
//! reproduce.
//!
//! Field paths are dotted camelCase paths into the serialized document,
//! e.g. `address.city` or `roommateProfile.lifestyle.smoking`. They are
//! always static strings chosen by the compilers, never user input.

use std::cmp::Ordering;

use serde_json::Value;

use crate::PageRequest;

/// Dotted path into a serialized document
pub type FieldPath = &'static str;

/// A predicate over a document
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the JSON scalar exactly
    Eq(FieldPath, Value),

    /// String field contains the needle, ignoring ASCII case
    ///
    /// The needle is stored lowercased. Only ASCII letters are folded, which
    /// is what SQLite's `lower()` does.
    Contains(FieldPath, String),

    /// Integer field lies within the inclusive bounds; a missing bound is open
    Range {
        field: FieldPath,
        min: Option<i64>,
        max: Option<i64>,
    },

    /// Array field holds every one of the values (set containment)
    ContainsAll(FieldPath, Vec<String>),

    /// At least one element of an array field contains at least one of the
    /// needles, ignoring ASCII case
    AnyElementContains(FieldPath, Vec<String>),

    And(Vec<Filter>),

    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: FieldPath, value: impl Into<Value>) -> Self {
        Filter::Eq(field, value.into())
    }

    pub fn contains(field: FieldPath, needle: &str) -> Self {
        Filter::Contains(field, needle.to_ascii_lowercase())
    }

    pub fn any_element_contains<I, S>(field: FieldPath, needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Filter::AnyElementContains(
            field,
            needles
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        )
    }

    /// Evaluate against a serialized document
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::Eq(field, expected) => lookup(doc, field) == Some(expected),
            Filter::Contains(field, needle) => lookup(doc, field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_ascii_lowercase().contains(needle.as_str())),
            Filter::Range { field, min, max } => {
                let Some(n) = lookup(doc, field).and_then(Value::as_i64) else {
                    return false;
                };
                min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m)
            }
            Filter::ContainsAll(field, wanted) => {
                let Some(items) = lookup(doc, field).and_then(Value::as_array) else {
                    return false;
                };
                wanted
                    .iter()
                    .all(|w| items.iter().any(|i| i.as_str() == Some(w.as_str())))
            }
            Filter::AnyElementContains(field, needles) => {
                let Some(items) = lookup(doc, field).and_then(Value::as_array) else {
                    return false;
                };
                items.iter().filter_map(Value::as_str).any(|item| {
                    let item = item.to_ascii_lowercase();
                    needles.iter().any(|n| item.contains(n.as_str()))
                })
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }
}

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |node, key| node.get(key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort key of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: FieldPath,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: FieldPath) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: FieldPath) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    /// Order two documents by this key; missing values sort first ascending
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ord = compare_values(lookup(a, self.field), lookup(b, self.field));
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// A compiled search: predicate, ordering and the page to fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub sort: Sort,
    pub page: PageRequest,
}
