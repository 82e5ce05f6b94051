//! Parsing helpers for flat query-string parameters

use crate::{Error, PageRequest, Result};

/// A trimmed, non-empty parameter value
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn integer(name: &'static str, value: &Option<String>) -> Result<Option<i64>> {
    non_blank(value)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| Error::parameter(name, format!("'{}' is not a whole number", v)))
        })
        .transpose()
}

/// Split a comma-separated list, dropping blank items
pub(crate) fn list(value: &Option<String>) -> Vec<&str> {
    non_blank(value)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn page(
    page: &Option<String>,
    limit: &Option<String>,
    default_limit: u64,
) -> Result<PageRequest> {
    let page = integer("page", page)?.unwrap_or(1);
    let limit = integer("limit", limit)?.unwrap_or(default_limit as i64);
    Ok(PageRequest::new(
        u64::try_from(page).unwrap_or(1),
        u64::try_from(limit).unwrap_or(default_limit),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_integer_rejects_words() {
        assert_eq!(integer("minPrice", &s(" 500 ")).unwrap(), Some(500));
        assert_eq!(integer("minPrice", &s("  ")).unwrap(), None);
        assert!(integer("minPrice", &s("cheap")).is_err());
    }

    #[test]
    fn test_list_drops_blanks() {
        assert_eq!(list(&s("wifi, ,parking,")), vec!["wifi", "parking"]);
        assert!(list(&None).is_empty());
    }

    #[test]
    fn test_negative_page_falls_back_to_first() {
        let p = page(&s("-2"), &None, 12).unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 12);
    }
}
