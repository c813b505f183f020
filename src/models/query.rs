//! Geocoding query variants

use serde::{Deserialize, Serialize};

/// One (query text, country code) pair tried against the geocoder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueryVariant {
    /// Trimmed, non-empty query text
    pub query_text: String,
    /// Uppercase ISO 3166-1 alpha-2 code, or empty for an unrestricted search
    pub country_code: String,
}

impl QueryVariant {
    /// Build a variant. Returns `None` when the query text is blank.
    ///
    /// A country code that is not exactly two ASCII letters is dropped, so the
    /// variant searches globally rather than sending a malformed filter.
    #[must_use]
    pub fn new(query_text: &str, country_code: &str) -> Option<Self> {
        let query_text = query_text.trim();
        if query_text.is_empty() {
            return None;
        }

        let country_code = country_code.trim();
        let country_code = if is_country_code(country_code) {
            country_code.to_ascii_uppercase()
        } else {
            String::new()
        };

        Some(Self {
            query_text: query_text.to_string(),
            country_code,
        })
    }

    /// Variant without a country filter
    #[must_use]
    pub fn global(query_text: &str) -> Option<Self> {
        Self::new(query_text, "")
    }

    #[must_use]
    pub fn has_country(&self) -> bool {
        !self.country_code.is_empty()
    }

    /// Case-insensitive identity used for deduplication
    #[must_use]
    pub fn dedup_key(&self) -> String {
        format!(
            "{}|{}",
            self.query_text.to_lowercase(),
            self.country_code.to_lowercase()
        )
    }
}

impl std::fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_country() {
            write!(f, "{} [{}]", self.query_text, self.country_code)
        } else {
            write!(f, "{}", self.query_text)
        }
    }
}

/// True for exactly two ASCII letters, in any case
#[must_use]
pub fn is_country_code(candidate: &str) -> bool {
    candidate.len() == 2 && candidate.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_trims_and_uppercases() {
        let variant = QueryVariant::new("  Mumbai ", " in").unwrap();
        assert_eq!(variant.query_text, "Mumbai");
        assert_eq!(variant.country_code, "IN");
        assert!(variant.has_country());
    }

    #[test]
    fn test_blank_query_is_rejected() {
        assert!(QueryVariant::new("   ", "IN").is_none());
        assert!(QueryVariant::global("").is_none());
    }

    #[test]
    fn test_malformed_country_code_is_dropped() {
        let variant = QueryVariant::new("Pune", "IND").unwrap();
        assert_eq!(variant.country_code, "");
        assert!(!variant.has_country());
    }

    #[test]
    fn test_dedup_key_ignores_case() {
        let a = QueryVariant::new("Chennai", "IN").unwrap();
        let b = QueryVariant::new("CHENNAI", "in").unwrap();
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(a.dedup_key(), "chennai|in");
    }

    #[test]
    fn test_is_country_code() {
        assert!(is_country_code("IN"));
        assert!(is_country_code("de"));
        assert!(!is_country_code("I1"));
        assert!(!is_country_code("IND"));
        assert!(!is_country_code(""));
    }
}
