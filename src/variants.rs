//! Query Variant Generation
//!
//! Turns free-form place text such as `"Kottur village, Pollachi, Tamil Nadu, IN"`
//! into an ordered list of geocoding queries, most specific first. The
//! geocoder tries them in order and stops at the first one that matches.

use crate::models::QueryVariant;
use crate::models::query::is_country_code;
use crate::{AgriWeatherError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Words naming an administrative unit; geocoders rarely index them
static ADMIN_UNIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:village|taluk|tehsil|district)\b")
        .expect("Invalid administrative unit regex")
});

static EMPTY_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)|\[\s*\]").expect("Invalid bracket regex"));

/// Colloquial or historic names of major cities and the name to retry with
const CITY_ALIASES: [(&str, &str); 3] = [
    ("delhi", "New Delhi"),
    ("mumbai", "Bombay"),
    ("chennai", "Madras"),
];

/// Ordered search plan for one raw input
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Whitespace and comma-normalized input
    pub normalized: String,
    /// Leading comma-separated segment
    pub place: String,
    /// Country code found in the last segment, uppercased
    pub country_code: Option<String>,
    /// Deduplicated variants, most specific first
    pub variants: Vec<QueryVariant>,
}

impl QueryPlan {
    /// Extra query biased to `default_country`, used once every variant came back empty.
    ///
    /// Only offered when the input carried no country code of its own and the
    /// place is plain letters and spaces.
    #[must_use]
    pub fn fallback_variant(&self, default_country: &str) -> Option<QueryVariant> {
        if self.country_code.is_some() || !is_country_code(default_country) {
            return None;
        }

        let alphabetic = self
            .place
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace());
        if !alphabetic {
            return None;
        }

        QueryVariant::new(&self.place, default_country)
    }
}

/// Builds query plans from raw place text
pub struct VariantGenerator;

impl VariantGenerator {
    /// Generate the ordered, deduplicated variants for `raw`
    pub fn generate(raw: &str) -> Result<QueryPlan> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(AgriWeatherError::invalid_input("Enter a place name"));
        }

        let parts: Vec<&str> = normalized.split(", ").collect();
        let place = parts[0].to_string();
        let region = if parts.len() > 1 {
            parts[parts.len() - 1]
        } else {
            ""
        };
        let country_code = is_country_code(region).then(|| region.to_ascii_uppercase());
        let cc = country_code.as_deref().unwrap_or("");

        let mut candidates: Vec<Option<QueryVariant>> = Vec::new();

        if country_code.is_some() {
            candidates.push(QueryVariant::new(&place, cc));
        }
        candidates.push(QueryVariant::global(&normalized));
        candidates.push(QueryVariant::global(&place));

        let lowered = place.to_lowercase();
        for (alias, canonical) in CITY_ALIASES {
            if lowered == alias {
                candidates.push(QueryVariant::new(canonical, cc));
            }
        }

        if let Some(stripped) = strip_admin_units(&place) {
            candidates.push(QueryVariant::new(&stripped, cc));
        }

        if parts.len() > 2 {
            let combined = format!("{}, {}", place, parts[parts.len() - 1]);
            candidates.push(QueryVariant::global(&combined));
        }

        let variants = dedup(candidates.into_iter().flatten());
        debug!(
            "Generated {} query variants for '{}': {:?}",
            variants.len(),
            normalized,
            variants.iter().map(ToString::to_string).collect::<Vec<_>>()
        );

        Ok(QueryPlan {
            normalized,
            place,
            country_code,
            variants,
        })
    }
}

/// Collapse whitespace inside each comma-separated segment and rejoin with ", ".
/// Empty segments are dropped.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.split(',')
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Remove administrative-unit words, `None` if the place contains none.
///
/// Words match at word boundaries, so `"Kottur (Village)"`, `"Kottur-village"`
/// and `"Pollachi Taluk."` all lose the unit; brackets left empty and
/// punctuation left dangling at either end are dropped with it.
fn strip_admin_units(place: &str) -> Option<String> {
    if !ADMIN_UNIT_PATTERN.is_match(place) {
        return None;
    }

    let stripped = ADMIN_UNIT_PATTERN.replace_all(place, " ");
    let stripped = EMPTY_BRACKETS.replace_all(&stripped, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    Some(
        collapsed
            .trim_matches(|c: char| !c.is_alphanumeric() && !matches!(c, ')' | ']'))
            .to_string(),
    )
}

fn dedup(variants: impl Iterator<Item = QueryVariant>) -> Vec<QueryVariant> {
    let mut seen = HashSet::new();
    variants
        .filter(|variant| seen.insert(variant.dedup_key()))
        .collect()
}
