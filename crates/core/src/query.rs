//! List query parameters and filter normalization

use serde::Deserialize;

use crate::error::{Issues, ValidationError};
use crate::patient::Patient;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Raw query string of `GET /patients`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validated, normalized list request handed to the store.
///
/// Name filters are trimmed and lowercased for case-insensitive substring
/// matching. `gender` is trimmed and lowercased for exact comparison.
/// Filters that are empty after trimming are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PatientFilter {
    fn default() -> Self {
        Self {
            first_name: None,
            last_name: None,
            gender: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListParams {
    pub fn into_filter(self) -> Result<PatientFilter, ValidationError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        let offset = self.offset.unwrap_or(0);

        let mut issues = Issues::default();
        if !(1..=MAX_LIMIT).contains(&limit) {
            issues.push("limit", format!("must be between 1 and {}", MAX_LIMIT));
        }
        if offset < 0 {
            issues.push("offset", "must be greater than or equal to 0");
        }
        issues.finish()?;

        Ok(PatientFilter {
            first_name: normalize(self.first_name),
            last_name: normalize(self.last_name),
            gender: normalize(self.gender),
            limit,
            offset,
        })
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

impl PatientFilter {
    /// Whether `patient` satisfies every supplied predicate
    pub fn matches(&self, patient: &Patient) -> bool {
        let contains = |needle: &Option<String>, haystack: &str| {
            needle
                .as_deref()
                .is_none_or(|n| haystack.to_lowercase().contains(n))
        };

        contains(&self.first_name, patient.first_name.as_str())
            && contains(&self.last_name, patient.last_name.as_str())
            && self.gender.as_deref().is_none_or(|g| patient.gender == g)
    }
}

/// Escape `%`, `_` and `\` so a value matches literally inside `ILIKE`.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{NewPatient, generate_id};
    use chrono::Utc;

    fn patient(first: &str, last: &str, gender: &str) -> Patient {
        Patient::from_new(
            generate_id(),
            NewPatient {
                first_name: first.into(),
                last_name: last.into(),
                gender: gender.into(),
                birth_date: None,
                email: None,
                phone: None,
                address: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn defaults_apply_when_absent() {
        let filter = ListParams::default().into_filter().unwrap();
        assert_eq!(filter, PatientFilter::default());
    }

    #[test]
    fn limit_out_of_range_is_rejected() {
        for limit in [0, 101, -3] {
            let params = ListParams {
                limit: Some(limit),
                ..Default::default()
            };
            let err = params.into_filter().unwrap_err();
            assert_eq!(err.issues[0].field, "limit");
        }
    }

    #[test]
    fn negative_offset_is_rejected() {
        let params = ListParams {
            offset: Some(-1),
            ..Default::default()
        };
        assert_eq!(params.into_filter().unwrap_err().issues[0].field, "offset");
    }

    #[test]
    fn filters_are_trimmed_and_lowercased() {
        let params = ListParams {
            first_name: Some("  ANN ".into()),
            gender: Some(" Female".into()),
            last_name: Some("   ".into()),
            ..Default::default()
        };
        let filter = params.into_filter().unwrap();
        assert_eq!(filter.first_name.as_deref(), Some("ann"));
        assert_eq!(filter.gender.as_deref(), Some("female"));
        assert_eq!(filter.last_name, None);
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let filter = ListParams {
            first_name: Some("ann".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        let names: Vec<_> = ["Ann", "Anna", "Bob", "JoANNe"]
            .into_iter()
            .map(|n| patient(n, "Doe", "female"))
            .filter(|p| filter.matches(p))
            .map(|p| p.first_name)
            .collect();
        assert_eq!(names, vec!["Ann", "Anna", "JoANNe"]);
    }

    #[test]
    fn gender_filter_is_exact_against_stored_value() {
        let filter = ListParams {
            gender: Some("MALE".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert!(filter.matches(&patient("Bob", "Roe", "male")));
        assert!(!filter.matches(&patient("Bob", "Roe", "female")));
        assert!(!filter.matches(&patient("Bob", "Roe", "Male")));
    }

    #[test]
    fn escape_like_quotes_wildcards() {
        assert_eq!(escape_like(r"50%_a\b"), r"50\%\_a\\b");
    }
}
