//! Include/exclude pattern filters.
//!
//! A [`FilterSpec`] decides whether a cell's text is kept. It is built once
//! from configuration and handed to dataset filtering as an opaque value, so
//! the filter semantics do not depend on any particular report's config shape.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Text substituted for missing cells before matching, so that absent values
/// can be included or excluded explicitly.
pub const MISSING_VALUE: &str = "None";

/// Patterns as written in configuration: a list, or one comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    One(String),
    Many(Vec<String>),
}

impl PatternList {
    /// Individual, non-empty patterns.
    pub fn patterns(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::One(value) => value.split(',').collect(),
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Raw `{"include": ..., "exclude": ...}` object from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub include: Option<PatternList>,
    #[serde(default)]
    pub exclude: Option<PatternList>,
}

/// Compiled include/exclude filter.
///
/// A value matches when it matches any include pattern (or there are none)
/// and matches no exclude pattern. Patterns are unanchored, case-sensitive
/// regular expressions.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    include: Option<Regex>,
    exclude: Option<Regex>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl FilterSpec {
    /// Build a filter from include and exclude pattern lists.
    ///
    /// Empty lists are treated as absent.
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let include_patterns: Vec<String> = include.into_iter().map(Into::into).collect();
        let exclude_patterns: Vec<String> = exclude.into_iter().map(Into::into).collect();
        Ok(Self {
            include: union_regex(&include_patterns)?,
            exclude: union_regex(&exclude_patterns)?,
            include_patterns,
            exclude_patterns,
        })
    }

    /// A filter that keeps every value.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// A filter with only include patterns.
    pub fn including<I, S>(include: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(include, Vec::<String>::new())
    }

    pub fn include_patterns(&self) -> &[String] {
        &self.include_patterns
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Returns true when the filter has neither include nor exclude patterns.
    pub fn is_match_all(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }

    /// Whether `value` passes the filter.
    pub fn matches(&self, value: &str) -> bool {
        let included = self
            .include
            .as_ref()
            .is_none_or(|regex| regex.is_match(value));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|regex| regex.is_match(value));
        included && !excluded
    }

    /// Like [`FilterSpec::matches`], treating a missing value as [`MISSING_VALUE`].
    pub fn matches_optional(&self, value: Option<&str>) -> bool {
        self.matches(value.unwrap_or(MISSING_VALUE))
    }
}

impl TryFrom<FilterConfig> for FilterSpec {
    type Error = FilterError;

    fn try_from(config: FilterConfig) -> Result<Self, Self::Error> {
        let include = config
            .include
            .as_ref()
            .map(PatternList::patterns)
            .unwrap_or_default();
        let exclude = config
            .exclude
            .as_ref()
            .map(PatternList::patterns)
            .unwrap_or_default();
        Self::new(include, exclude)
    }
}

fn union_regex(patterns: &[String]) -> Result<Option<Regex>, FilterError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    // Compile individually first so the error names the offending pattern.
    for pattern in patterns {
        Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
    }
    let union = patterns
        .iter()
        .map(|pattern| format!("(?:{pattern})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&union)
        .map(Some)
        .map_err(|source| FilterError::InvalidPattern {
            pattern: union,
            source,
        })
}
