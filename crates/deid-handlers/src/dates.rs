//! Date generalization.
//!
//! Parses ISO 8601 dates and datetimes, including partial dates (`2003`,
//! `2003-12`), and truncates them to a coarser precision. A value is never
//! given more precision than it had.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use deid_core::{Handler, HandlerContext, HandlerFailure};
use deid_model::{DocumentNode, LeafValue, Path};
use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Precision kept by [`DateGeneralizeHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatePrecision {
    #[default]
    Year,
    YearMonth,
}

/// Parsed date with the precision it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialDate {
    Year(i32),
    YearMonth { year: i32, month: u32 },
    Date(NaiveDate),
}

impl PartialDate {
    /// Parse `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or an ISO 8601 datetime.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.contains('T') {
            return parse_datetime(trimmed).map(PartialDate::Date);
        }
        match trimmed.len() {
            4 => trimmed
                .chars()
                .all(|c| c.is_ascii_digit())
                .then(|| trimmed.parse().ok().map(PartialDate::Year))
                .flatten(),
            7 => NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
                .ok()
                .map(|d| PartialDate::YearMonth {
                    year: d.year(),
                    month: d.month(),
                }),
            10 => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(PartialDate::Date),
            _ => None,
        }
    }

    fn year(&self) -> i32 {
        match self {
            Self::Year(year) | Self::YearMonth { year, .. } => *year,
            Self::Date(date) => date.year(),
        }
    }

    fn month(&self) -> Option<u32> {
        match self {
            Self::Year(_) => None,
            Self::YearMonth { month, .. } => Some(*month),
            Self::Date(date) => Some(date.month()),
        }
    }

    /// Format at `precision`, or at the value's own precision if coarser.
    pub fn generalize(&self, precision: DatePrecision) -> String {
        match (precision, self.month()) {
            (DatePrecision::YearMonth, Some(month)) => format!("{:04}-{month:02}", self.year()),
            _ => format!("{:04}", self.year()),
        }
    }
}

fn parse_datetime(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.date())
}

/// Truncates date text to a year or year-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateGeneralizeHandler {
    precision: DatePrecision,
}

impl DateGeneralizeHandler {
    pub fn new(precision: DatePrecision) -> Self {
        Self { precision }
    }

    pub fn year() -> Self {
        Self::new(DatePrecision::Year)
    }

    pub fn year_month() -> Self {
        Self::new(DatePrecision::YearMonth)
    }

    pub fn precision(&self) -> DatePrecision {
        self.precision
    }
}

impl<N: DocumentNode> Handler<N> for DateGeneralizeHandler {
    fn name(&self) -> &str {
        "generalize-date"
    }

    fn handle(
        &self,
        _path: &Path,
        node: N,
        _ctx: &mut HandlerContext<'_, N>,
    ) -> Result<N, HandlerFailure> {
        let value = node.leaf_value().ok_or_else(|| ValueError::NotALeaf {
            handler: "generalize-date",
            type_tag: node.type_tag().into_owned(),
        })?;
        let text = match &value {
            LeafValue::Null => return Ok(node),
            LeafValue::Text(text) => text,
            other => {
                return Err(ValueError::NotText {
                    handler: "generalize-date",
                    kind: other.kind_name(),
                }
                .into());
            }
        };
        let date = PartialDate::parse(text).ok_or(ValueError::InvalidDate {
            len: text.chars().count(),
        })?;
        Ok(node.with_leaf_value(LeafValue::Text(date.generalize(self.precision)))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_and_full_dates() {
        assert_eq!(PartialDate::parse("2003"), Some(PartialDate::Year(2003)));
        assert_eq!(
            PartialDate::parse("2003-12"),
            Some(PartialDate::YearMonth {
                year: 2003,
                month: 12
            })
        );
        assert_eq!(
            PartialDate::parse("2003-12-15"),
            NaiveDate::from_ymd_opt(2003, 12, 15).map(PartialDate::Date)
        );
        assert_eq!(
            PartialDate::parse("2003-12-15T10:30:00+01:00"),
            NaiveDate::from_ymd_opt(2003, 12, 15).map(PartialDate::Date)
        );
        assert_eq!(
            PartialDate::parse("2003-12-15T10:30"),
            NaiveDate::from_ymd_opt(2003, 12, 15).map(PartialDate::Date)
        );
    }

    #[test]
    fn rejects_non_dates() {
        for value in ["", "20x3", "2003-13", "2003-02-30", "yesterday", "2003-12-15T25:00"] {
            assert_eq!(PartialDate::parse(value), None, "{value}");
        }
    }

    #[test]
    fn invalid_date_reports_character_count() {
        let root = serde_json::json!({});
        let mut consistency = deid_core::ConsistencyContext::new();
        let mut ctx = HandlerContext::new(&root, &mut consistency);
        // 9 characters, 11 bytes
        let node = serde_json::json!("1980-0ä-ö");
        let err = DateGeneralizeHandler::year()
            .handle(&Path::root(), node, &mut ctx)
            .unwrap_err();
        assert_eq!(err.to_string(), "unrecognized date format (9 characters)");
    }

    #[test]
    fn never_adds_precision() {
        let year_only = PartialDate::parse("1980").unwrap();
        assert_eq!(year_only.generalize(DatePrecision::YearMonth), "1980");

        let full = PartialDate::parse("1980-04-12").unwrap();
        assert_eq!(full.generalize(DatePrecision::YearMonth), "1980-04");
        assert_eq!(full.generalize(DatePrecision::Year), "1980");
    }
}
