//! Post date normalization.
//!
//! Feed posts carry human labels instead of timestamps. Three shapes are
//! recognised, tried in this order:
//!
//! | Label | Meaning |
//! |-------|---------|
//! | `2h`, `2 h` | two hours before now |
//! | `5 min` | five minutes before now |
//! | `6 juin à 10:30`, `6 juin 2024 à 10:30` | absolute local time; current year unless one is given |
//!
//! Anything else is returned unchanged as [`PostDate::Raw`]. A label that looks
//! like one of the shapes but still fails (unknown month, 31 February, an
//! absurd offset) is logged and also returned unchanged; parsing never fails
//! past [`DateNormalizer::normalize`].
//!
//! "Now" is read when each label is normalized, not when the run starts.
//! Year rollover is not corrected: `28 décembre à 09:00` read on 2 January
//! lands in the new year.

use crate::error::DateParseError;
use crate::models::PostDate;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static HOURS_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*h\s*$").expect("valid hours regex"));
static MINUTES_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*min\s*$").expect("valid minutes regex"));
static DAY_MONTH_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}) (\w+)(?: (\d{4}))? à (\d{1,2}):(\d{2})")
        .expect("valid absolute date regex")
});

/// Static month-name lookup for one locale.
#[derive(Debug, Clone, Copy)]
pub struct MonthTable {
    names: &'static [(&'static str, u32)],
}

const FRENCH_MONTHS: &[(&str, u32)] = &[
    ("janvier", 1),
    ("février", 2),
    ("fevrier", 2),
    ("mars", 3),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("décembre", 12),
    ("decembre", 12),
];

const ENGLISH_MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

impl MonthTable {
    pub fn french() -> Self {
        Self {
            names: FRENCH_MONTHS,
        }
    }

    pub fn english() -> Self {
        Self {
            names: ENGLISH_MONTHS,
        }
    }

    /// Month number (1-12) for a full month name, case-insensitive.
    pub fn month_number(&self, name: &str) -> Option<u32> {
        let name = name.to_lowercase();
        self.names
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, number)| *number)
    }
}

/// Turns feed date labels into sortable instants.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    months: MonthTable,
}

impl DateNormalizer {
    pub fn new(months: MonthTable) -> Self {
        Self { months }
    }

    /// Normalize `raw` relative to the current local time, truncated to the second.
    pub fn normalize(&self, raw: &str) -> PostDate {
        let now = Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);
        self.normalize_at(raw, now)
    }

    /// Normalize `raw` relative to `now`.
    ///
    /// # Arguments
    ///
    /// * `raw` - The date label as shown on the post.
    /// * `now` - Local time that relative labels count back from. Its year
    ///   is used for absolute labels that do not carry one.
    ///
    /// # Returns
    ///
    /// [`PostDate::Instant`] for a recognised label, otherwise
    /// [`PostDate::Raw`] holding `raw` unchanged. A recognised shape that
    /// fails to resolve is logged at `warn`.
    pub fn normalize_at(&self, raw: &str, now: NaiveDateTime) -> PostDate {
        match self.parse(raw, now) {
            Ok(Some(instant)) => PostDate::Instant(instant),
            Ok(None) => PostDate::Raw(raw.to_string()),
            Err(e) => {
                warn!(raw, error = %e, "Error parsing post date; keeping raw label");
                PostDate::Raw(raw.to_string())
            }
        }
    }

    /// `Ok(None)` when no shape matched at all.
    fn parse(&self, raw: &str, now: NaiveDateTime) -> Result<Option<NaiveDateTime>, DateParseError> {
        if let Some(caps) = HOURS_AGO.captures(raw) {
            let hours = parse_number::<i64>(&caps[1])?;
            let delta = TimeDelta::try_hours(hours).ok_or(DateParseError::OutOfRange)?;
            return now
                .checked_sub_signed(delta)
                .map(Some)
                .ok_or(DateParseError::OutOfRange);
        }

        if let Some(caps) = MINUTES_AGO.captures(raw) {
            let minutes = parse_number::<i64>(&caps[1])?;
            let delta = TimeDelta::try_minutes(minutes).ok_or(DateParseError::OutOfRange)?;
            return now
                .checked_sub_signed(delta)
                .map(Some)
                .ok_or(DateParseError::OutOfRange);
        }

        if let Some(caps) = DAY_MONTH_TIME.captures(raw) {
            let day = parse_number::<u32>(&caps[1])?;
            let month = self
                .months
                .month_number(&caps[2])
                .ok_or_else(|| DateParseError::UnknownMonth(caps[2].to_string()))?;
            let year = match caps.get(3) {
                Some(year) => parse_number::<i32>(year.as_str())?,
                None => now.year(),
            };
            let hour = parse_number::<u32>(&caps[4])?;
            let minute = parse_number::<u32>(&caps[5])?;

            return NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| date.and_hms_opt(hour, minute, 0))
                .map(Some)
                .ok_or(DateParseError::InvalidDate);
        }

        Ok(None)
    }
}

fn parse_number<T: std::str::FromStr>(digits: &str) -> Result<T, DateParseError> {
    digits
        .parse::<T>()
        .map_err(|_| DateParseError::Number(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn french() -> DateNormalizer {
        DateNormalizer::new(MonthTable::french())
    }

    #[test]
    fn test_hours_ago() {
        let now = at(2025, 3, 14, 15, 9, 26);
        assert_eq!(
            french().normalize_at("2h", now),
            PostDate::Instant(now - TimeDelta::hours(2))
        );
        assert_eq!(
            french().normalize_at("2h", now).to_string(),
            "2025-03-14T13:09:26"
        );
    }

    #[test]
    fn test_hours_ago_many_values() {
        let now = at(2025, 1, 1, 0, 30, 0);
        for n in [0i64, 1, 5, 23, 24, 48, 500] {
            let label = format!("{n}h");
            assert_eq!(
                french().normalize_at(&label, now),
                PostDate::Instant(now - TimeDelta::hours(n)),
                "label {label}"
            );
        }
    }

    #[test]
    fn test_hours_ago_with_space() {
        let now = at(2025, 3, 14, 15, 0, 0);
        assert_eq!(
            french().normalize_at("3 h", now),
            PostDate::Instant(at(2025, 3, 14, 12, 0, 0))
        );
    }

    #[test]
    fn test_minutes_ago() {
        let now = at(2025, 3, 14, 15, 0, 0);
        assert_eq!(
            french().normalize_at("45 min", now).to_string(),
            "2025-03-14T14:15:00"
        );
    }

    #[test]
    fn test_absolute_french_date_uses_current_year() {
        let now = at(2025, 10, 15, 8, 0, 0);
        assert_eq!(
            french().normalize_at("6 juin à 10:30", now).to_string(),
            "2025-06-06T10:30:00"
        );
    }

    #[test]
    fn test_absolute_date_inside_longer_label() {
        let now = at(2025, 10, 15, 8, 0, 0);
        assert_eq!(
            french().normalize_at("Mercredi 13 août à 7:05", now).to_string(),
            "2025-08-13T07:05:00"
        );
    }

    #[test]
    fn test_absolute_date_with_explicit_year() {
        let now = at(2025, 10, 15, 8, 0, 0);
        assert_eq!(
            french().normalize_at("24 décembre 2023 à 18:00", now).to_string(),
            "2023-12-24T18:00:00"
        );
    }

    #[test]
    fn test_year_rollover_not_corrected() {
        let now = at(2026, 1, 2, 9, 0, 0);
        assert_eq!(
            french().normalize_at("28 décembre à 09:00", now).to_string(),
            "2026-12-28T09:00:00"
        );
    }

    #[test]
    fn test_unknown_month_passes_through() {
        let now = at(2025, 10, 15, 8, 0, 0);
        assert_eq!(
            french().normalize_at("6 june à 10:30", now),
            PostDate::Raw("6 june à 10:30".to_string())
        );
    }

    #[test]
    fn test_english_table() {
        let normalizer = DateNormalizer::new(MonthTable::english());
        let now = at(2025, 10, 15, 8, 0, 0);
        assert_eq!(
            normalizer.normalize_at("6 June à 10:30", now).to_string(),
            "2025-06-06T10:30:00"
        );
    }

    #[test]
    fn test_impossible_date_passes_through() {
        let now = at(2025, 10, 15, 8, 0, 0);
        assert_eq!(
            french().normalize_at("31 février à 10:30", now),
            PostDate::Raw("31 février à 10:30".to_string())
        );
        assert_eq!(
            french().normalize_at("6 juin à 25:30", now),
            PostDate::Raw("6 juin à 25:30".to_string())
        );
    }

    #[test]
    fn test_overflowing_offset_passes_through() {
        let now = at(2025, 10, 15, 8, 0, 0);
        let label = "99999999999999999999h";
        assert_eq!(
            french().normalize_at(label, now),
            PostDate::Raw(label.to_string())
        );
    }

    #[test]
    fn test_unrecognized_labels_pass_through() {
        let now = at(2025, 10, 15, 8, 0, 0);
        for label in ["", "Hier", "Il y a longtemps", "Partagé avec le groupe"] {
            assert_eq!(
                french().normalize_at(label, now),
                PostDate::Raw(label.to_string())
            );
        }
    }

    #[test]
    fn test_month_lookup_is_case_insensitive() {
        assert_eq!(MonthTable::french().month_number("Juin"), Some(6));
        assert_eq!(MonthTable::french().month_number("DÉCEMBRE"), Some(12));
        assert_eq!(MonthTable::french().month_number("june"), None);
    }

    #[test]
    fn test_normalize_truncates_to_seconds() {
        match french().normalize("1 min") {
            PostDate::Instant(instant) => assert_eq!(instant.nanosecond(), 0),
            other => panic!("expected an instant, got {other:?}"),
        }
    }
}
