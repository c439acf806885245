//! Human-entry term formats.
//!
//! # Responsibility
//! - Convert human-typed local terms into canonical UTC ISO strings.
//! - Render ISO terms back into compact local display strings.
//!
//! # Invariants
//! - Offsets apply to time-bearing shapes only; dates are zone-free.
//! - `normalize(prettify(x, off), off)` compares equal to `x`.

use super::range::{
    at_clock, calendar_date, clock_offset, midnight, within_iso_years, TemporalError,
    TemporalResult, TermRange, TermShape,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static PRETTY_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})/([0-9]{2})/([0-9]{2})$").expect("valid regex"));
static PRETTY_DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})/([0-9]{2})/([0-9]{2}) - ([0-9]{4})/([0-9]{2})/([0-9]{2})$")
        .expect("valid regex")
});
static PRETTY_DATE_RANGE_OMIT_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})/([0-9]{2})/([0-9]{2}) - ([0-9]{2})/([0-9]{2})$")
        .expect("valid regex")
});
static PRETTY_DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})/([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2})$").expect("valid regex")
});
static PRETTY_DATE_TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})/([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2}) - ([0-9]{4})/([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2})$",
    )
    .expect("valid regex")
});
static PRETTY_DATE_TIME_RANGE_OMIT_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})/([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2}) - ([0-9]{2}):([0-9]{2})$")
        .expect("valid regex")
});
static PRETTY_DATE_TIME_RANGE_OMIT_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})/([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2}) - ([0-9]{2})/([0-9]{2}) ([0-9]{2}):([0-9]{2})$",
    )
    .expect("valid regex")
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static DIGIT_HYPHEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])-([0-9])").expect("valid hyphen regex"));

const PRETTY_DATE: &str = "%Y/%m/%d";
const PRETTY_DATE_OMIT_YEAR: &str = "%m/%d";
const PRETTY_DATE_TIME: &str = "%Y/%m/%d %H:%M";
const PRETTY_DATE_TIME_OMIT_YEAR: &str = "%m/%d %H:%M";
const PRETTY_DATE_TIME_OMIT_DATE: &str = "%H:%M";

/// Converts a human-entry term in local time into a canonical ISO term.
///
/// Accepted inputs:
/// - `2000/01/01`
/// - `2000/01/01 - 2000/12/31`, `2000/01/01 - 12/31`
/// - `2000/01/01 09:00`
/// - `2000/01/01 09:00 - 2000/01/02 10:00`, `2000/01/01 09:00 - 01/02 10:00`,
///   `2000/01/01 09:00 - 10:00`
///
/// Omitted end fields inherit from the start. `utc_offset_minutes` is
/// subtracted from every time component.
///
/// # Errors
/// - `InvalidFormat` when no accepted shape matches.
/// - `InvalidValue` for impossible dates or clocks.
/// - `EmptyRange` when the end is not after the start.
pub fn normalize(input: &str, utc_offset_minutes: i32) -> TemporalResult<String> {
    let collapsed = WHITESPACE_RE.replace_all(input.trim(), " ");
    let text = DIGIT_HYPHEN_RE.replacen(&collapsed, 1, "${1} - ${2}");
    let text: &str = &text;
    let offset = Duration::minutes(i64::from(utc_offset_minutes));

    let range = if let Some(caps) = PRETTY_DATE_RE.captures(text) {
        let at = local_date(text, &caps[1], &caps[2], &caps[3])?;
        TermRange::instant(TermShape::Date, at)
    } else if let Some(caps) = PRETTY_DATE_RANGE_RE.captures(text) {
        let start = local_date(text, &caps[1], &caps[2], &caps[3])?;
        let end = local_date(text, &caps[4], &caps[5], &caps[6])?;
        TermRange::between(TermShape::DateRange, start, end, text)?
    } else if let Some(caps) = PRETTY_DATE_RANGE_OMIT_YEAR_RE.captures(text) {
        let start = local_date(text, &caps[1], &caps[2], &caps[3])?;
        let end = local_date(text, &caps[1], &caps[4], &caps[5])?;
        TermRange::between(TermShape::DateRange, start, end, text)?
    } else if let Some(caps) = PRETTY_DATE_TIME_RE.captures(text) {
        let at = local_date_time(text, &caps[1], &caps[2], &caps[3], &caps[4], &caps[5])?;
        TermRange::instant(TermShape::DateTime, to_utc(text, at, offset)?)
    } else if let Some(caps) = PRETTY_DATE_TIME_RANGE_RE.captures(text) {
        let start = local_date_time(text, &caps[1], &caps[2], &caps[3], &caps[4], &caps[5])?;
        let end = local_date_time(text, &caps[6], &caps[7], &caps[8], &caps[9], &caps[10])?;
        utc_range(text, start, end, offset)?
    } else if let Some(caps) = PRETTY_DATE_TIME_RANGE_OMIT_DATE_RE.captures(text) {
        let start = local_date_time(text, &caps[1], &caps[2], &caps[3], &caps[4], &caps[5])?;
        let end = local_date_time(text, &caps[1], &caps[2], &caps[3], &caps[6], &caps[7])?;
        utc_range(text, start, end, offset)?
    } else if let Some(caps) = PRETTY_DATE_TIME_RANGE_OMIT_YEAR_RE.captures(text) {
        let start = local_date_time(text, &caps[1], &caps[2], &caps[3], &caps[4], &caps[5])?;
        let end = local_date_time(text, &caps[1], &caps[6], &caps[7], &caps[8], &caps[9])?;
        utc_range(text, start, end, offset)?
    } else {
        return Err(TemporalError::InvalidFormat(input.to_string()));
    };

    Ok(range.to_string())
}

/// Renders an ISO term as a compact local display string.
///
/// The end of a range drops its year when it shares the start's calendar
/// year, and a time range drops the end date entirely when both ends fall on
/// the same local date.
pub fn prettify(value: &str, utc_offset_minutes: i32) -> TemporalResult<String> {
    let value = value.trim();
    let range = TermRange::parse(value)?;
    let offset = Duration::minutes(i64::from(utc_offset_minutes));

    let pretty = match range.shape {
        TermShape::Date => range.start.format(PRETTY_DATE).to_string(),
        TermShape::DateTime => to_local(value, range.start, offset)?
            .format(PRETTY_DATE_TIME)
            .to_string(),
        TermShape::DateRange => {
            let end_format = if range.start.year() == range.end.year() {
                PRETTY_DATE_OMIT_YEAR
            } else {
                PRETTY_DATE
            };
            format!(
                "{} - {}",
                range.start.format(PRETTY_DATE),
                range.end.format(end_format)
            )
        }
        TermShape::DateTimeRange => {
            let start = to_local(value, range.start, offset)?;
            let end = to_local(value, range.end, offset)?;
            let end_format = if start.date() == end.date() {
                PRETTY_DATE_TIME_OMIT_DATE
            } else if start.year() == end.year() {
                PRETTY_DATE_TIME_OMIT_YEAR
            } else {
                PRETTY_DATE_TIME
            };
            format!(
                "{} - {}",
                start.format(PRETTY_DATE_TIME),
                end.format(end_format)
            )
        }
    };

    Ok(pretty)
}

fn local_date(text: &str, year: &str, month: &str, day: &str) -> TemporalResult<NaiveDateTime> {
    let date = date_or_invalid(text, year, month, day)?;
    midnight(date).ok_or_else(|| invalid_value(text))
}

fn local_date_time(
    text: &str,
    year: &str,
    month: &str,
    day: &str,
    hour: &str,
    minute: &str,
) -> TemporalResult<NaiveDateTime> {
    let date = date_or_invalid(text, year, month, day)?;
    let clock = clock_offset(hour, minute).ok_or_else(|| invalid_value(text))?;
    at_clock(date, clock).ok_or_else(|| invalid_value(text))
}

fn date_or_invalid(text: &str, year: &str, month: &str, day: &str) -> TemporalResult<NaiveDate> {
    calendar_date(year, month, day).ok_or_else(|| invalid_value(text))
}

fn utc_range(
    text: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    offset: Duration,
) -> TemporalResult<TermRange> {
    let start = to_utc(text, start, offset)?;
    let end = to_utc(text, end, offset)?;
    TermRange::between(TermShape::DateTimeRange, start, end, text)
}

fn to_utc(text: &str, local: NaiveDateTime, offset: Duration) -> TemporalResult<NaiveDateTime> {
    local
        .checked_sub_signed(offset)
        .and_then(within_iso_years)
        .ok_or_else(|| invalid_value(text))
}

fn to_local(text: &str, utc: NaiveDateTime, offset: Duration) -> TemporalResult<NaiveDateTime> {
    utc.checked_add_signed(offset)
        .and_then(within_iso_years)
        .ok_or_else(|| invalid_value(text))
}

fn invalid_value(text: &str) -> TemporalError {
    TemporalError::InvalidValue(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_collapses_whitespace_and_spaces_bare_hyphen() {
        assert_eq!(
            normalize("  2000/01/01-01/02 ", 0).expect("compact range should normalize"),
            "2000-01-01/2000-01-02"
        );
        assert_eq!(
            normalize("2000/01/01   09:00  -  10:00", 0).expect("loose spacing should normalize"),
            "2000-01-01T09:00Z/2000-01-01T10:00Z"
        );
    }
}
