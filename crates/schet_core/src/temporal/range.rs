//! ISO 8601 term grammar, validation and ordering.
//!
//! # Responsibility
//! - Recognize the four term shapes accepted as schedule slots.
//! - Reject calendar-invalid dates, out-of-range clocks and empty ranges.
//! - Provide a total order over term strings for display sorting.
//!
//! # Invariants
//! - Shapes are mutually exclusive by pattern; a string matches at most one.
//! - `24:00` is the only legal clock value with hour `24`.
//! - Ranges are strictly increasing: `end > start`.
//! - A bare date or date-time normalizes to `start == end`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid date regex"));
static ISO_DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})/([0-9]{4})-([0-9]{2})-([0-9]{2})$")
        .expect("valid date range regex")
});
static ISO_DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2})Z$")
        .expect("valid date time regex")
});
static ISO_DATE_TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2})Z/([0-9]{4})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2})Z$",
    )
    .expect("valid date time range regex")
});

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";
const MAX_ISO_YEAR: i32 = 9999;

/// Result type for temporal parsing and formatting.
pub type TemporalResult<T> = Result<T, TemporalError>;

/// Errors raised while parsing, normalizing or prettifying term strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    /// Input matches none of the accepted shapes.
    InvalidFormat(String),
    /// Input has the right shape but names an impossible date or clock.
    InvalidValue(String),
    /// Range end is not strictly after its start.
    EmptyRange(String),
}

impl Display for TemporalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(value) => write!(f, "unrecognized term format: `{value}`"),
            Self::InvalidValue(value) => write!(f, "invalid date or time in term: `{value}`"),
            Self::EmptyRange(value) => {
                write!(f, "term range must end after it starts: `{value}`")
            }
        }
    }
}

impl Error for TemporalError {}

/// The four mutually exclusive term shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermShape {
    /// `YYYY-MM-DD`
    Date,
    /// `YYYY-MM-DD/YYYY-MM-DD`
    DateRange,
    /// `YYYY-MM-DDTHH:MMZ`
    DateTime,
    /// `YYYY-MM-DDTHH:MMZ/YYYY-MM-DDTHH:MMZ`
    DateTimeRange,
}

impl TermShape {
    /// Returns whether this shape has distinct start and end components.
    pub fn is_range(self) -> bool {
        matches!(self, Self::DateRange | Self::DateTimeRange)
    }

    /// Returns whether this shape carries a clock component.
    pub fn has_time(self) -> bool {
        matches!(self, Self::DateTime | Self::DateTimeRange)
    }
}

/// A parsed term normalized to a UTC `(start, end)` instant pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermRange {
    pub shape: TermShape,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TermRange {
    /// Parses one ISO term string, applying calendar, clock and ordering checks.
    pub fn parse(value: &str) -> TemporalResult<Self> {
        if let Some(caps) = ISO_DATE_RE.captures(value) {
            let at = date_at(&caps, 1).ok_or_else(|| invalid_value(value))?;
            return Ok(Self::instant(TermShape::Date, at));
        }

        if let Some(caps) = ISO_DATE_RANGE_RE.captures(value) {
            let start = date_at(&caps, 1).ok_or_else(|| invalid_value(value))?;
            let end = date_at(&caps, 4).ok_or_else(|| invalid_value(value))?;
            return Self::between(TermShape::DateRange, start, end, value);
        }

        if let Some(caps) = ISO_DATE_TIME_RE.captures(value) {
            let at = date_time_at(&caps, 1).ok_or_else(|| invalid_value(value))?;
            return Ok(Self::instant(TermShape::DateTime, at));
        }

        if let Some(caps) = ISO_DATE_TIME_RANGE_RE.captures(value) {
            let start = date_time_at(&caps, 1).ok_or_else(|| invalid_value(value))?;
            let end = date_time_at(&caps, 6).ok_or_else(|| invalid_value(value))?;
            return Self::between(TermShape::DateTimeRange, start, end, value);
        }

        Err(TemporalError::InvalidFormat(value.to_string()))
    }

    pub(crate) fn instant(shape: TermShape, at: NaiveDateTime) -> Self {
        Self {
            shape,
            start: at,
            end: at,
        }
    }

    /// Builds a range value, rejecting `end <= start`.
    pub(crate) fn between(
        shape: TermShape,
        start: NaiveDateTime,
        end: NaiveDateTime,
        source: &str,
    ) -> TemporalResult<Self> {
        if end <= start {
            return Err(TemporalError::EmptyRange(source.to_string()));
        }
        Ok(Self { shape, start, end })
    }

    /// Orders by `start`, then by `end`. Shape does not participate.
    pub fn cmp_instants(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl FromStr for TermRange {
    type Err = TemporalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Renders the canonical ISO form. `24:00` renders as `00:00` of the next day.
impl Display for TermRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.shape {
            TermShape::Date => write!(f, "{}", self.start.format(ISO_DATE_FORMAT)),
            TermShape::DateTime => write!(f, "{}", self.start.format(ISO_DATE_TIME_FORMAT)),
            TermShape::DateRange => write!(
                f,
                "{}/{}",
                self.start.format(ISO_DATE_FORMAT),
                self.end.format(ISO_DATE_FORMAT)
            ),
            TermShape::DateTimeRange => write!(
                f,
                "{}/{}",
                self.start.format(ISO_DATE_TIME_FORMAT),
                self.end.format(ISO_DATE_TIME_FORMAT)
            ),
        }
    }
}

/// Returns whether `value` is exactly one well-formed term.
pub fn validate(value: &str) -> bool {
    TermRange::parse(value).is_ok()
}

/// Compares two term strings by their normalized instant pairs.
///
/// A date and a date-time at the same instant compare equal. Strings that do
/// not parse order after every valid term and lexically among themselves, so
/// the order stays total for arbitrary stored values.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (TermRange::parse(a), TermRange::parse(b)) {
        (Ok(left), Ok(right)) => left.cmp_instants(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Builds a calendar date from decimal fields, `None` when impossible.
pub(crate) fn calendar_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Converts `HH:MM` fields into an offset from midnight.
///
/// Hour must be in `[0, 24]`, minute in `[0, 59]`, and hour `24` only with
/// minute `0`.
pub(crate) fn clock_offset(hour: &str, minute: &str) -> Option<Duration> {
    let hour: i64 = hour.parse().ok()?;
    let minute: i64 = minute.parse().ok()?;

    if !(0..=24).contains(&hour) || !(0..=59).contains(&minute) {
        return None;
    }
    if hour == 24 && minute != 0 {
        return None;
    }

    Some(Duration::minutes(hour * 60 + minute))
}

pub(crate) fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

pub(crate) fn at_clock(date: NaiveDate, clock: Duration) -> Option<NaiveDateTime> {
    midnight(date)?
        .checked_add_signed(clock)
        .and_then(within_iso_years)
}

/// `None` when the year falls outside the four-digit grammar, e.g. for
/// `9999-12-31T24:00Z`.
pub(crate) fn within_iso_years(at: NaiveDateTime) -> Option<NaiveDateTime> {
    (0..=MAX_ISO_YEAR).contains(&at.year()).then_some(at)
}

fn date_at(caps: &Captures<'_>, first: usize) -> Option<NaiveDateTime> {
    let date = calendar_date(&caps[first], &caps[first + 1], &caps[first + 2])?;
    midnight(date)
}

fn date_time_at(caps: &Captures<'_>, first: usize) -> Option<NaiveDateTime> {
    let date = calendar_date(&caps[first], &caps[first + 1], &caps[first + 2])?;
    let clock = clock_offset(&caps[first + 3], &caps[first + 4])?;
    at_clock(date, clock)
}

fn invalid_value(value: &str) -> TemporalError {
    TemporalError::InvalidValue(value.to_string())
}
