//! Korean display formatting for timestamps.
//!
//! Every function renders in `Asia/Seoul` using the `ko-KR` layout
//! (`2025. 01. 21. 오후 03:30:45`). Missing input renders as an empty string
//! and unparseable input as [`INVALID_DATE`]; nothing here returns an error.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use log::debug;

use crate::error::SharedError;
use crate::timezone::{parse_instant, parse_timezone, to_seoul, SEOUL};

/// Rendered in place of a timestamp that could not be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Canonical layout used by [`format_canonical`].
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const AM_MARKER: &str = "오전";
const PM_MARKER: &str = "오후";

/// A timestamp as handed over by UI code.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Absent,
    Instant(DateTime<Utc>),
    Text(String),
}

impl DateInput {
    fn resolve(&self) -> Option<Result<DateTime<Utc>, String>> {
        match self {
            DateInput::Absent => None,
            DateInput::Instant(dt) => Some(Ok(*dt)),
            DateInput::Text(text) if text.is_empty() => None,
            DateInput::Text(text) => Some(parse_instant(text).map_err(|_| text.clone())),
        }
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            DateInput::Absent
        } else {
            DateInput::Text(text.to_string())
        }
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        if text.is_empty() {
            DateInput::Absent
        } else {
            DateInput::Text(text)
        }
    }
}

impl From<&String> for DateInput {
    fn from(text: &String) -> Self {
        DateInput::from(text.as_str())
    }
}

impl<Z: TimeZone> From<DateTime<Z>> for DateInput {
    fn from(dt: DateTime<Z>) -> Self {
        DateInput::Instant(dt.with_timezone(&Utc))
    }
}

/// Naive date-times carry no offset and are read as UTC.
impl From<NaiveDateTime> for DateInput {
    fn from(naive: NaiveDateTime) -> Self {
        DateInput::Instant(naive.and_utc())
    }
}

/// Milliseconds since the Unix epoch. Out-of-range values render as invalid.
impl From<i64> for DateInput {
    fn from(millis: i64) -> Self {
        match Utc.timestamp_millis_opt(millis).single() {
            Some(dt) => DateInput::Instant(dt),
            None => DateInput::Text(millis.to_string()),
        }
    }
}

impl<T: Into<DateInput>> From<Option<T>> for DateInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DateInput::Absent)
    }
}

/// How a single date/time component is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    Numeric,
    TwoDigit,
    /// Leave the component out entirely.
    Hidden,
}

/// Formatting options in the spirit of `Intl.DateTimeFormat`.
///
/// `None` fields are unset. When used as overrides for [`format_long`], every
/// `Some` field replaces the corresponding default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormatOptions {
    pub year: Option<FieldStyle>,
    pub month: Option<FieldStyle>,
    pub day: Option<FieldStyle>,
    pub hour: Option<FieldStyle>,
    pub minute: Option<FieldStyle>,
    pub second: Option<FieldStyle>,
    pub hour12: Option<bool>,
    pub time_zone: Option<Tz>,
}

impl FormatOptions {
    /// Defaults used by [`format_long`]
    pub fn long_defaults() -> Self {
        Self {
            year: Some(FieldStyle::Numeric),
            month: Some(FieldStyle::TwoDigit),
            day: Some(FieldStyle::TwoDigit),
            hour: Some(FieldStyle::TwoDigit),
            minute: Some(FieldStyle::TwoDigit),
            second: Some(FieldStyle::TwoDigit),
            hour12: Some(true),
            time_zone: Some(SEOUL),
        }
    }

    /// Options used by [`format_short`]
    pub fn short_defaults() -> Self {
        Self {
            year: Some(FieldStyle::Numeric),
            month: Some(FieldStyle::Numeric),
            day: Some(FieldStyle::Numeric),
            hour: Some(FieldStyle::Numeric),
            minute: Some(FieldStyle::TwoDigit),
            second: None,
            hour12: Some(true),
            time_zone: Some(SEOUL),
        }
    }

    pub fn hour12(mut self, hour12: bool) -> Self {
        self.hour12 = Some(hour12);
        self
    }

    pub fn time_zone(mut self, tz: Tz) -> Self {
        self.time_zone = Some(tz);
        self
    }

    /// Like [`FormatOptions::time_zone`], taking an IANA name such as `America/Chicago`.
    pub fn time_zone_named(self, name: &str) -> Result<Self, SharedError> {
        Ok(self.time_zone(parse_timezone(name)?))
    }

    pub fn year(mut self, style: FieldStyle) -> Self {
        self.year = Some(style);
        self
    }

    pub fn month(mut self, style: FieldStyle) -> Self {
        self.month = Some(style);
        self
    }

    pub fn day(mut self, style: FieldStyle) -> Self {
        self.day = Some(style);
        self
    }

    pub fn hour(mut self, style: FieldStyle) -> Self {
        self.hour = Some(style);
        self
    }

    pub fn minute(mut self, style: FieldStyle) -> Self {
        self.minute = Some(style);
        self
    }

    pub fn second(mut self, style: FieldStyle) -> Self {
        self.second = Some(style);
        self
    }

    /// Lay `self` over `defaults`: set fields win, unset fields inherit.
    pub fn merged_onto(&self, defaults: &FormatOptions) -> FormatOptions {
        FormatOptions {
            year: self.year.or(defaults.year),
            month: self.month.or(defaults.month),
            day: self.day.or(defaults.day),
            hour: self.hour.or(defaults.hour),
            minute: self.minute.or(defaults.minute),
            second: self.second.or(defaults.second),
            hour12: self.hour12.or(defaults.hour12),
            time_zone: self.time_zone.or(defaults.time_zone),
        }
    }
}

/// Long form, e.g. `2025. 01. 21. 오후 03:30:45`.
pub fn format_long(date: impl Into<DateInput>, overrides: &FormatOptions) -> String {
    let options = overrides.merged_onto(&FormatOptions::long_defaults());
    render(date.into(), |instant| render_ko(instant, &options))
}

/// Fixed `YYYY-MM-DD HH:MM:SS` in Seoul time on a 24-hour clock.
pub fn format_canonical(date: impl Into<DateInput>) -> String {
    render(date.into(), |instant| {
        to_seoul(instant).format(CANONICAL_FORMAT).to_string()
    })
}

/// Compact form for list rows, e.g. `2025. 1. 21. 오후 3:30`.
pub fn format_short(date: impl Into<DateInput>) -> String {
    let options = FormatOptions::short_defaults();
    render(date.into(), |instant| render_ko(instant, &options))
}

fn render(input: DateInput, f: impl FnOnce(DateTime<Utc>) -> String) -> String {
    match input.resolve() {
        None => String::new(),
        Some(Ok(instant)) => f(instant),
        Some(Err(text)) => {
            debug!("Unparseable date input: {:?}", text);
            INVALID_DATE.to_string()
        }
    }
}

fn is_shown(style: Option<FieldStyle>) -> bool {
    matches!(style, Some(FieldStyle::Numeric) | Some(FieldStyle::TwoDigit))
}

fn pad(value: u32, style: Option<FieldStyle>) -> String {
    match style {
        Some(FieldStyle::TwoDigit) => format!("{:02}", value),
        _ => value.to_string(),
    }
}

fn render_ko(instant: DateTime<Utc>, options: &FormatOptions) -> String {
    let local = instant.with_timezone(&options.time_zone.unwrap_or(SEOUL));

    let mut date_parts = Vec::new();
    if is_shown(options.year) {
        let year = match options.year {
            Some(FieldStyle::TwoDigit) => format!("{:02}", local.year().rem_euclid(100)),
            _ => local.year().to_string(),
        };
        date_parts.push(format!("{}.", year));
    }
    if is_shown(options.month) {
        date_parts.push(format!("{}.", pad(local.month(), options.month)));
    }
    if is_shown(options.day) {
        date_parts.push(format!("{}.", pad(local.day(), options.day)));
    }

    let show_hour = is_shown(options.hour);
    let show_minute = is_shown(options.minute);
    let show_second = is_shown(options.second);
    // ko-KR defaults to a 12-hour clock
    let hour12 = options.hour12.unwrap_or(true);

    let mut time_parts = Vec::new();
    if show_hour {
        let hour = local.hour();
        time_parts.push(if hour12 {
            let h = match hour % 12 {
                0 => 12,
                h => h,
            };
            pad(h, options.hour)
        } else {
            pad(hour, options.hour)
        });
    }
    if show_minute {
        let style = if show_hour || show_second { Some(FieldStyle::TwoDigit) } else { options.minute };
        time_parts.push(pad(local.minute(), style));
    }
    if show_second {
        let style = if show_hour || show_minute { Some(FieldStyle::TwoDigit) } else { options.second };
        time_parts.push(pad(local.second(), style));
    }

    let mut time = time_parts.join(":");
    if show_hour && hour12 {
        let marker = if local.hour() < 12 { AM_MARKER } else { PM_MARKER };
        time = format!("{} {}", marker, time);
    }

    match (date_parts.is_empty(), time.is_empty()) {
        (false, false) => format!("{} {}", date_parts.join(" "), time),
        (false, true) => date_parts.join(" "),
        (true, _) => time,
    }
}
