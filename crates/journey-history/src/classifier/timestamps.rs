//! Touch-in/touch-out times and the timestamps derived from them.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Placeholder written in the time field of a journey with no touch-out.
pub const NO_TOUCH_OUT: &str = "[No touch-out]";

/// Travel date format, e.g. `01-Jan-2020`.
pub const DATE_FORMAT: &str = "%d-%b-%Y";

/// Clock time format, 24-hour.
pub const TIME_FORMAT: &str = "%H:%M";

/// A card reader time field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTime {
    /// A readable clock time.
    Recorded(NaiveTime),
    /// The journey was never closed with a touch-out.
    NoTouchOut,
    /// Blank or unreadable.
    Unrecorded,
}

impl TouchTime {
    /// Interpret a raw time field.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return TouchTime::Unrecorded;
        };

        if raw == NO_TOUCH_OUT {
            return TouchTime::NoTouchOut;
        }

        NaiveTime::parse_from_str(raw, TIME_FORMAT)
            .map(TouchTime::Recorded)
            .unwrap_or(TouchTime::Unrecorded)
    }

    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            TouchTime::Recorded(time) => Some(*time),
            TouchTime::NoTouchOut | TouchTime::Unrecorded => None,
        }
    }
}

/// Parse a `DD-Mon-YYYY` travel date.
pub fn parse_travel_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), DATE_FORMAT).ok()
}

/// Combine a travel date and a touch time; `None` if either is missing.
pub fn journey_timestamp(date: Option<NaiveDate>, time: TouchTime) -> Option<NaiveDateTime> {
    Some(date?.and_time(time.time()?))
}

/// Elapsed minutes from `start` to `end`, fractional, unclamped.
///
/// Journeys crossing midnight come out negative: both ends share the
/// travel date.
pub fn duration_minutes(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Option<f64> {
    let elapsed = end? - start?;
    Some(elapsed.num_milliseconds() as f64 / 60_000.0)
}
