use chrono::{NaiveDate, NaiveDateTime};

const MONTHS: [(&str, u32); 12] = [
    ("January", 1),
    ("February", 2),
    ("March", 3),
    ("April", 4),
    ("May", 5),
    ("June", 6),
    ("July", 7),
    ("August", 8),
    ("September", 9),
    ("October", 10),
    ("November", 11),
    ("December", 12),
];

/// Closed `[start, end]` window derived from an event's date and time strings.
///
/// A bound is `None` when the source text could not be turned into a real
/// calendar instant. Every comparison against a missing bound is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeInterval {
    pub fn is_valid(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Live,
    NotLive,
}

impl EventStatus {
    pub fn is_live(self) -> bool {
        self == EventStatus::Live
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    Upcoming,
    Live,
    Ended,
    Unknown,
}

impl EventPhase {
    pub fn label(self) -> &'static str {
        match self {
            EventPhase::Upcoming => "upcoming",
            EventPhase::Live => "live",
            EventPhase::Ended => "ended",
            EventPhase::Unknown => "unknown",
        }
    }
}

/// Parses `"27 March"` / `"27-28 March"` and `"9:00 AM"` into an interval in `year`.
///
/// Ranged dates run until 23:59:59 of the last day. Single-day events end at
/// the very instant they start.
pub fn parse_schedule(start_date: &str, start_time: &str, year: i32) -> TimeInterval {
    let clock = parse_clock(start_time);
    let (day_part, month_name) = match start_date.trim().split_once(' ') {
        Some((day_part, month_name)) => (day_part, month_name.trim()),
        None => (start_date.trim(), ""),
    };
    let month = month_number(month_name);

    if let Some((first_day, last_day)) = day_part.split_once('-') {
        let start = clock.and_then(|(hour, minute)| {
            calendar_instant(year, month, leading_int(first_day), hour, minute, 0)
        });
        let end = calendar_instant(year, month, leading_int(last_day), 23, 59, 59);
        return TimeInterval { start, end };
    }

    let start = clock.and_then(|(hour, minute)| {
        calendar_instant(year, month, leading_int(day_part), hour, minute, 0)
    });
    TimeInterval { start, end: start }
}

/// Live iff `start <= now <= end`, both ends inclusive.
pub fn evaluate(interval: &TimeInterval, now: NaiveDateTime) -> EventStatus {
    match (interval.start, interval.end) {
        (Some(start), Some(end)) if now >= start && now <= end => EventStatus::Live,
        _ => EventStatus::NotLive,
    }
}

pub fn phase(interval: &TimeInterval, now: NaiveDateTime) -> EventPhase {
    let (Some(start), Some(end)) = (interval.start, interval.end) else {
        return EventPhase::Unknown;
    };

    // A reversed day range ("28-27 March") is never live.
    if end < start {
        return EventPhase::Unknown;
    }

    if evaluate(interval, now).is_live() {
        EventPhase::Live
    } else if now < start {
        EventPhase::Upcoming
    } else {
        EventPhase::Ended
    }
}

pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(month_name, _)| *month_name == name)
        .map(|(_, number)| *number)
}

/// Returns the 24-hour `(hour, minute)` for a `"H:MM AM|PM"` clock string.
fn parse_clock(input: &str) -> Option<(u32, u32)> {
    let mut parts = input.split_whitespace();
    let clock = parts.next()?;
    let meridiem = parts.next().unwrap_or("");
    let (hour, minute) = match clock.split_once(':') {
        Some((hour, minute)) => (leading_int(hour)?, leading_int(minute)?),
        None => return None,
    };

    let hour = if meridiem.eq_ignore_ascii_case("PM") && hour != 12 {
        hour.checked_add(12)?
    } else if meridiem.eq_ignore_ascii_case("AM") && hour == 12 {
        0
    } else {
        hour
    };

    Some((hour, minute))
}

fn calendar_instant(
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month?, day?)?.and_hms_opt(hour, minute, second)
}

/// Reads the leading decimal digits of `input`, ignoring anything after them.
fn leading_int(input: &str) -> Option<u32> {
    let trimmed = input.trim_start();
    let digits = trimmed
        .char_indices()
        .take_while(|(_, ch)| ch.is_ascii_digit())
        .map(|(index, ch)| index + ch.len_utf8())
        .last()?;
    trimmed[..digits].parse().ok()
}
