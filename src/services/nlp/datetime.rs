//! Rule-based date and time extraction.
//!
//! Every rule is a small named function over lowercased text so it can be
//! tested on its own. Parsing is relative to an injected "today", which keeps
//! results deterministic.

use std::ops::Range;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::vocabulary::{contains_term, find_term, normalize};

pub const DATE_DISPLAY: &str = "%A, %B %d";
pub const TIME_DISPLAY: &str = "%-I:%M %p";
pub const DATETIME_DISPLAY: &str = "%A, %B %d at %-I:%M %p";

const MONTH_ALTERNATION: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

// "sat" and "sun" are ordinary words, so they only count after a prefix
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:next|this|on)\s+)?(monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sunday)\b|\b(?:next|this|on)\s+(sat|sun)\b",
    )
    .unwrap()
});

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({MONTH_ALTERNATION})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s*(\d{{4}})\b|,\s*(\d{{2}})\b)?"
    ))
    .unwrap()
});

static YEAR_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").unwrap());

static DAY_SLASH_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})(?:[/-](\d{2}|\d{4}))?\b").unwrap());

static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_ALTERNATION})\b(?:,?\s*(\d{{4}})\b)?"
    ))
    .unwrap()
});

static TIME_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?::|[ap]\.?m\b)").unwrap());

static AMPM_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\b").unwrap());

static PERIOD_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{1,2})(?::(\d{2}))?\s+(?:(?:in|at)\s+the\s+|at\s+)?(morning|afternoon|evening|night)\b",
    )
    .unwrap()
});

static DAY_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(morning|afternoon|evening|night)\b").unwrap());

static BARE_CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:at|around|about)\s+)?(\d{1,2})(?::(\d{2}))?(?:\s*o'?clock)?$").unwrap()
});

static TRAILING_CLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(\d{1,2})(?::(\d{2}))?(?:\s*o'?clock)?$").unwrap()
});

static AT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bat\s+").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDateTime {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub description: String,
}

impl ParsedDateTime {
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.date?.and_time(self.time?))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TimeReading {
    Exact(NaiveTime),
    Ambiguous { hour: u32, minute: u32 },
    Unrecognized,
}

struct DateMatch {
    date: NaiveDate,
    span: Range<usize>,
}

pub fn describe_date(date: NaiveDate) -> String {
    date.format(DATE_DISPLAY).to_string()
}

pub fn describe_time(time: NaiveTime) -> String {
    time.format(TIME_DISPLAY).to_string()
}

pub fn describe_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_DISPLAY).to_string()
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { year + 2000 } else { year })
}

fn capture_u32(caps: &Captures, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn span_of(caps: &Captures) -> Range<usize> {
    caps.get(0).map(|m| m.range()).unwrap_or(0..0)
}

fn hm(hour: u32, minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn day_part_hour(word: &str) -> u32 {
    match word {
        "morning" => 9,
        "afternoon" => 14,
        "evening" => 18,
        _ => 20,
    }
}

pub fn to_24_hour(hour: u32, pm: bool) -> u32 {
    match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    }
}

pub struct DateTimeExtractor {
    today: NaiveDate,
}

impl DateTimeExtractor {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn parse_date(&self, text: &str) -> Option<ParsedDateTime> {
        let text = normalize(text);
        self.find_date(&text).map(|m| ParsedDateTime {
            date: Some(m.date),
            time: None,
            description: describe_date(m.date),
        })
    }

    pub fn parse_time(&self, text: &str, reference_date: NaiveDate) -> Option<ParsedDateTime> {
        let text = normalize(text);
        find_time(&text).map(|time| ParsedDateTime {
            date: Some(reference_date),
            time: Some(time),
            description: describe_time(time),
        })
    }

    pub fn parse_date_time(&self, text: &str) -> Option<ParsedDateTime> {
        let text = normalize(text);
        let date = self.find_date(&text);
        let time_text = time_segment(&text, date.as_ref().map(|m| m.span.clone()));
        let time = match read_clock(&time_text, date.is_some()) {
            TimeReading::Exact(time) => Some(time),
            _ => None,
        };

        let description = match (date.as_ref(), time) {
            (Some(m), Some(t)) => describe_datetime(m.date.and_time(t)),
            (Some(m), None) => describe_date(m.date),
            (None, Some(t)) => describe_time(t),
            (None, None) => return None,
        };

        Some(ParsedDateTime {
            date: date.map(|m| m.date),
            time,
            description,
        })
    }

    pub fn ambiguous_hour(&self, text: &str) -> Option<(u32, u32)> {
        let text = normalize(text);
        let date = self.find_date(&text);
        let time_text = time_segment(&text, date.as_ref().map(|m| m.span.clone()));
        match read_clock(&time_text, date.is_some()) {
            TimeReading::Ambiguous { hour, minute } => Some((hour, minute)),
            _ => None,
        }
    }

    fn find_date(&self, text: &str) -> Option<DateMatch> {
        self.relative_day(text)
            .or_else(|| self.weekday(text))
            .or_else(|| self.month_day(text))
            .or_else(|| year_month_day(text))
            .or_else(|| self.day_slash_month(text))
            .or_else(|| self.day_month(text))
    }

    fn relative_day(&self, text: &str) -> Option<DateMatch> {
        [("day after tomorrow", 2), ("today", 0), ("tomorrow", 1)]
            .into_iter()
            .find_map(|(term, offset)| {
                find_term(text, term).map(|start| DateMatch {
                    date: self.today + Duration::days(offset),
                    span: start..start + term.len(),
                })
            })
    }

    fn weekday(&self, text: &str) -> Option<DateMatch> {
        let caps = WEEKDAY.captures(text)?;
        let span = span_of(&caps);

        // "tuesday, april 15" names the weekday of an explicit date
        let rest = &text[span.end..];
        if MONTH_DAY
            .find(rest)
            .is_some_and(|m| rest[..m.start()].trim_matches([',', ' ']).is_empty())
        {
            return None;
        }

        let name = caps.get(1).or_else(|| caps.get(2))?;
        let target = weekday_from_name(name.as_str())?;
        let current = self.today.weekday().num_days_from_monday() as i64;
        let wanted = target.num_days_from_monday() as i64;
        let mut ahead = (wanted - current).rem_euclid(7);
        if ahead == 0 {
            ahead = 7;
        }
        Some(DateMatch {
            date: self.today + Duration::days(ahead),
            span,
        })
    }

    fn month_day(&self, text: &str) -> Option<DateMatch> {
        MONTH_DAY.captures_iter(text).find_map(|caps| {
            let month = month_number(caps.get(1)?.as_str())?;
            let day = capture_u32(&caps, 2)?;
            let whole = caps.get(0)?;
            let year_group = caps.get(3).or_else(|| caps.get(4));

            // "april 15, 10 am" carries an hour, not a year
            let (year, end) = match year_group {
                Some(y) if !TIME_SUFFIX.is_match(&text[whole.end()..]) => {
                    (expand_year(y.as_str())?, whole.end())
                }
                _ => (self.today.year(), caps.get(2)?.end()),
            };

            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(DateMatch {
                date,
                span: whole.start()..end,
            })
        })
    }

    fn day_slash_month(&self, text: &str) -> Option<DateMatch> {
        DAY_SLASH_MONTH.captures_iter(text).find_map(|caps| {
            let day = capture_u32(&caps, 1)?;
            let month = capture_u32(&caps, 2)?;
            let year = match caps.get(3) {
                Some(y) => expand_year(y.as_str())?,
                None => self.today.year(),
            };
            Some(DateMatch {
                date: NaiveDate::from_ymd_opt(year, month, day)?,
                span: span_of(&caps),
            })
        })
    }

    fn day_month(&self, text: &str) -> Option<DateMatch> {
        DAY_MONTH.captures_iter(text).find_map(|caps| {
            let day = capture_u32(&caps, 1)?;
            let month = month_number(caps.get(2)?.as_str())?;
            let year = match caps.get(3) {
                Some(y) => expand_year(y.as_str())?,
                None => self.today.year(),
            };
            Some(DateMatch {
                date: NaiveDate::from_ymd_opt(year, month, day)?,
                span: span_of(&caps),
            })
        })
    }
}

fn year_month_day(text: &str) -> Option<DateMatch> {
    YEAR_MONTH_DAY.captures_iter(text).find_map(|caps| {
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = capture_u32(&caps, 2)?;
        let day = capture_u32(&caps, 3)?;
        Some(DateMatch {
            date: NaiveDate::from_ymd_opt(year, month, day)?,
            span: span_of(&caps),
        })
    })
}

fn time_segment(text: &str, date_span: Option<Range<usize>>) -> String {
    let remainder = match date_span {
        Some(span) => format!("{} {}", &text[..span.start], &text[span.end..]),
        None => text.to_string(),
    };
    let remainder = normalize(&remainder);
    match AT_SEPARATOR.find_iter(&remainder).last() {
        Some(m) => remainder[m.end()..].trim().to_string(),
        None => remainder,
    }
}

// `loose` accepts a clock value trailing other words
fn read_clock(text: &str, loose: bool) -> TimeReading {
    if let Some(time) = find_time(text) {
        return TimeReading::Exact(time);
    }

    let caps = BARE_CLOCK
        .captures(text)
        .or_else(|| loose.then(|| TRAILING_CLOCK.captures(text)).flatten());
    let Some(caps) = caps else {
        return TimeReading::Unrecognized;
    };

    let (Some(hour), minute) = (capture_u32(&caps, 1), capture_u32(&caps, 2).unwrap_or(0)) else {
        return TimeReading::Unrecognized;
    };
    if minute >= 60 {
        return TimeReading::Unrecognized;
    }

    match hour {
        1..=12 => TimeReading::Ambiguous { hour, minute },
        0 | 13..=23 => hm(hour, minute).map_or(TimeReading::Unrecognized, TimeReading::Exact),
        _ => TimeReading::Unrecognized,
    }
}

fn find_time(text: &str) -> Option<NaiveTime> {
    special_time(text)
        .or_else(|| ampm_time(text))
        .or_else(|| period_time(text))
        .or_else(|| evening_default(text))
        .or_else(|| day_part(text))
}

fn special_time(text: &str) -> Option<NaiveTime> {
    if contains_term(text, "noon") {
        hm(12, 0)
    } else if contains_term(text, "midnight") {
        hm(0, 0)
    } else {
        None
    }
}

fn ampm_time(text: &str) -> Option<NaiveTime> {
    AMPM_TIME.captures_iter(text).find_map(|caps| {
        let hour = capture_u32(&caps, 1)?;
        let minute = capture_u32(&caps, 2).unwrap_or(0);
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps.get(3)?.as_str() == "p";
        hm(to_24_hour(hour, pm), minute)
    })
}

fn period_time(text: &str) -> Option<NaiveTime> {
    PERIOD_TIME.captures_iter(text).find_map(|caps| {
        let hour = capture_u32(&caps, 1)?;
        let minute = capture_u32(&caps, 2).unwrap_or(0);
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps.get(3)?.as_str() != "morning";
        let hour = match (caps.get(3)?.as_str(), hour) {
            ("night", 12) => 0,
            ("afternoon" | "evening", 12) => 12,
            _ => to_24_hour(hour, pm),
        };
        hm(hour, minute)
    })
}

// lone hour 5-8 with no minutes is evening
fn evening_default(text: &str) -> Option<NaiveTime> {
    let caps = BARE_CLOCK.captures(text)?;
    if caps.get(2).is_some() {
        return None;
    }
    let hour = capture_u32(&caps, 1)?;
    (5..=8).contains(&hour).then(|| hm(hour + 12, 0)).flatten()
}

fn day_part(text: &str) -> Option<NaiveTime> {
    let caps = DAY_PART.captures(text)?;
    hm(day_part_hour(caps.get(1)?.as_str()), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Monday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn extractor() -> DateTimeExtractor {
        DateTimeExtractor::new(today())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn parsed_date(text: &str) -> Option<NaiveDate> {
        extractor().parse_date(text).and_then(|p| p.date)
    }

    fn parsed_time(text: &str) -> Option<NaiveTime> {
        extractor().parse_time(text, today()).and_then(|p| p.time)
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(parsed_date("today"), Some(today()));
        assert_eq!(parsed_date("tomorrow"), Some(date(2025, 1, 7)));
        assert_eq!(parsed_date("the day after tomorrow"), Some(date(2025, 1, 8)));
    }

    #[test]
    fn test_weekday_is_always_ahead() {
        assert_eq!(parsed_date("next Monday"), Some(date(2025, 1, 13)));
        assert_eq!(parsed_date("monday"), Some(date(2025, 1, 13)));
        assert_eq!(parsed_date("on fri"), Some(date(2025, 1, 10)));
        assert_eq!(parsed_date("next sat"), Some(date(2025, 1, 11)));
        assert_eq!(parsed_date("on sun"), Some(date(2025, 1, 12)));
        assert_eq!(parsed_date("saturday"), Some(date(2025, 1, 11)));
        assert_eq!(parsed_date("paint my sun room"), None);
        assert_eq!(parsed_date("I sat down"), None);

        let next_monday = parsed_date("next monday").unwrap();
        assert_eq!(next_monday.weekday(), Weekday::Mon);
        assert!(next_monday > today());
    }

    #[test]
    fn test_month_day_forms() {
        assert_eq!(parsed_date("April 15"), Some(date(2025, 4, 15)));
        assert_eq!(parsed_date("april 15th"), Some(date(2025, 4, 15)));
        assert_eq!(parsed_date("Sept 3, 2026"), Some(date(2026, 9, 3)));
        assert_eq!(parsed_date("march 2, 26"), Some(date(2026, 3, 2)));
        assert_eq!(parsed_date("february 30"), None);
    }

    #[test]
    fn test_month_day_does_not_swallow_hour() {
        let parsed = extractor().parse_date_time("April 15, 10 am").unwrap();
        assert_eq!(parsed.date, Some(date(2025, 4, 15)));
        assert_eq!(parsed.time, Some(time(10, 0)));
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(parsed_date("2025-04-15"), Some(date(2025, 4, 15)));
        assert_eq!(parsed_date("15/4"), Some(date(2025, 4, 15)));
        assert_eq!(parsed_date("15/4/26"), Some(date(2026, 4, 15)));
        assert_eq!(parsed_date("15 april"), Some(date(2025, 4, 15)));
        assert_eq!(parsed_date("3rd of May 2026"), Some(date(2026, 5, 3)));
    }

    #[test]
    fn test_round_trip_through_description() {
        for text in ["April 15", "tomorrow", "next friday", "15/4", "2025-12-01"] {
            let first = parsed_date(text).unwrap();
            let again = parsed_date(&describe_date(first)).unwrap();
            assert_eq!(first, again, "{text}");
        }
    }

    #[test]
    fn test_unparseable_date() {
        assert_eq!(parsed_date("whenever you like"), None);
        assert!(extractor().parse_date("soon").is_none());
    }

    #[test]
    fn test_explicit_times() {
        assert_eq!(parsed_time("3 PM"), Some(time(15, 0)));
        assert_eq!(parsed_time("3:15pm"), Some(time(15, 15)));
        assert_eq!(parsed_time("10 a.m."), Some(time(10, 0)));
        assert_eq!(parsed_time("12 am"), Some(time(0, 0)));
        assert_eq!(parsed_time("12pm"), Some(time(12, 0)));
        assert_eq!(parsed_time("noon"), Some(time(12, 0)));
        assert_eq!(parsed_time("midnight"), Some(time(0, 0)));
    }

    #[test]
    fn test_day_part_times() {
        assert_eq!(parsed_time("3:14 in the afternoon"), Some(time(15, 14)));
        assert_eq!(parsed_time("9 at night"), Some(time(21, 0)));
        assert_eq!(parsed_time("morning"), Some(time(9, 0)));
        assert_eq!(parsed_time("afternoon"), Some(time(14, 0)));
        assert_eq!(parsed_time("in the evening"), Some(time(18, 0)));
        assert_eq!(parsed_time("night"), Some(time(20, 0)));
    }

    #[test]
    fn test_evening_default_for_bare_hours() {
        assert_eq!(parsed_time("6"), Some(time(18, 0)));
        assert_eq!(parsed_time("at 5"), Some(time(17, 0)));
        assert_eq!(parsed_time("3"), None);
        assert_eq!(parsed_time("10"), None);
        assert_eq!(parsed_time("6:30"), None);
        assert_eq!(parsed_time("3:30"), None);
    }

    fn reading(text: &str) -> TimeReading {
        read_clock(&time_segment(&normalize(text), None), false)
    }

    #[test]
    fn test_clock_reading_flags_ambiguous_hours() {
        assert_eq!(reading("3"), TimeReading::Ambiguous { hour: 3, minute: 0 });
        assert_eq!(reading("3:30"), TimeReading::Ambiguous { hour: 3, minute: 30 });
        assert_eq!(reading("6"), TimeReading::Exact(time(18, 0)));
        assert_eq!(reading("15:45"), TimeReading::Exact(time(15, 45)));
        assert_eq!(reading("at 4 pm"), TimeReading::Exact(time(16, 0)));
        assert_eq!(reading("whenever"), TimeReading::Unrecognized);
        assert_eq!(reading("25"), TimeReading::Unrecognized);

        let ex = extractor();
        assert_eq!(ex.ambiguous_hour("3:30"), Some((3, 30)));
        assert_eq!(ex.ambiguous_hour("6"), None);
    }

    #[test]
    fn test_combined_date_time() {
        let ex = extractor();

        let parsed = ex.parse_date_time("April 15 at 3pm").unwrap();
        assert_eq!(parsed.timestamp(), Some(date(2025, 4, 15).and_time(time(15, 0))));
        assert_eq!(parsed.description, "Tuesday, April 15 at 3:00 PM");

        let parsed = ex.parse_date_time("tomorrow 6").unwrap();
        assert_eq!(parsed.timestamp(), Some(date(2025, 1, 7).and_time(time(18, 0))));

        let parsed = ex.parse_date_time("I need a plumber tomorrow morning").unwrap();
        assert_eq!(parsed.timestamp(), Some(date(2025, 1, 7).and_time(time(9, 0))));
    }

    #[test]
    fn test_combined_with_ambiguous_hour() {
        let ex = extractor();
        let parsed = ex.parse_date_time("tomorrow at 3").unwrap();
        assert_eq!(parsed.date, Some(date(2025, 1, 7)));
        assert_eq!(parsed.time, None);
        assert_eq!(ex.ambiguous_hour("tomorrow at 3"), Some((3, 0)));
        assert_eq!(ex.ambiguous_hour("tomorrow at 3pm"), None);
    }

    #[test]
    fn test_combined_partial_results() {
        let ex = extractor();
        let only_date = ex.parse_date_time("book a plumber for friday").unwrap();
        assert_eq!(only_date.date, Some(date(2025, 1, 10)));
        assert_eq!(only_date.time, None);
        assert_eq!(only_date.timestamp(), None);

        assert!(ex.parse_date_time("i need a plumber").is_none());
    }
}
