//! Variable-precision release dates

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A date with only as much precision as the tag provided.
///
/// Field order matters: the derived ordering compares year first and treats a
/// missing component as earlier than any present one, so `2020` sorts before
/// `2020-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    year: u32,
    month: Option<u8>,
    day: Option<u8>,
    hour: Option<u8>,
    minute: Option<u8>,
    second: Option<u8>,
}

impl Date {
    /// Date from a bare year. An eight digit value is read as `yyyymmdd`.
    pub fn from_year(year: i64) -> Option<Date> {
        if (10_000_000..=100_000_000).contains(&year) {
            let digits = year.to_string();
            let part = |range: std::ops::Range<usize>| {
                digits.get(range).and_then(|s| s.parse::<i64>().ok())
            };
            Self::from_tokens(&[part(0..4)?, part(4..6)?, part(6..8)?])
        } else {
            Self::from_tokens(&[year])
        }
    }

    pub fn from_ymd(year: i64, month: i64, day: i64) -> Option<Date> {
        Self::from_tokens(&[year, month, day])
    }

    pub fn from_ymdhm(year: i64, month: i64, day: i64, hour: i64, minute: i64) -> Option<Date> {
        Self::from_tokens(&[year, month, day, hour, minute])
    }

    /// Parse a possibly truncated ISO-8601 timestamp, falling back to a bare
    /// integer year.
    ///
    /// Accepted: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS][Z]`,
    /// with `.` allowed in place of `-` or `:` and a space in place of `T`.
    pub fn parse(timestamp: &str) -> Option<Date> {
        match iso8601_tokens(timestamp) {
            Some(tokens) => Self::from_tokens(&tokens),
            None => timestamp.parse::<i64>().ok().and_then(Self::from_year),
        }
    }

    /// Builds a date from raw components, keeping the valid prefix.
    fn from_tokens(tokens: &[i64]) -> Option<Date> {
        fn within(value: Option<&i64>, min: i64, max: i64) -> Option<u8> {
            value
                .copied()
                .filter(|v| (min..=max).contains(v))
                .map(|v| v as u8)
        }

        let year = tokens
            .first()
            .copied()
            .filter(|y| *y > 0 && *y <= u32::MAX as i64)? as u32;

        let mut date = Date {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
        };

        let Some(month) = within(tokens.get(1), 1, 12) else {
            return Some(date);
        };
        date.month = Some(month);
        let Some(day) = within(tokens.get(2), 1, 31) else {
            return Some(date);
        };
        date.day = Some(day);
        let Some(hour) = within(tokens.get(3), 0, 23) else {
            return Some(date);
        };
        date.hour = Some(hour);
        let Some(minute) = within(tokens.get(4), 0, 59) else {
            return Some(date);
        };
        date.minute = Some(minute);
        date.second = within(tokens.get(5), 0, 59);
        Some(date)
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn month(&self) -> Option<u8> {
        self.month
    }

    pub fn day(&self) -> Option<u8> {
        self.day
    }
}

/// Splits a timestamp shaped like
/// `^(\d{4})([-.](\d{2})([-.](\d{2})([T ](\d{2})([:.](\d{2})([:.](\d{2})(Z)?)?)?)?)?)?$`
/// into its numeric groups. Returns `None` when the whole string does not match.
fn iso8601_tokens(timestamp: &str) -> Option<Vec<i64>> {
    let bytes = timestamp.as_bytes();
    let mut pos = 0;
    let mut tokens = Vec::with_capacity(6);

    let digits = |pos: usize, len: usize| -> Option<i64> {
        let slice = bytes.get(pos..pos + len)?;
        if slice.iter().all(u8::is_ascii_digit) {
            std::str::from_utf8(slice).ok()?.parse().ok()
        } else {
            None
        }
    };

    tokens.push(digits(pos, 4)?);
    pos += 4;

    // Separator expected before each following two-digit group.
    let separators: [&[u8]; 5] = [b"-.", b"-.", b"T ", b":.", b":."];
    for allowed in separators {
        if pos == bytes.len() {
            return Some(tokens);
        }
        if !allowed.contains(&bytes[pos]) {
            break;
        }
        tokens.push(digits(pos + 1, 2)?);
        pos += 3;
    }

    if pos == bytes.len() {
        return Some(tokens);
    }
    // A trailing `Z` is only allowed after the seconds group.
    if tokens.len() == 6 && &bytes[pos..] == b"Z" {
        return Some(tokens);
    }
    None
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        let Some(month) = self.month else {
            return Ok(());
        };
        write!(f, "-{:02}", month)?;
        let Some(day) = self.day else {
            return Ok(());
        };
        write!(f, "-{:02}", day)?;
        let Some(hour) = self.hour else {
            return Ok(());
        };
        write!(f, "T{:02}", hour)?;
        if let Some(minute) = self.minute {
            write!(f, ":{:02}", minute)?;
            if let Some(second) = self.second {
                write!(f, ":{:02}", second)?;
            }
        }
        write!(f, "Z")
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
    }
}

/// The span of dates found across an album's songs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub min: Date,
    pub max: Date,
}

impl DateRange {
    /// `None` when no date was given.
    pub fn from_dates<I: IntoIterator<Item = Date>>(dates: I) -> Option<DateRange> {
        let mut iter = dates.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), date| {
            (min.min(date), max.max(date))
        });
        Some(DateRange { min, max })
    }
}

impl PartialOrd for DateRange {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateRange {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.min.cmp(&other.min).then(self.max.cmp(&other.max))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{} - {}", self.min, self.max)
        }
    }
}
