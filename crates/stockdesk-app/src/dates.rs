// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime};

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 3000;

/// Checks a `DD/MM/YYYY` string against the calendar, leap years included.
pub fn is_valid_date(value: &str) -> bool {
    parse_display_date(value).is_some()
}

/// Parses `DD/MM/YYYY` into its (day, month, year) parts when the string is
/// a real calendar date with a year in 1000..=3000.
pub fn parse_display_date(value: &str) -> Option<(u8, Month, i32)> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != 2 && *index != 5)
        .all(|(_, byte)| byte.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    let day: u8 = value[0..2].parse().ok()?;
    let month: u8 = value[3..5].parse().ok()?;
    let year: i32 = value[6..10].parse().ok()?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    let month = Month::try_from(month).ok()?;
    if day == 0 || day > days_in_month(month, year) {
        return None;
    }
    Some((day, month, year))
}

pub fn days_in_month(month: Month, year: i32) -> u8 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

/// Renders a backend date value as `DD/MM/YYYY`. Values that do not parse
/// are returned unchanged.
pub fn format_display_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if is_valid_date(trimmed) {
        return trimmed.to_owned();
    }

    match parse_backend_date(trimmed) {
        Some(date) => format!(
            "{:02}/{:02}/{:04}",
            date.day(),
            u8::from(date.month()),
            date.year()
        ),
        None => raw.to_owned(),
    }
}

fn parse_backend_date(value: &str) -> Option<Date> {
    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(timestamp.date());
    }
    if let Some(prefix) = value.get(0..10)
        && let Ok(date) = Date::parse(prefix, format_description!("[year]-[month]-[day]"))
    {
        return Some(date);
    }
    // Spreadsheet dates stringified by the script runtime, e.g.
    // "Thu Feb 29 2024 00:00:00 GMT+0000 (Coordinated Universal Time)".
    value.get(0..15).and_then(|prefix| {
        Date::parse(
            prefix,
            format_description!("[weekday repr:short] [month repr:short] [day] [year]"),
        )
        .ok()
    })
}
