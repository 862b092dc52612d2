//! ISO-8601 instants for the built-in `#inst` tag.
//!
//! Instants are represented as milliseconds since the Unix epoch. Accepted
//! forms are `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, optionally followed by
//! `THH:MM[:SS[.fraction]]` and a zone of `Z`, `+HH:MM` or `+HHMM`. A missing
//! zone is read as UTC.

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

fn parse_fixed_digits(bytes: &[u8], start: usize, len: usize) -> Option<u32> {
    let digits = bytes.get(start..start + len)?;
    digits.iter().try_fold(0u32, |value, &b| {
        b.is_ascii_digit().then(|| value * 10 + (b - b'0') as u32)
    })
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        _ => 28,
    }
}

// Days since 1970-01-01 in the proleptic Gregorian calendar.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let year_of_era = y - era * 400;
    let m = month as i64;
    let day_of_year = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Milliseconds from the leading digits of a fraction, `.52` being 520.
fn fraction_millis(digits: &[u8]) -> i64 {
    (0..3).fold(0, |ms, i| {
        ms * 10 + digits.get(i).map_or(0, |d| (d - b'0') as i64)
    })
}

/// Parse an ISO-8601 instant into milliseconds since the Unix epoch.
pub fn parse_instant(text: &str) -> Option<i64> {
    let bytes = text.as_bytes();
    let year = parse_fixed_digits(bytes, 0, 4)? as i64;
    let mut pos = 4;

    let (mut month, mut day) = (1, 1);
    if bytes.get(pos) == Some(&b'-') {
        month = parse_fixed_digits(bytes, pos + 1, 2)?;
        pos += 3;
        if bytes.get(pos) == Some(&b'-') {
            day = parse_fixed_digits(bytes, pos + 1, 2)?;
            pos += 3;
        }
    }
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return None;
    }

    let (mut hour, mut minute, mut second, mut millis) = (0, 0, 0, 0);
    let mut offset_minutes = 0i64;
    if bytes.get(pos) == Some(&b'T') {
        hour = parse_fixed_digits(bytes, pos + 1, 2)?;
        if bytes.get(pos + 3) != Some(&b':') {
            return None;
        }
        minute = parse_fixed_digits(bytes, pos + 4, 2)?;
        pos += 6;

        if bytes.get(pos) == Some(&b':') {
            second = parse_fixed_digits(bytes, pos + 1, 2)?;
            pos += 3;
            if bytes.get(pos) == Some(&b'.') {
                let start = pos + 1;
                let end = start
                    + bytes[start..]
                        .iter()
                        .take_while(|b| b.is_ascii_digit())
                        .count();
                if end == start {
                    return None;
                }
                millis = fraction_millis(&bytes[start..end]);
                pos = end;
            }
        }

        match bytes.get(pos) {
            Some(b'Z') => pos += 1,
            Some(&sign @ (b'+' | b'-')) => {
                let offset_hour = parse_fixed_digits(bytes, pos + 1, 2)?;
                pos += 3;
                if bytes.get(pos) == Some(&b':') {
                    pos += 1;
                }
                let offset_minute = parse_fixed_digits(bytes, pos, 2)?;
                pos += 2;
                if offset_hour > 23 || offset_minute > 59 {
                    return None;
                }
                offset_minutes = (offset_hour * 60 + offset_minute) as i64;
                if sign == b'-' {
                    offset_minutes = -offset_minutes;
                }
            }
            _ => {}
        }
    }

    if pos != bytes.len() || hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    Some(
        days_from_civil(year, month, day) * MS_PER_DAY
            + hour as i64 * MS_PER_HOUR
            + minute as i64 * MS_PER_MINUTE
            + second as i64 * MS_PER_SECOND
            + millis
            - offset_minutes * MS_PER_MINUTE,
    )
}

/// Render epoch milliseconds as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_instant(epoch_millis: i64) -> String {
    let days = epoch_millis.div_euclid(MS_PER_DAY);
    let ms_of_day = epoch_millis.rem_euclid(MS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        month,
        day,
        ms_of_day / MS_PER_HOUR,
        ms_of_day % MS_PER_HOUR / MS_PER_MINUTE,
        ms_of_day % MS_PER_MINUTE / MS_PER_SECOND,
        ms_of_day % MS_PER_SECOND,
    )
}
