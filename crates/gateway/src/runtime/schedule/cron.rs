//! Timezone-aware cron evaluator (6-field: sec min hour dom month dow).

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};

/// Parse a timezone string into a `chrono_tz::Tz`, falling back to UTC.
pub fn parse_tz(tz: &str) -> chrono_tz::Tz {
    tz.parse::<chrono_tz::Tz>().unwrap_or(chrono_tz::UTC)
}

/// Match one cron field against a value. Supports `*`, whole-field
/// `*/step`, comma lists, and inclusive `a-b` ranges.
fn field_matches(field: &str, value: u32) -> bool {
    if field == "*" {
        return true;
    }
    if let Some(step) = field.strip_prefix("*/") {
        if let Ok(n) = step.parse::<u32>() {
            return n > 0 && value.is_multiple_of(n);
        }
    }
    field.split(',').any(|part| match part.split_once('-') {
        Some((lo, hi)) => match (lo.parse::<u32>(), hi.parse::<u32>()) {
            (Ok(lo), Ok(hi)) => (lo..=hi).contains(&value),
            _ => false,
        },
        None => part.parse::<u32>() == Ok(value),
    })
}

/// Day-of-week field match. Both 0 and 7 mean Sunday.
fn dow_matches(field: &str, days_from_sunday: u32) -> bool {
    field_matches(field, days_from_sunday)
        || (days_from_sunday == 0 && field_matches(field, 7))
}

/// Check the minute-and-coarser fields (everything but seconds) of an
/// already-split 6-field expression against a local naive datetime.
fn minute_fields_match(fields: &[&str], dt: &NaiveDateTime) -> bool {
    field_matches(fields[1], dt.minute())
        && field_matches(fields[2], dt.hour())
        && field_matches(fields[3], dt.day())
        && field_matches(fields[4], dt.month())
        && dow_matches(fields[5], dt.weekday().num_days_from_sunday())
}

/// Check if a **local** naive datetime matches a 6-field cron expression.
fn cron_matches_naive(cron: &str, dt: &NaiveDateTime) -> bool {
    let fields: Vec<&str> = cron.split_whitespace().collect();
    if fields.len() != 6 {
        return false;
    }
    field_matches(fields[0], dt.second()) && minute_fields_match(&fields, dt)
}

/// Check if a UTC datetime matches a 6-field cron expression (UTC shorthand).
pub fn cron_matches(cron: &str, dt: &DateTime<Utc>) -> bool {
    cron_matches_naive(cron, &dt.naive_utc())
}

/// Map a local wall-clock time to UTC. Fall-back overlaps resolve to the
/// earlier (pre-transition) instant; spring-forward gaps yield `None`.
fn local_to_utc(tz: chrono_tz::Tz, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
    use chrono::TimeZone;

    match tz.from_local_datetime(local) {
        chrono::LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earlier, _) => Some(earlier.with_timezone(&Utc)),
        chrono::LocalResult::None => None,
    }
}

/// Compute the next occurrence strictly after `after` for a cron
/// expression, evaluated in the given timezone. Returns a UTC `DateTime`.
///
/// The scan walks minute by minute for up to a year; within each minute
/// whose coarser fields match, the seconds field picks the instant. The
/// first minute only considers seconds after `after` itself.
///
/// **DST handling:**
/// - Spring-forward gaps: local times that don't exist are skipped.
/// - Fall-back overlaps: the earliest (pre-transition) mapping is chosen.
pub fn cron_next_tz(cron: &str, after: &DateTime<Utc>, tz: chrono_tz::Tz) -> Option<DateTime<Utc>> {
    let fields: Vec<&str> = cron.split_whitespace().collect();
    if fields.len() != 6 {
        return None;
    }

    let local_after = after.with_timezone(&tz).naive_local();
    let mut minute = local_after
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(local_after);

    // A year of minutes bounds the scan for expressions that never fire.
    const SCAN_LIMIT: u32 = 366 * 24 * 60;
    for step in 0..SCAN_LIMIT {
        if minute_fields_match(&fields, &minute) {
            // Within the first minute only instants after `after` count.
            let first_sec = if step == 0 { local_after.second() + 1 } else { 0 };
            for sec in first_sec..60 {
                if !field_matches(fields[0], sec) {
                    continue;
                }
                let local = minute + chrono::Duration::seconds(sec as i64);
                match local_to_utc(tz, &local) {
                    Some(utc) => return Some(utc),
                    // The whole minute sits in a DST gap, move on.
                    None => break,
                }
            }
        }
        minute += chrono::Duration::minutes(1);
    }
    None
}

/// Convenience: compute the next occurrence using UTC.
pub fn cron_next(cron: &str, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    cron_next_tz(cron, after, chrono_tz::UTC)
}

/// Compute up to N next occurrences, timezone-aware.
pub fn cron_next_n_tz(
    cron: &str,
    after: &DateTime<Utc>,
    n: usize,
    tz: chrono_tz::Tz,
) -> Vec<DateTime<Utc>> {
    let mut out = Vec::with_capacity(n);
    let mut cursor = *after;
    while out.len() < n {
        let Some(next) = cron_next_tz(cron, &cursor, tz) else {
            break;
        };
        cursor = next;
        out.push(next);
    }
    out
}

/// Convenience: compute up to N next occurrences using UTC.
pub fn cron_next_n(cron: &str, after: &DateTime<Utc>, n: usize) -> Vec<DateTime<Utc>> {
    cron_next_n_tz(cron, after, n, chrono_tz::UTC)
}
