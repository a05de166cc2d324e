// ABOUTME: Flexible timestamp parsing for feed and API date strings.
// ABOUTME: Converts every recognized format to an absolute UTC instant; raw strings never escape.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Parses a datetime string using the formats syndication sources actually
/// emit. Returns `None` when no format matches; callers treat that as an
/// absent timestamp rather than an error.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC3339 first (Atom, JSON Feed, WordPress GMT dates)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // RFC2822 (RSS pubDate / lastBuildDate)
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = parse_with_named_timezone(s) {
        return Some(dt);
    }

    // Variants with a numeric offset that RFC parsing rejects
    let formats_with_tz = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%a, %e %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S %z",
        "%e %b %Y %H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%z",
    ];
    for fmt in &formats_with_tz {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // No timezone marker at all: assume UTC
    let formats_naive = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%e %b %Y %H:%M:%S",
    ];
    for fmt in &formats_naive {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    // Date-only
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&naive));
    }

    None
}

/// Parses datetimes that end in a timezone abbreviation. chrono's `%Z`
/// cannot map names to offsets, so the common ones are handled here.
fn parse_with_named_timezone(s: &str) -> Option<DateTime<Utc>> {
    let tz_offsets: &[(&str, i32)] = &[
        ("GMT", 0),
        ("UTC", 0),
        ("UT", 0),
        ("EST", -5 * 3600),
        ("EDT", -4 * 3600),
        ("CST", -6 * 3600),
        ("CDT", -5 * 3600),
        ("MST", -7 * 3600),
        ("MDT", -6 * 3600),
        ("PST", -8 * 3600),
        ("PDT", -7 * 3600),
        ("CET", 3600),
        ("CEST", 2 * 3600),
        ("EET", 2 * 3600),
        ("EEST", 3 * 3600),
        ("BST", 3600),
        ("JST", 9 * 3600),
        ("AEST", 10 * 3600),
        ("AEDT", 11 * 3600),
    ];

    for (tz_name, offset_secs) in tz_offsets {
        if let Some(base) = s.strip_suffix(tz_name) {
            let base = base.trim_end();
            let formats = [
                "%a, %d %b %Y %H:%M:%S",
                "%a, %e %b %Y %H:%M:%S",
                "%d %b %Y %H:%M:%S",
                "%e %b %Y %H:%M:%S",
            ];
            for fmt in &formats {
                if let Ok(naive) = NaiveDateTime::parse_from_str(base, fmt) {
                    let offset = FixedOffset::east_opt(*offset_secs)?;
                    let dt = offset.from_local_datetime(&naive).single()?;
                    return Some(dt.with_timezone(&Utc));
                }
            }
        }
    }

    None
}
