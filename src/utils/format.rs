//! Display formatting for video cards.

use chrono::{DateTime, Utc};

/// Compact counts in the "1.2K" / "3.4M" style.
pub fn format_number_compact(n: u64) -> String {
    const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];

    for (scale, suffix) in UNITS {
        if n >= scale {
            let scaled = n as f64 / scale as f64;
            return if scaled >= 10.0 {
                format!("{}{suffix}", scaled.round() as u64)
            } else {
                let formatted = format!("{scaled:.1}");
                let trimmed = formatted.trim_end_matches(".0");
                format!("{trimmed}{suffix}")
            };
        }
    }
    n.to_string()
}

/// Render an ISO-8601 duration ("PT1H2M3S") as "1:02:03", or "4:13" when
/// there is no hour component. Unparseable input comes back verbatim.
pub fn format_duration(duration: &str) -> String {
    let Some(seconds) = parse_iso8601_seconds(duration) else {
        return duration.to_string();
    };

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    if hours == 0 {
        format!("{minutes}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}")
    }
}

fn parse_iso8601_seconds(duration: &str) -> Option<u64> {
    let rest = duration.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, time),
        None => (rest, ""),
    };

    const DATE_UNITS: &[(char, u64)] = &[('D', 86_400)];
    const TIME_UNITS: &[(char, u64)] = &[('H', 3_600), ('M', 60), ('S', 1)];

    let mut total: u64 = 0;
    for (part, units) in [(date_part, DATE_UNITS), (time_part, TIME_UNITS)] {
        let mut digits = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let scale = units.iter().find(|(unit, _)| *unit == c)?.1;
            total += digits.parse::<u64>().ok()? * scale;
            digits.clear();
        }
        if !digits.is_empty() {
            return None;
        }
    }
    Some(total)
}

/// Relative timestamps in the "3 months ago" style.
pub fn format_date_diff(published_at: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = (*now - *published_at).num_seconds().max(0);

    const STEPS: [(i64, &str); 5] = [
        (365 * 86_400, "year"),
        (30 * 86_400, "month"),
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
    ];

    for (scale, unit) in STEPS {
        if seconds >= scale {
            let count = seconds / scale;
            let plural = if count == 1 { "" } else { "s" };
            return format!("{count} {unit}{plural} ago");
        }
    }
    "just now".to_string()
}
