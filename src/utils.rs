use chrono::{DateTime, Utc};

/// Reformat an ISO8601 publish timestamp (2020-01-02T03:04:05Z) for display.
/// Anything that does not parse comes back unchanged.
pub fn format_publish_date(raw: &str) -> String {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return dt.format("%B %-d, %Y").to_string();
    }
    raw.to_string()
}

/// Render an ISO8601 duration (PT1H2M3S) as H:MM:SS, or M:SS under an hour.
/// Durations outside the PT form (e.g. "P0D" for live streams) and anything
/// that does not parse come back unchanged.
pub fn format_iso8601_duration(raw: &str) -> String {
    let Some(duration_part) = raw.strip_prefix("PT") else {
        return raw.to_string();
    };

    let mut hours: i64 = 0;
    let mut minutes: i64 = 0;
    let mut seconds: i64 = 0;
    let mut current_number = String::new();
    let mut matched_unit = false;

    for ch in duration_part.chars() {
        if ch.is_ascii_digit() {
            current_number.push(ch);
            continue;
        }
        let Ok(num) = current_number.parse::<i64>() else {
            return raw.to_string();
        };
        match ch {
            'H' => hours = num,
            'M' => minutes = num,
            'S' => seconds = num,
            _ => return raw.to_string(),
        }
        matched_unit = true;
        current_number.clear();
    }

    // Trailing digits without a unit, or a bare "PT", is not a duration.
    if !matched_unit || !current_number.is_empty() {
        return raw.to_string();
    }

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
