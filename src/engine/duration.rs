use once_cell::sync::Lazy;
use regex::Regex;

static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*h").unwrap());
static MINUTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*m").unwrap());
static SECONDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*s").unwrap());

/// Renders fractional hours as the canonical `"{h}h {m}m {s}s"` string.
/// Non-finite, zero, or negative input renders as `"0h 0m 0s"`.
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0h 0m 0s".to_string();
    }

    // Whole seconds via floor; the epsilon absorbs float noise from
    // values that came out of parse_hours.
    let total_seconds = (hours.abs() * 3600.0 + 1e-6).floor() as u64;
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;

    format!("{}h {}m {}s", h, m, s)
}

/// Recovers fractional hours from a duration string. Each component is
/// matched independently ("90m" is fine, so is "1h 30min 10sec"); a missing
/// component counts as 0. Malformed or empty input yields 0, never an error:
/// legacy records carry garbage here and a zero display beats a dead record.
pub fn parse_hours(text: &str) -> f64 {
    let h = first_int(&HOURS_RE, text);
    let m = first_int(&MINUTES_RE, text);
    let s = first_int(&SECONDS_RE, text);

    h as f64 + m as f64 / 60.0 + s as f64 / 3600.0
}

fn first_int(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
