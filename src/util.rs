use std::error::Error;

use chrono::Utc;

const DAY: u64 = 86_400;

/// Parse a duration string like "6m", "1y", "30d" (or "6months", "1yr",
/// "30days") into a Unix timestamp that far back from now.
///
/// Approximations: 1 month = 30 days, 1 year = 365 days.
pub fn parse_since(s: &str) -> Result<i64, Box<dyn Error>> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty --since value".into());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("no unit in --since value: {s:?} (expected e.g. 6m, 1y, 30d)"))?;
    let (num_str, unit) = s.split_at(split);
    let n: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid --since value: {s:?} (expected e.g. 6m, 1y, 30d)"))?;

    let unit_secs = match unit {
        "d" | "day" | "days" => DAY,
        "w" | "wk" | "week" | "weeks" => 7 * DAY,
        "m" | "mo" | "month" | "months" => 30 * DAY,
        "y" | "yr" | "year" | "years" => 365 * DAY,
        _ => return Err(format!("unknown unit in --since: {s:?} (use d, w, m, or y)").into()),
    };
    let seconds = n.checked_mul(unit_secs).ok_or("--since value too large")?;
    let seconds = i64::try_from(seconds).map_err(|_| "--since value too large")?;

    let now = Utc::now().timestamp();
    now.checked_sub(seconds)
        .filter(|ts| *ts >= 0)
        .ok_or_else(|| format!("--since value reaches before the Unix epoch: {s:?}").into())
}

/// Clamp to `[lo, hi]`, mapping NaN to `lo` so scores can never leak NaN.
pub fn clamp_finite(v: f64, lo: f64, hi: f64) -> f64 {
    if v.is_nan() { lo } else { v.clamp(lo, hi) }
}

/// Round for display/JSON output.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

#[cfg(test)]
#[path = "util_test.rs"]
mod tests;
