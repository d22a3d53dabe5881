use super::*;

fn now() -> i64 {
    Utc::now().timestamp()
}

#[test]
fn parse_since_days() {
    let ts = parse_since("30d").unwrap();
    let expected = now() - 30 * 86_400;
    assert!(
        (ts - expected).abs() < 2,
        "timestamp should be within 2s of 30 days ago (got {ts}, expected ~{expected})"
    );
}

#[test]
fn parse_since_months() {
    let ts = parse_since("6m").unwrap();
    let expected = now() - 6 * 30 * 86_400;
    assert!((ts - expected).abs() < 2);
}

#[test]
fn parse_since_years() {
    let ts = parse_since("1y").unwrap();
    let expected = now() - 365 * 86_400;
    assert!((ts - expected).abs() < 2);
}

#[test]
fn parse_since_multi_char_units() {
    for unit in [
        "6mo", "6month", "6months", "1yr", "1year", "1years", "30day", "30days", "2w", "2weeks",
    ] {
        let result = parse_since(unit);
        assert!(result.is_ok(), "should accept {unit:?}, got: {result:?}");
    }
}

#[test]
fn parse_since_invalid_unit() {
    let err = parse_since("5x").unwrap_err();
    assert!(err.to_string().contains("unknown unit"), "got: {err}");
}

#[test]
fn parse_since_invalid_number() {
    let err = parse_since("abcd").unwrap_err();
    assert!(err.to_string().contains("invalid"), "got: {err}");
}

#[test]
fn parse_since_no_unit() {
    let err = parse_since("123").unwrap_err();
    assert!(err.to_string().contains("no unit"), "got: {err}");
}

#[test]
fn parse_since_empty() {
    let err = parse_since("").unwrap_err();
    assert!(err.to_string().contains("empty"), "got: {err}");
}

#[test]
fn parse_since_whitespace() {
    assert!(parse_since(" 30d ").unwrap() > 0);
}

#[test]
fn parse_since_overflow() {
    let err = parse_since("999999999999999999999y").unwrap_err();
    assert!(
        err.to_string().contains("too large") || err.to_string().contains("invalid"),
        "should reject overflow, got: {err}"
    );
}

#[test]
fn parse_since_underflow() {
    let err = parse_since("9999999y").unwrap_err();
    assert!(
        err.to_string().contains("epoch") || err.to_string().contains("too large"),
        "should reject dates before epoch, got: {err}"
    );
}

#[test]
fn clamp_finite_maps_nan_to_floor() {
    assert_eq!(clamp_finite(f64::NAN, 0.0, 1.0), 0.0);
    assert_eq!(clamp_finite(2.0, 0.0, 1.0), 1.0);
    assert_eq!(clamp_finite(-2.0, 0.0, 1.0), 0.0);
    assert_eq!(clamp_finite(f64::INFINITY, 0.0, 100.0), 100.0);
}

#[test]
fn round_to_decimals() {
    assert!((round_to(0.12345, 2) - 0.12).abs() < 1e-12);
    assert!((round_to(72.46, 1) - 72.5).abs() < 1e-12);
}
