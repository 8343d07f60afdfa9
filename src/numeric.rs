//! Lenient numeric parsing shared by the operators and the export projections.
//!
//! Spreadsheet cells arrive as formatted text, so numbers are recovered the
//! permissive way a spreadsheet user expects: a leading numeric prefix is
//! enough for the operators, while the export projections coerce whole cells
//! and fall back to `NaN`.

use std::sync::OnceLock;

use regex::Regex;

fn float_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("float prefix pattern is valid")
    })
}

fn int_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("int prefix pattern is valid"))
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$")
            .expect("decimal pattern is valid")
    })
}

fn parse_signed_infinity(s: &str) -> Option<f64> {
    match s {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Parse the longest leading floating-point prefix of `s`.
/// Returns `None` when no digits lead the (left-trimmed) text.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let m = float_prefix_re().find(s)?;
    let text = m.as_str();
    parse_signed_infinity(text).or_else(|| text.parse::<f64>().ok())
}

/// Parse the leading base-10 integer prefix of `s`.
/// `"12abc"` yields 12, `"3.7"` yields 3, `"x"` and out-of-range values yield `None`.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let m = int_prefix_re().find(s)?;
    m.as_str().parse::<i64>().ok()
}

/// Whole-string numeric coercion: empty text is 0, anything that is not
/// entirely a number is `NaN`.
pub fn to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    if let Some(inf) = parse_signed_infinity(s) {
        return inf;
    }
    if decimal_re().is_match(s) {
        return s.parse::<f64>().unwrap_or(f64::NAN);
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => 16,
        Some("0o") | Some("0O") => 8,
        Some("0b") | Some("0B") => 2,
        _ => return f64::NAN,
    };
    match u64::from_str_radix(&s[2..], radix) {
        Ok(v) => v as f64,
        Err(_) => f64::NAN,
    }
}

/// Render a number the way it is shown in the table and written to CSV
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if v == 0.0 {
        // collapses -0
        "0".to_string()
    } else if v.abs() >= 1e21 || v.abs() < 1e-6 {
        // exponent form: `1e-7`, `1.5e+21`
        let sci = format!("{:e}", v);
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => sci,
        }
    } else {
        format!("{}", v)
    }
}
