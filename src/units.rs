use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Asset id of the collateral token (USDC) on the CTF exchange.
pub const COLLATERAL_ASSET_ID: &str = "0";

/// USDC has 6 decimals: 1_000_000 base units = 1 USDC.
pub const COLLATERAL_UNIT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

pub fn is_collateral(asset_id: &str) -> bool {
    asset_id == COLLATERAL_ASSET_ID
}

/// Parse a base-unit amount string, truncating any fractional part.
pub fn parse_base_units(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok().map(|d| d.trunc())
}

/// Convert a base-unit amount string to whole USDC.
pub fn scale_collateral(raw: &str) -> Option<Decimal> {
    parse_base_units(raw).map(|d| d / COLLATERAL_UNIT)
}

/// Same as [`scale_collateral`] as an `f64`, for charting. Unparseable amounts count as zero.
pub fn scale_collateral_f64(raw: &str) -> f64 {
    scale_collateral(raw)
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

/// Display value of one trade leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LegAmount {
    /// Collateral leg, already scaled to whole USDC.
    Collateral(Decimal),
    /// Outcome-token leg, shown verbatim.
    Token(String),
}

impl LegAmount {
    /// Scale iff the paired asset id is the collateral id. An unparseable
    /// collateral amount falls back to the raw string.
    pub fn from_leg(asset_id: &str, raw: &str) -> Self {
        if is_collateral(asset_id)
            && let Some(usdc) = scale_collateral(raw)
        {
            return LegAmount::Collateral(usdc);
        }
        LegAmount::Token(raw.to_string())
    }
}

impl fmt::Display for LegAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegAmount::Collateral(usdc) => write!(f, "{} USDC", format_usdc(*usdc)),
            LegAmount::Token(raw) => f.write_str(raw),
        }
    }
}

/// Format with exactly two decimals and `,` thousands grouping (`1,234.50`).
/// Midpoints round away from zero.
pub fn format_usdc(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{rounded:.2}");
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("{sign}{}.{frac_part}", group_thousands(int_part))
}

/// Scale a collateral-denominated field and format it, or return the raw string.
pub fn format_collateral_field(raw: &str) -> String {
    match scale_collateral(raw) {
        Some(usdc) => format_usdc(usdc),
        None => raw.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Default date/time rendering: `11/14/2023, 10:13:20 PM`.
pub const DEFAULT_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Compact 24h rendering used for account details: `14 Nov 2023, 22:13`.
pub const SHORT_TIME_FORMAT: &str = "%d %b %Y, %H:%M";

/// Interpret a unix-seconds string as a point in time in `tz`.
pub fn parse_unix_seconds<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let secs: i64 = raw.trim().parse().ok()?;
    let millis = secs.checked_mul(1000)?;
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(tz))
}

/// Render a unix-seconds string with `format`, or return it unchanged if it
/// is not a valid timestamp.
pub fn format_timestamp<Tz>(raw: &str, tz: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match parse_unix_seconds(raw, tz) {
        Some(dt) => dt.format(format).to_string(),
        None => raw.to_string(),
    }
}
