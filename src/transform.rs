use std::cmp::Ordering;

use serde::Serialize;

use crate::types::TradeLegs;
use crate::units::{is_collateral, scale_collateral_f64};

/// Label of the synthetic slice collecting everything past the top N.
pub const OTHERS_LABEL: &str = "Others";

/// Number of individually labelled slices in a top-N breakdown.
pub const TOP_N: usize = 5;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Selected sort column and direction of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortState<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Apply a column-header click: the same column flips direction, a new
    /// column starts descending.
    pub fn select(&mut self, key: K) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Descending;
        }
    }
}

/// A record with numeric-looking columns selectable as sort keys.
pub trait Sortable {
    type Key: Copy + PartialEq;

    /// Raw string value of `key` on this record.
    fn sort_field(&self, key: Self::Key) -> &str;
}

/// Stable sort of `rows` by the selected column, values parsed as floats.
pub fn sort_rows<T: Sortable>(rows: &mut [T], state: &SortState<T::Key>) {
    rows.sort_by(|a, b| {
        let av = parse_float(a.sort_field(state.key));
        let bv = parse_float(b.sort_field(state.key));
        compare_floats(av, bv, state.direction)
    });
}

/// Total order over parsed keys; NaN sorts after every number in both directions.
fn compare_floats(a: f64, b: f64, direction: SortDirection) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Ascending => a.total_cmp(&b),
            SortDirection::Descending => b.total_cmp(&a),
        },
    }
}

/// Parse the longest leading decimal number of `s` (`"12.5abc"` → 12.5,
/// `"0x1f"` → 0). Returns NaN when there is no numeric prefix.
pub fn parse_float(s: &str) -> f64 {
    let s = s.trim_start();
    if let Ok(v) = s.parse::<f64>() {
        return v;
    }
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut has_digits = end > int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        } else if has_digits {
            end += 1;
        }
    }
    if !has_digits {
        return f64::NAN;
    }
    s[..end].trim_end_matches('.').parse().unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Top-N breakdown
// ---------------------------------------------------------------------------

/// One labelled value of a breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

/// Rank slices by value (descending, stable), keep the first `n`, and fold
/// the rest into a single [`OTHERS_LABEL`] slice when their sum is positive.
pub fn top_n_with_others(mut slices: Vec<Slice>, n: usize) -> Vec<Slice> {
    slices.sort_by(|a, b| b.value.total_cmp(&a.value));
    if slices.len() <= n {
        return slices;
    }
    let rest = slices.split_off(n);
    let others: f64 = rest.iter().map(|s| s.value).sum();
    if others > 0.0 {
        slices.push(Slice {
            label: OTHERS_LABEL.to_string(),
            value: others,
        });
    }
    slices
}

/// Percentage of the total carried by each slice. All zeros if the total is not positive.
pub fn percentages(slices: &[Slice]) -> Vec<f64> {
    let total: f64 = slices.iter().map(|s| s.value).sum();
    if total <= 0.0 {
        return vec![0.0; slices.len()];
    }
    slices.iter().map(|s| s.value / total * 100.0).collect()
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// One point of an x/y chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

/// USDC traded per record over time.
///
/// Keeps records where either leg is collateral and maps each to
/// `(block timestamp, scaled collateral amount)`, ascending by timestamp.
/// When both legs are collateral the maker leg wins. Records with an
/// unparseable timestamp are dropped.
pub fn collateral_volume_series<T: TradeLegs>(records: &[T]) -> Vec<SeriesPoint> {
    let mut points: Vec<(i64, f64)> = records
        .iter()
        .filter_map(|r| {
            let (maker_asset, maker_amount) = r.maker_leg();
            let (taker_asset, taker_amount) = r.taker_leg();
            let amount = if is_collateral(maker_asset) {
                maker_amount
            } else if is_collateral(taker_asset) {
                taker_amount
            } else {
                return None;
            };
            let ts: i64 = r.block_timestamp().trim().parse().ok()?;
            Some((ts, scale_collateral_f64(amount)))
        })
        .collect();
    points.sort_by_key(|(ts, _)| *ts);
    points
        .into_iter()
        .map(|(ts, y)| SeriesPoint { x: ts as f64, y })
        .collect()
}

/// Pair an integer x (block number, timestamp) with a collateral-scaled y,
/// ascending by x. Entries whose x does not parse are dropped.
pub fn scaled_series<'a, I>(entries: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut points: Vec<(i64, f64)> = entries
        .into_iter()
        .filter_map(|(x, raw)| {
            let x: i64 = x.trim().parse().ok()?;
            Some((x, scale_collateral_f64(raw)))
        })
        .collect();
    points.sort_by_key(|(x, _)| *x);
    points
        .into_iter()
        .map(|(x, y)| SeriesPoint { x: x as f64, y })
        .collect()
}

/// Sign classification of a profit figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitSign {
    Gain,
    Loss,
    Flat,
}

impl ProfitSign {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            ProfitSign::Gain
        } else if value < 0.0 {
            ProfitSign::Loss
        } else {
            ProfitSign::Flat
        }
    }
}
