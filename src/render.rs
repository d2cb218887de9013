//! Terminal presentation of page states: detail lines, a text chart, and a table.

use std::fmt::Write;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::pages::{Bar, Chart, PageView};
use crate::pipeline::PageState;
use crate::transform::{SeriesPoint, Slice, percentages};

/// Width in characters of the longest chart bar.
const CHART_WIDTH: usize = 40;

pub fn page<R: Tabled>(state: &PageState<R>) -> String {
    match state {
        PageState::Loading { title } => format!("{title}\nLoading...\n"),
        PageState::Failed { title, message } => format!("{title}\n{message}\n"),
        PageState::Ready(view) => ready(view),
    }
}

fn ready<R: Tabled>(view: &PageView<R>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "{}", "=".repeat(view.title.chars().count()));

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{notice}");
    }

    if !view.details.is_empty() {
        let width = view
            .details
            .iter()
            .map(|d| d.label.len() + 1)
            .max()
            .unwrap_or(0);
        for d in &view.details {
            let label = format!("{}:", d.label);
            let _ = writeln!(out, "{label:<width$}  {}", d.value);
        }
        out.push('\n');
    }

    if let Some(c) = &view.chart {
        out.push_str(&chart(c));
        out.push('\n');
    }

    if !view.rows.is_empty() {
        let mut table = Table::new(&view.rows);
        table.with(Style::sharp());
        let _ = writeln!(out, "{table}");
    }
    out
}

pub fn chart(chart: &Chart) -> String {
    match chart {
        Chart::Line {
            title,
            x_label,
            y_label,
            points,
        } => line(title, x_label, y_label, points),
        Chart::Bar {
            title,
            y_label,
            bars,
        } => bar(title, y_label, bars),
        Chart::Donut { title, slices } => donut(title, slices),
    }
}

fn line(title: &str, x_label: &str, y_label: &str, points: &[SeriesPoint]) -> String {
    let mut out = format!("{title} ({y_label} by {x_label})\n");
    if points.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    let max = max_abs(points.iter().map(|p| p.y));
    let labels: Vec<String> = points.iter().map(|p| format!("{:.0}", p.x)).collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);
    for (label, p) in labels.iter().zip(points) {
        let _ = writeln!(
            out,
            "  {label:>label_width$} │{} {:.2}",
            bar_glyphs(p.y, max),
            p.y
        );
    }
    out
}

fn bar(title: &str, y_label: &str, bars: &[Bar]) -> String {
    let mut out = format!("{title} ({y_label})\n");
    if bars.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    let max = max_abs(bars.iter().map(|b| b.value));
    let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    for b in bars {
        let sign = if b.value < 0.0 { "-" } else { "+" };
        let _ = writeln!(
            out,
            "  {:<label_width$} {sign}│{} {:.2}",
            b.label,
            bar_glyphs(b.value, max),
            b.value
        );
    }
    out
}

fn donut(title: &str, slices: &[Slice]) -> String {
    let mut out = format!("{title}\n");
    if slices.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    let max = max_abs(slices.iter().map(|s| s.value));
    let label_width = slices.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    let bar_width = CHART_WIDTH;
    for (s, pct) in slices.iter().zip(percentages(slices)) {
        let _ = writeln!(
            out,
            "  {:<label_width$} │{:<bar_width$} {:>6.2}%  {:.2}",
            s.label,
            bar_glyphs(s.value, max),
            pct,
            s.value
        );
    }
    out
}

fn max_abs(values: impl Iterator<Item = f64>) -> f64 {
    values.map(f64::abs).fold(0.0, f64::max)
}

fn bar_glyphs(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = (value.abs() / max * CHART_WIDTH as f64).round() as usize;
    "█".repeat(len.min(CHART_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::Detail;
    use crate::pipeline::LOAD_ERROR_MESSAGE;
    use crate::transform::ProfitSign;

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Name")]
        name: &'static str,
        #[tabled(rename = "Amount")]
        amount: &'static str,
    }

    #[test]
    fn failed_page_shows_only_message() {
        let state: PageState<Row> = PageState::Failed {
            title: "Payout Redemptions",
            message: LOAD_ERROR_MESSAGE,
        };
        assert_eq!(page(&state), "Payout Redemptions\nError loading data.\n");
    }

    #[test]
    fn loading_page() {
        let state: PageState<Row> = PageState::Loading { title: "User Positions" };
        assert!(page(&state).contains("Loading..."));
    }

    #[test]
    fn ready_page_has_details_chart_and_table() {
        let view = PageView {
            title: "Polymarket Account",
            notice: None,
            details: vec![Detail {
                label: "Profit in USDC",
                value: "-1.50".to_string(),
            }],
            rows: vec![Row {
                name: "market-1",
                amount: "2.50 USDC",
            }],
            chart: Some(Chart::Bar {
                title: "Market Position Magnitudes",
                y_label: "Profit in USDC",
                bars: vec![Bar {
                    label: "market-1".to_string(),
                    value: 2.5,
                    sign: ProfitSign::Gain,
                }],
            }),
        };
        let out = page(&PageState::Ready(view));
        assert!(out.starts_with("Polymarket Account\n"));
        assert!(out.contains("Profit in USDC:  -1.50"));
        assert!(out.contains("Market Position Magnitudes"));
        assert!(out.contains("2.50 USDC"));
        assert!(out.contains("market-1"));
        assert!(out.contains(&"█".repeat(CHART_WIDTH)));
    }

    #[test]
    fn empty_rows_render_no_table() {
        let view: PageView<Row> = PageView {
            title: "Polymarket Account",
            notice: Some("No account found for 0xdead".to_string()),
            details: Vec::new(),
            rows: Vec::new(),
            chart: None,
        };
        let out = page(&PageState::Ready(view));
        assert!(out.contains("No account found for 0xdead"));
        assert!(!out.contains("Name"));
    }

    #[test]
    fn donut_shows_percentages() {
        let out = chart(&Chart::Donut {
            title: "Largest Positions",
            slices: vec![
                Slice {
                    label: "a".to_string(),
                    value: 75.0,
                },
                Slice {
                    label: "Others".to_string(),
                    value: 25.0,
                },
            ],
        });
        assert!(out.contains("75.00%"));
        assert!(out.contains("25.00%"));
        assert!(out.contains("Others"));
    }

    #[test]
    fn line_scales_bars_to_largest_value() {
        let out = chart(&Chart::Line {
            title: "Payout Amount",
            x_label: "Block Number",
            y_label: "Payout Amount",
            points: vec![SeriesPoint { x: 1.0, y: 10.0 }, SeriesPoint { x: 2.0, y: 5.0 }],
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].matches('█').count(), CHART_WIDTH);
        assert_eq!(lines[2].matches('█').count(), CHART_WIDTH / 2);
    }

    #[test]
    fn empty_chart_says_no_data() {
        let out = chart(&Chart::Line {
            title: "USDC Volume per Fill",
            x_label: "Block Timestamp",
            y_label: "USDC",
            points: Vec::new(),
        });
        assert!(out.contains("(no data)"));
    }
}
