//! Formatted terminal output: ingest summaries, result tables, full pages.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::dashboard::{ChartData, ChartView, Page, PageView};
use crate::domain::{AggregationResult, BoxSummary, Statistic};
use crate::io::ingest::IngestReport;
use crate::plot::render_chart;

/// Format the dataset load summary.
pub fn format_ingest_summary(reports: &[IngestReport]) -> String {
    let mut out = String::new();
    out.push_str("=== bikes - Bike Sharing Dashboard ===\n");
    for r in reports {
        out.push_str(&format!(
            "{:<7} {} | rows read={} used={} skipped={}\n",
            r.granularity.display_name(),
            r.source.display(),
            r.rows_read,
            r.rows_used,
            r.row_errors.len(),
        ));
        for e in r.row_errors.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
        if r.row_errors.len() > 5 {
            out.push_str(&format!("  ... {} more\n", r.row_errors.len() - 5));
        }
    }
    out
}

/// Format a page: header, then each chart as a table plus an ASCII chart.
pub fn format_page(view: &PageView, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("## {}\n", view.title));
    out.push_str(&format!("{}\n\n", view.question));
    for chart in &view.charts {
        out.push_str(&format_chart(chart, width));
        out.push('\n');
    }
    out
}

/// Format one chart: title, table, ASCII rendering.
pub fn format_chart(chart: &ChartView, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("### {} [{}]\n", chart.title, chart.id));
    out.push_str(&format!("x: {} | y: {}\n", chart.x_label, chart.y_label));
    match &chart.data {
        ChartData::Bars(result) => out.push_str(&format_table(result)),
        ChartData::Boxes(boxes) => out.push_str(&format_box_table(boxes)),
    }
    out.push('\n');
    out.push_str(&render_chart(chart, width));
    out
}

/// Format an aggregation as a `group / rows / sum / statistic` table.
pub fn format_table(result: &AggregationResult) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:>8} {:>12} {:>12}\n",
            "group",
            "rows",
            "sum",
            result.statistic.display_name()
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<8} {:-<12} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');

    for r in &result.rows {
        out.push_str(
            format!(
                "{:<28} {:>8} {:>12} {:>12}",
                truncate(&r.key.to_string(), 28),
                r.count,
                r.sum,
                fmt_statistic(r.value, result.statistic),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format box summaries as a five-number table.
pub fn format_box_table(boxes: &[BoxSummary]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>9}\n",
        "group", "n", "min", "q1", "median", "q3", "max", "outliers"
    ));
    for b in boxes {
        out.push_str(&format!(
            "{:<16} {:>6} {:>8.0} {:>8.1} {:>8.1} {:>8.1} {:>8.0} {:>9}\n",
            truncate(&b.key.to_string(), 16),
            b.count,
            b.min,
            b.q1,
            b.median,
            b.q3,
            b.max,
            b.outliers,
        ));
    }
    out
}

/// List pages with their CLI names and questions.
pub fn format_page_list() -> String {
    let mut out = String::new();
    for page in Page::ALL {
        out.push_str(&format!("{:<20} {}\n", page_arg(page), page.title()));
        out.push_str(&format!("{:<20} {}\n", "", page.question()));
    }
    out
}

/// The CLI spelling of a page (`--page <name>`).
pub fn page_arg(page: Page) -> String {
    use clap::ValueEnum;
    page.to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_else(|| page.title().to_string())
}

/// Format a statistic value: means keep one decimal, totals and counts none.
pub fn fmt_statistic(value: f64, statistic: Statistic) -> String {
    match statistic {
        Statistic::Mean => format!("{value:.1}"),
        Statistic::Sum | Statistic::Count => format!("{value:.0}"),
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, GroupKey, GroupRow, KeyPart};

    fn season_row(code: i64, label: &str, count: usize, sum: u64) -> GroupRow {
        GroupRow {
            key: GroupKey::single(KeyPart::Category(Category::new(code, label))),
            count,
            sum,
            value: sum as f64,
        }
    }

    #[test]
    fn table_lists_every_group() {
        let result = AggregationResult {
            statistic: Statistic::Sum,
            rows: vec![season_row(1, "Spring", 181, 471348), season_row(2, "Summer", 184, 918589)],
        };
        let txt = format_table(&result);
        let lines: Vec<&str> = txt.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("group"));
        assert!(lines[0].ends_with("total"));
        assert!(lines[2].starts_with("Spring"));
        assert!(lines[2].ends_with("471348"));
        assert!(lines[3].contains("918589"));
    }

    #[test]
    fn statistic_formatting() {
        assert_eq!(fmt_statistic(15.04, Statistic::Mean), "15.0");
        assert_eq!(fmt_statistic(1200.0, Statistic::Sum), "1200");
        assert_eq!(fmt_statistic(3.0, Statistic::Count), "3");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Non-Holiday", 20), "Non-Holiday");
        assert_eq!(truncate("Non-Holiday", 5), "Non-.");
    }

    #[test]
    fn page_args_are_kebab_case() {
        assert_eq!(page_arg(Page::RushHourFactors), "rush-hour-factors");
    }
}
