//! Plotters-powered bar and box chart widgets for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `BarChart` widget?
//! - grouped bars (one colour per series) on a shared value axis
//! - box-and-whisker glyphs from plain rectangles and paths
//! - axis + tick rendering for free
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use std::collections::BTreeMap;

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{AggregationResult, BoxSummary, GroupKey, KeyPart};

/// Series colours, high-contrast for terminals. Series `i` uses `PALETTE[i % len]`.
pub const PALETTE: [(u8, u8, u8); 6] = [
    (0, 255, 255),
    (255, 200, 0),
    (0, 255, 0),
    (255, 80, 80),
    (200, 120, 255),
    (255, 255, 255),
];

pub fn series_color(series: usize) -> (u8, u8, u8) {
    PALETTE[series % PALETTE.len()]
}

/// One drawable bar: which x slot, which series within it, how tall.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub slot: usize,
    pub series: usize,
    pub value: f64,
}

/// Grouped-bar geometry for an aggregation.
///
/// The first key part picks the x slot; the remaining parts pick the series.
/// `(hour, season)` therefore draws 24 slots with one coloured bar per season.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarLayout {
    pub slots: Vec<String>,
    /// Empty when every key has a single part.
    pub series: Vec<String>,
    pub bars: Vec<Bar>,
}

impl BarLayout {
    pub fn from_result(result: &AggregationResult) -> Self {
        let mut slots: BTreeMap<&KeyPart, usize> = BTreeMap::new();
        let mut series: BTreeMap<&[KeyPart], usize> = BTreeMap::new();
        for row in &result.rows {
            let Some((first, rest)) = row.key.parts().split_first() else {
                continue;
            };
            let n = slots.len();
            slots.entry(first).or_insert(n);
            if !rest.is_empty() {
                let n = series.len();
                series.entry(rest).or_insert(n);
            }
        }

        // Re-number in key order so slots and legend read left to right.
        renumber(&mut slots);
        renumber(&mut series);

        let bars = result
            .rows
            .iter()
            .filter_map(|row| {
                let (first, rest) = row.key.parts().split_first()?;
                Some(Bar {
                    slot: slots[first],
                    series: if rest.is_empty() { 0 } else { series[rest] },
                    value: row.value,
                })
            })
            .collect();

        Self {
            slots: slots.keys().map(|p| p.to_string()).collect(),
            series: series.keys().map(|parts| GroupKey(parts.to_vec()).to_string()).collect(),
            bars,
        }
    }

    pub fn series_count(&self) -> usize {
        self.series.len().max(1)
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }

    /// Horizontal extent of a bar in slot coordinates (slot `i` spans `i-0.5..i+0.5`).
    pub fn bar_span(&self, bar: &Bar) -> (f64, f64) {
        let width = 0.8 / self.series_count() as f64;
        let left = bar.slot as f64 - 0.4 + bar.series as f64 * width;
        (left, left + width)
    }
}

fn renumber<K: Ord>(map: &mut BTreeMap<K, usize>) {
    for (i, v) in map.values_mut().enumerate() {
        *v = i;
    }
}

fn too_small(area: Rect, buf: &mut Buffer) -> bool {
    // Plotters may fail to build a chart in a tiny area; show a hint instead.
    if area.width < 20 || area.height < 8 {
        buf.set_string(
            area.x,
            area.y,
            "Chart area too small (resize terminal).",
            Style::default().fg(Color::Yellow),
        );
        return true;
    }
    false
}

fn slot_label(slots: &[String], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 0.05 || i < 0.0 {
        return String::new();
    }
    slots.get(i as usize).cloned().unwrap_or_default()
}

fn value_label(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1000.0)
    } else {
        format!("{v:.0}")
    }
}

/// Grouped bar chart over a precomputed [`BarLayout`].
pub struct BarsChart<'a> {
    pub layout: &'a BarLayout,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for BarsChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) || self.layout.bars.is_empty() {
            return;
        }

        let x0 = -0.5;
        let x1 = self.layout.slots.len() as f64 - 0.5;
        let y1 = self.layout.max_value() * 1.05;
        if !(y1.is_finite() && y1 > 0.0) {
            return;
        }

        let layout = self.layout;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, 0.0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(layout.slots.len().min(12))
                .y_labels(5)
                .x_label_formatter(&|v| slot_label(&layout.slots, *v))
                .y_label_formatter(&|v| value_label(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            chart.draw_series(layout.bars.iter().map(|bar| {
                let (l, r) = layout.bar_span(bar);
                let (cr, cg, cb) = series_color(bar.series);
                Rectangle::new([(l, 0.0), (r, bar.value)], RGBColor(cr, cg, cb).filled())
            }))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Box-and-whisker chart, one box per group.
pub struct BoxesChart<'a> {
    pub boxes: &'a [BoxSummary],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for BoxesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) || self.boxes.is_empty() {
            return;
        }

        let lo = self.boxes.iter().map(|b| b.min).fold(f64::INFINITY, f64::min);
        let hi = self.boxes.iter().map(|b| b.max).fold(f64::NEG_INFINITY, f64::max);
        if !(lo.is_finite() && hi.is_finite()) {
            return;
        }
        let pad = ((hi - lo) * 0.05).max(1.0);
        let (y0, y1) = (lo - pad, hi + pad);
        let x1 = self.boxes.len() as f64 - 0.5;

        let boxes = self.boxes;
        let slots: Vec<String> = boxes.iter().map(|b| b.key.to_string()).collect();
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(-0.5..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(slots.len())
                .y_labels(5)
                .x_label_formatter(&|v| slot_label(&slots, *v))
                .y_label_formatter(&|v| value_label(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            for (i, b) in boxes.iter().enumerate() {
                let x = i as f64;
                let (cr, cg, cb) = series_color(i);
                let color = RGBColor(cr, cg, cb);

                chart.draw_series(std::iter::once(Rectangle::new([(x - 0.3, b.q1), (x + 0.3, b.q3)], color.filled())))?;
                chart.draw_series([
                    PathElement::new(vec![(x, b.lower_whisker), (x, b.q1)], &WHITE),
                    PathElement::new(vec![(x, b.q3), (x, b.upper_whisker)], &WHITE),
                    PathElement::new(vec![(x - 0.15, b.lower_whisker), (x + 0.15, b.lower_whisker)], &WHITE),
                    PathElement::new(vec![(x - 0.15, b.upper_whisker), (x + 0.15, b.upper_whisker)], &WHITE),
                    PathElement::new(vec![(x - 0.3, b.median), (x + 0.3, b.median)], &BLACK),
                ])?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, GroupRow, Statistic};

    fn row(parts: Vec<KeyPart>, value: f64) -> GroupRow {
        GroupRow {
            key: GroupKey(parts),
            count: 1,
            sum: value as u64,
            value,
        }
    }

    #[test]
    fn first_key_part_picks_the_slot_and_the_rest_the_series() {
        let spring = KeyPart::Category(Category::new(1, "Spring"));
        let fall = KeyPart::Category(Category::new(3, "Fall"));
        let result = AggregationResult {
            statistic: Statistic::Mean,
            rows: vec![
                row(vec![KeyPart::Hour(7), spring.clone()], 10.0),
                row(vec![KeyPart::Hour(7), fall.clone()], 20.0),
                row(vec![KeyPart::Hour(8), fall], 30.0),
            ],
        };
        let layout = BarLayout::from_result(&result);

        assert_eq!(layout.slots, ["07", "08"]);
        assert_eq!(layout.series, ["Spring", "Fall"]);
        assert_eq!(
            layout.bars,
            vec![
                Bar { slot: 0, series: 0, value: 10.0 },
                Bar { slot: 0, series: 1, value: 20.0 },
                Bar { slot: 1, series: 1, value: 30.0 },
            ]
        );
        assert_eq!(layout.max_value(), 30.0);
    }

    #[test]
    fn single_part_keys_have_no_series() {
        let result = AggregationResult {
            statistic: Statistic::Sum,
            rows: vec![row(vec![KeyPart::Hour(1)], 5.0), row(vec![KeyPart::Hour(2)], 6.0)],
        };
        let layout = BarLayout::from_result(&result);
        assert!(layout.series.is_empty());
        assert_eq!(layout.series_count(), 1);

        let (l, r) = layout.bar_span(&layout.bars[1]);
        assert!((l - 0.6).abs() < 1e-12);
        assert!((r - 1.4).abs() < 1e-12);
    }

    #[test]
    fn slot_labels_only_at_whole_positions() {
        let slots = vec!["a".to_string(), "b".to_string()];
        assert_eq!(slot_label(&slots, 1.0), "b");
        assert_eq!(slot_label(&slots, 0.5), "");
        assert_eq!(slot_label(&slots, 2.0), "");
        assert_eq!(value_label(12_000.0), "12k");
    }
}
