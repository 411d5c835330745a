//! Stacked horizontal bar chart model.
//!
//! Turns a [`ScoreResult`] into what a chart renderer needs: one bar per
//! country, one segment per active factor, a label with the final score, and
//! bars sorted ascending. Both the text renderer and the dashboard draw from
//! this model.

use owo_colors::{AnsiColors, OwoColorize};
use serde::Serialize;
use std::cmp::Ordering;

use crate::scoring::{Factor, ScoreResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    #[serde(serialize_with = "serialize_factor")]
    pub factor: Factor,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub country: String,
    pub segments: Vec<Segment>,
    pub total: f64,
    /// Final score as displayed, at the result's precision
    pub annotation: String,
}

/// Long-form row: one per (country, factor)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongFormRow {
    pub country: String,
    #[serde(serialize_with = "serialize_factor")]
    pub factor: Factor,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBarChart {
    pub title: String,
    #[serde(serialize_with = "serialize_factors")]
    pub legend: Vec<Factor>,
    /// Ascending by total; ties ordered by country name
    pub bars: Vec<Bar>,
}

impl StackedBarChart {
    pub fn from_result(result: &ScoreResult) -> Self {
        let mut bars: Vec<Bar> = result
            .rows
            .iter()
            .map(|row| Bar {
                country: row.country.clone(),
                segments: row
                    .contributions
                    .iter()
                    .map(|c| Segment {
                        factor: c.factor,
                        value: c.contribution,
                    })
                    .collect(),
                total: row.final_score,
                annotation: format!("{:.*}", result.precision as usize, row.final_score),
            })
            .collect();

        bars.sort_by(|a, b| {
            a.total
                .partial_cmp(&b.total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.country.cmp(&b.country))
        });

        Self {
            title: format!("Final Expansion Scores ({} market)", result.market),
            legend: result.factors(),
            bars,
        }
    }

    pub fn long_form(&self) -> Vec<LongFormRow> {
        self.bars
            .iter()
            .flat_map(|bar| {
                bar.segments.iter().map(|s| LongFormRow {
                    country: bar.country.clone(),
                    factor: s.factor,
                    score: s.value,
                })
            })
            .collect()
    }

    pub fn max_total(&self) -> f64 {
        self.bars.iter().map(|b| b.total).fold(0.0_f64, f64::max)
    }
}

/// Character widths for each segment of a bar, scaled so `scale_max` fills
/// `width` cells.
///
/// Widths come from rounded cumulative offsets, so the drawn bar length
/// tracks the total rather than the sum of individually rounded segments.
pub fn segment_widths(segments: &[Segment], scale_max: f64, width: usize) -> Vec<usize> {
    if scale_max <= 0.0 || width == 0 {
        return vec![0; segments.len()];
    }

    let mut widths = Vec::with_capacity(segments.len());
    let mut cumulative = 0.0;
    let mut drawn = 0;
    for segment in segments {
        cumulative += segment.value.max(0.0);
        let end = ((cumulative / scale_max) * width as f64).round() as usize;
        let end = end.min(width);
        widths.push(end.saturating_sub(drawn));
        drawn = drawn.max(end);
    }
    widths
}

/// Terminal color for a factor's segment in plain-text output
pub fn factor_ansi_color(factor: Factor) -> AnsiColors {
    match factor {
        Factor::MarketSize => AnsiColors::Blue,
        Factor::TariffShipping => AnsiColors::Cyan,
        Factor::Willingness => AnsiColors::Green,
        Factor::SustainabilityCustomization => AnsiColors::Magenta,
        Factor::Seasonality => AnsiColors::Yellow,
    }
}

/// Fill character per factor so segments stay distinguishable without color
fn factor_glyph(factor: Factor, use_colors: bool) -> char {
    if use_colors {
        return '█';
    }
    match factor {
        Factor::MarketSize => '#',
        Factor::TariffShipping => '=',
        Factor::Willingness => '%',
        Factor::SustainabilityCustomization => '+',
        Factor::Seasonality => '~',
    }
}

/// Render the chart as text, highest score on top (the ascending order read
/// bottom to top).
pub fn render_text(chart: &StackedBarChart, width: usize, use_colors: bool) -> String {
    if chart.bars.is_empty() {
        return "No countries to chart.".to_string();
    }

    let label_width = chart
        .bars
        .iter()
        .map(|b| b.country.chars().count())
        .max()
        .unwrap_or(0);
    let annotation_width = chart
        .bars
        .iter()
        .map(|b| b.annotation.len())
        .max()
        .unwrap_or(0);
    // label + " | " + bar + " " + annotation
    let bar_width = width
        .saturating_sub(label_width + 3 + 1 + annotation_width)
        .max(10);
    let max_total = chart.max_total();

    let mut lines = vec![chart.title.clone()];
    for bar in chart.bars.iter().rev() {
        let widths = segment_widths(&bar.segments, max_total, bar_width);
        let mut line = format!("{:>w$} | ", bar.country, w = label_width);
        for (segment, cells) in bar.segments.iter().zip(widths) {
            let fill = factor_glyph(segment.factor, use_colors)
                .to_string()
                .repeat(cells);
            if use_colors {
                line.push_str(&fill.color(factor_ansi_color(segment.factor)).to_string());
            } else {
                line.push_str(&fill);
            }
        }
        line.push(' ');
        line.push_str(&bar.annotation);
        lines.push(line);
    }

    let legend: Vec<String> = chart
        .legend
        .iter()
        .map(|f| {
            let key = factor_glyph(*f, use_colors).to_string().repeat(2);
            if use_colors {
                format!("{} {}", key.color(factor_ansi_color(*f)), f.label())
            } else {
                format!("{} {}", key, f.label())
            }
        })
        .collect();
    lines.push(String::new());
    lines.push(legend.join("  "));

    lines.join("\n")
}

fn serialize_factor<S: serde::Serializer>(factor: &Factor, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(factor.label())
}

fn serialize_factors<S: serde::Serializer>(factors: &[Factor], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(factors.iter().map(|f| f.label()))
}
