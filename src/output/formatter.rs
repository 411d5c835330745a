use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use super::chart::factor_ansi_color;
use crate::scoring::{NormalizedWeights, ScoreResult};

/// Width assumed when stdout is not a terminal
const FALLBACK_WIDTH: usize = 100;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Terminal width, or a fixed width for pipes
pub fn output_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(FALLBACK_WIDTH)
}

/// Format a score at a fixed number of decimal places
pub fn format_score(score: f64, precision: u32) -> String {
    format!("{:.*}", precision as usize, score)
}

/// One-line summary of the normalized weights, e.g.
/// "Market Size 33 · Tariff & Shipping 22 · ... (total 99)"
pub fn format_weights(weights: &NormalizedWeights, use_colors: bool) -> String {
    let parts: Vec<String> = weights
        .iter()
        .map(|(factor, weight)| {
            if use_colors {
                format!("{} {}", factor.label().color(factor_ansi_color(factor)), weight.bold())
            } else {
                format!("{} {}", factor.label(), weight)
            }
        })
        .collect();
    format!("{} (total {})", parts.join(" · "), weights.total())
}

/// Format the breakdown as an aligned table: Country, one column per
/// active factor, Final Score. Rows stay in result order.
pub fn format_breakdown_table(result: &ScoreResult, use_colors: bool) -> String {
    if result.rows.is_empty() {
        return "No countries to score.".to_string();
    }

    let factors = result.factors();
    let precision = result.precision;

    let mut headers: Vec<String> = vec!["Country".to_string()];
    headers.extend(factors.iter().map(|f| f.label().to_string()));
    headers.push("Final Score".to_string());

    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            let mut line = vec![row.country.clone()];
            line.extend(factors.iter().map(|f| {
                row.contribution(*f)
                    .map(|v| format_score(v, precision))
                    .unwrap_or_default()
            }));
            line.push(format_score(row.final_score, precision));
            line
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|i| {
            cells
                .iter()
                .map(|c| c[i].chars().count())
                .chain(std::iter::once(headers[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let last = headers.len() - 1;
    let render = |values: &[String]| -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if i == 0 {
                    format!("{:<w$}", v, w = widths[i])
                } else {
                    format!("{:>w$}", v, w = widths[i])
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(cells.len() + 2);
    let header_line = render(&headers);
    if use_colors {
        lines.push(header_line.bold().to_string());
    } else {
        lines.push(header_line);
    }
    lines.push("-".repeat(widths.iter().sum::<usize>() + 2 * last));

    for row in &cells {
        let line = render(row);
        if use_colors {
            // Emphasize the final score column
            let split = line.len() - widths[last];
            let (head, tail) = line.split_at(split);
            lines.push(format!("{}{}", head, tail.bold()));
        } else {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Format the breakdown as tab-separated values for scripting.
/// First line is a header; no colors.
pub fn format_tsv(result: &ScoreResult) -> String {
    let factors = result.factors();
    let mut header = vec!["Country".to_string()];
    header.extend(factors.iter().map(|f| f.label().to_string()));
    header.push("Final Score".to_string());

    let mut lines = vec![header.join("\t")];
    for row in &result.rows {
        let mut fields = vec![row.country.clone()];
        fields.extend(factors.iter().map(|f| {
            row.contribution(*f)
                .map(|v| format_score(v, result.precision))
                .unwrap_or_default()
        }));
        fields.push(format_score(row.final_score, result.precision));
        lines.push(fields.join("\t"));
    }
    lines.join("\n")
}
