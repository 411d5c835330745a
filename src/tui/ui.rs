use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs};

use crate::output::{format_score, segment_widths};
use crate::scoring::{Factor, MAX_WEIGHT};
use crate::tui::app::{App, InputMode, View};

/// Width of the weights sidebar, borders included
const SIDEBAR_WIDTH: u16 = 36;

/// Cells used by a weight slider
const SLIDER_WIDTH: usize = 12;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 60 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Length(1), // Tab bar
        Constraint::Fill(1),   // Sliders + table/chart
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    let body = Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)])
        .split(chunks[2]);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    render_weights(frame, body[0], app);
    match app.current_view {
        View::Table => render_table(frame, body[1], app),
        View::Chart => render_chart(frame, body[1], app),
    }
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::UploadPath => render_upload_popup(frame, app),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Expansion Score";
    let mut spans = vec![Span::styled(
        title,
        Style::default().fg(app.theme.title_color).bold(),
    )];

    let context = format!("{} market · {} data", app.market, app.data.source);
    let padding_len = (area.width as usize).saturating_sub(title.len() + context.chars().count());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(context, Style::default().fg(app.theme.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let selected = match app.current_view {
        View::Table => 0,
        View::Chart => 1,
    };

    let tabs = Tabs::new(vec!["Table", "Chart"])
        .select(selected)
        .style(app.theme.tab_inactive_style)
        .highlight_style(app.theme.tab_active_style)
        .divider(" | ");

    frame.render_widget(tabs, area);
}

/// Sliders for every factor, with the normalized weight each one ends up as
fn render_weights(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::bordered().title(" Weights ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let normalized = app.result.as_ref().map(|r| &r.weights);
    let mut lines = Vec::new();

    for factor in Factor::ALL {
        let raw = app.raw_weights.get(factor);
        let active = factor.is_active(app.market);
        let selected = factor == app.selected_factor;

        let marker = if selected { "▶ " } else { "  " };
        let label_style = if !active {
            Style::default().fg(theme.slider_inactive)
        } else if selected {
            theme.selected
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, theme.selected),
            Span::styled(factor.label(), label_style),
        ]));

        let filled = (raw as usize * SLIDER_WIDTH + MAX_WEIGHT as usize / 2) / MAX_WEIGHT as usize;
        let filled = filled.min(SLIDER_WIDTH);
        let (filled_color, empty_color) = if active {
            (theme.factor_color(factor), theme.slider_empty)
        } else {
            (theme.slider_inactive, theme.slider_inactive)
        };

        let effective = match normalized.and_then(|w| w.get(factor)) {
            Some(weight) => format!("→ {:>3}%", weight),
            None if !active => "School only".to_string(),
            None => String::new(),
        };

        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("█".repeat(filled), Style::default().fg(filled_color)),
            Span::styled("░".repeat(SLIDER_WIDTH - filled), Style::default().fg(empty_color)),
            Span::styled(format!(" {:>3} ", raw), label_style),
            Span::styled(effective, Style::default().fg(theme.muted)),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(weights) = normalized {
        lines.push(Line::from(Span::styled(
            format!("  Effective total: {}", weights.total()),
            Style::default().fg(theme.muted),
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("  Market: ", Style::default().fg(theme.muted)),
        Span::styled(app.market.label(), theme.selected),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  Rows: ", Style::default().fg(theme.muted)),
        Span::raw(app.data.table.len().to_string()),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_table(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(result) = app.result.as_ref() else {
        render_no_result(frame, area, app);
        return;
    };

    if result.rows.is_empty() {
        let empty_msg = Paragraph::new("No countries to score").alignment(Alignment::Center);
        frame.render_widget(empty_msg, area);
        return;
    }

    let factors = result.factors();
    let precision = result.precision;

    let rows: Vec<Row> = result
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = vec![Cell::from(row.country.clone())];
            for factor in &factors {
                let value = row
                    .contribution(*factor)
                    .map(|v| format_score(v, precision))
                    .unwrap_or_default();
                cells.push(
                    Cell::from(Line::from(value).alignment(Alignment::Right))
                        .style(Style::default().fg(theme.factor_color(*factor))),
                );
            }
            cells.push(
                Cell::from(
                    Line::from(format_score(row.final_score, precision))
                        .alignment(Alignment::Right),
                )
                .style(theme.final_score),
            );

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let country_width = result
        .rows
        .iter()
        .map(|r| r.country.chars().count())
        .max()
        .unwrap_or(7)
        .max(7) as u16;

    let mut widths = vec![Constraint::Length(country_width)];
    widths.extend(factors.iter().map(|_| Constraint::Length(8)));
    widths.push(Constraint::Length(11));

    let mut header = vec![Cell::from("Country")];
    header.extend(
        factors
            .iter()
            .map(|f| Cell::from(Line::from(f.short_label()).alignment(Alignment::Right))),
    );
    header.push(Cell::from(Line::from("Final").alignment(Alignment::Right)));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(theme.header_style).bottom_margin(1))
        .block(Block::bordered().title(" Weighted contributions "));

    frame.render_widget(table, area);
}

/// Stacked bars, highest score on top, with the legend underneath
fn render_chart(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(chart) = app.chart.as_ref() else {
        render_no_result(frame, area, app);
        return;
    };

    let block = Block::bordered().title(Span::styled(
        format!(" {} ", chart.title),
        theme.popup_title,
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if chart.bars.is_empty() {
        let empty_msg = Paragraph::new("No countries to score").alignment(Alignment::Center);
        frame.render_widget(empty_msg, inner);
        return;
    }

    let name_width = chart
        .bars
        .iter()
        .map(|b| b.country.chars().count())
        .max()
        .unwrap_or(0);
    let label_width = chart
        .bars
        .iter()
        .map(|b| b.annotation.len())
        .max()
        .unwrap_or(0);
    let bar_width = (inner.width as usize).saturating_sub(name_width + label_width + 3);
    let scale_max = chart.max_total();

    let mut lines: Vec<Line> = chart
        .bars
        .iter()
        .rev()
        .map(|bar| {
            let mut spans = vec![Span::raw(format!("{:<width$} ", bar.country, width = name_width))];
            let widths = segment_widths(&bar.segments, scale_max, bar_width);
            for (segment, width) in bar.segments.iter().zip(widths) {
                if width > 0 {
                    spans.push(Span::styled(
                        "█".repeat(width),
                        Style::default().fg(theme.factor_color(segment.factor)),
                    ));
                }
            }
            spans.push(Span::raw(" "));
            spans.push(Span::styled(bar.annotation.clone(), theme.final_score));
            Line::from(spans)
        })
        .collect();

    lines.push(Line::from(""));
    let mut legend = vec![Span::raw(" ".repeat(name_width + 1))];
    for factor in &chart.legend {
        legend.push(Span::styled("■ ", Style::default().fg(theme.factor_color(*factor))));
        legend.push(Span::styled(
            format!("{}  ", factor.label()),
            Style::default().fg(theme.muted),
        ));
    }
    lines.push(Line::from(legend));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_no_result(frame: &mut Frame, area: Rect, app: &App) {
    let msg = app
        .score_error
        .clone()
        .unwrap_or_else(|| "No scores computed".to_string());
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.flash_error))
        .block(Block::bordered());
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _)) = app.flash_message {
        // Show flash message with color based on message type
        let msg_color = if msg.starts_with("Failed")
            || msg.starts_with("Error")
            || msg.starts_with("Upload rejected")
        {
            theme.flash_error
        } else if msg.starts_with("Loaded") || msg.starts_with("Exported") {
            theme.flash_success
        } else {
            theme.muted
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let count = app
            .result
            .as_ref()
            .map(|r| format!("{} countries", r.rows.len()))
            .unwrap_or_default();

        let next_view = match app.current_view {
            View::Table => ":chart ",
            View::Chart => ":table ",
        };

        // Build hints with colored shortcut keys
        let hints = [
            ("j", "/", "k", ":factor "),
            ("h", "/", "l", ":weight "),
            ("m", "", "", ":market "),
            ("Tab", "", "", next_view),
            ("u", "", "", ":upload "),
            ("e", "", "", ":export "),
            ("?", "", "", ":help "),
            ("q", "", "", ":quit"),
        ];

        let mut spans = vec![
            Span::styled(count, Style::default().fg(theme.muted)),
            Span::raw("  "),
        ];
        for (i, (key1, sep, key2, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key1, Style::default().fg(theme.status_key_color)));
            if !sep.is_empty() {
                spans.push(Span::raw(*sep));
                spans.push(Span::styled(*key2, Style::default().fg(theme.status_key_color)));
            }
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Render the upload path input popup
fn render_upload_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(60, 5, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Upload CSV ", app.theme.popup_title))
        .border_style(Style::default().fg(app.theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Input line
        Constraint::Length(1), // Help text
    ])
    .split(inner);

    let input = Paragraph::new(format!("{}|", app.path_input));
    frame.render_widget(input, chunks[0]);

    let help = Paragraph::new("Enter: load | Esc: cancel | rejected files fall back to built-in")
        .style(Style::default().fg(app.theme.muted));
    frame.render_widget(help, chunks[1]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(50, 17, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", app.theme.popup_title))
        .border_style(Style::default().fg(app.theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(app.theme.status_key_color).bold();
    let shortcuts = [
        ("j / Down      ", "Next factor"),
        ("k / Up        ", "Previous factor"),
        ("l / Right     ", "Raise weight by 1"),
        ("h / Left      ", "Lower weight by 1"),
        ("L / H         ", "Raise / lower weight by 10"),
        ("0             ", "Reset weights"),
        ("m             ", "Cycle market type"),
        ("Tab           ", "Toggle table / chart"),
        ("u             ", "Upload a CSV"),
        ("d             ", "Toggle built-in / uploaded data"),
        ("e             ", "Export scores"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut help_lines: Vec<Line> = shortcuts
        .iter()
        .map(|(keys, action)| Line::from(vec![Span::styled(*keys, key_style), Span::raw(*action)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}
