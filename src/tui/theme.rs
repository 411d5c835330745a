//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::config::ThemePreference;
use crate::scoring::Factor;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Factor segment colors, in Factor::ALL order
    pub factor_colors: [Color; 5],

    // Slider colors
    pub slider_empty: Color,
    pub slider_inactive: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub header_style: Style,
    pub final_score: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub selected: Style,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            factor_colors: [
                Color::Blue,
                Color::Cyan,
                Color::Green,
                Color::Magenta,
                Color::Yellow,
            ],
            slider_empty: Color::DarkGray,
            slider_inactive: Color::Indexed(238),
            row_alt_bg: Color::Indexed(235),
            header_style: Style::new().bold(),
            final_score: Style::new().fg(Color::White).bold(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            selected: Style::new().fg(Color::Cyan).bold(),
            tab_active_style: Style::new().fg(Color::Cyan).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    pub fn light() -> Self {
        Self {
            factor_colors: [
                Color::Rgb(31, 96, 196),
                Color::Rgb(0, 128, 128),
                Color::Rgb(46, 125, 50),
                Color::Rgb(142, 36, 170),
                Color::Rgb(191, 128, 0),
            ],
            slider_empty: Color::Indexed(250),
            slider_inactive: Color::Indexed(253),
            row_alt_bg: Color::Indexed(255),
            header_style: Style::new().bold(),
            final_score: Style::new().fg(Color::Black).bold(),
            muted: Color::Indexed(243),
            title_color: Color::Blue,
            selected: Style::new().fg(Color::Blue).bold(),
            tab_active_style: Style::new().fg(Color::Blue).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::Indexed(245)),
            status_bar_bg: Color::Indexed(254),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(46, 125, 50),
            flash_error: Color::Red,
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
        }
    }

    pub fn factor_color(&self, factor: Factor) -> Color {
        let idx = Factor::ALL.iter().position(|f| *f == factor).unwrap_or(0);
        self.factor_colors.get(idx).copied().unwrap_or(Color::White)
    }
}

/// Pick a palette. `Auto` asks the terminal for its background luminance and
/// falls back to dark when the terminal does not answer.
pub fn resolve_theme(preference: ThemePreference) -> ThemeColors {
    match preference {
        ThemePreference::Dark => ThemeColors::dark(),
        ThemePreference::Light => ThemeColors::light(),
        ThemePreference::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => ThemeColors::light(),
            _ => ThemeColors::dark(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_colors_distinct() {
        for theme in [ThemeColors::dark(), ThemeColors::light()] {
            let mut colors: Vec<String> = Factor::ALL
                .iter()
                .map(|f| format!("{:?}", theme.factor_color(*f)))
                .collect();
            colors.sort();
            colors.dedup();
            assert_eq!(colors.len(), Factor::ALL.len());
        }
    }

    #[test]
    fn test_explicit_preference() {
        assert_eq!(resolve_theme(ThemePreference::Light).title_color, Color::Blue);
        assert_eq!(resolve_theme(ThemePreference::Dark).title_color, Color::Cyan);
    }
}
