//! Terminal colours. Styles are plain unless colour output is enabled, so
//! piped output carries no escape codes.

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub ok: Style,
    pub failure: Style,
    pub caution: Style,
    pub label: Style,
    pub faint: Style,
    /// Fill of chart bars
    pub bar: Style,
}

impl Theme {
    pub fn for_terminal(colored: bool) -> Self {
        if !colored {
            let plain = Style::new();
            return Self {
                title: plain.clone(),
                ok: plain.clone(),
                failure: plain.clone(),
                caution: plain.clone(),
                label: plain.clone(),
                faint: plain.clone(),
                bar: plain,
            };
        }

        Self {
            title: Style::new().yellow().bold(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            caution: Style::new().yellow(),
            label: Style::new().cyan(),
            faint: Style::new().dimmed(),
            bar: Style::new().bright_red(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(|| Theme::for_terminal(console::colors_enabled()))
}
