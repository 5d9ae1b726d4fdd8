use protocol::RiskLevel;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

use super::format::ProbabilityBand;

#[derive(Clone, Copy)]
pub(crate) enum ValueStyle {
    Normal,
    Important,
    Dim,
}

pub(crate) struct Theme {
    border: Color,
    focus_border: Color,
    title: Color,
    text: Color,
    dim: Color,
    accent: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    warn: Color,
    ok: Color,
    error: Color,
    alert: Color,
}

impl Theme {
    pub(crate) fn dark() -> Self {
        Self {
            border: Color::DarkGray,
            focus_border: Color::Blue,
            title: Color::Blue,
            text: Color::White,
            dim: Color::Gray,
            accent: Color::Cyan,
            highlight_fg: Color::White,
            highlight_bg: Color::Blue,
            warn: Color::Yellow,
            ok: Color::Green,
            error: Color::Red,
            alert: Color::LightRed,
        }
    }

    pub(crate) fn block<'a>(&self, title: &'a str) -> Block<'a> {
        Block::default()
            .title(Span::styled(title, self.title_style()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border))
    }

    pub(crate) fn input_block<'a>(&self, title: &'a str, focused: bool) -> Block<'a> {
        let border = if focused {
            self.focus_border
        } else {
            self.border
        };
        self.block(title).border_style(Style::default().fg(border))
    }

    pub(crate) fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn help_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn warn_style(&self) -> Style {
        Style::default().fg(self.warn).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn ok_style(&self) -> Style {
        Style::default().fg(self.ok).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub(crate) fn key_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(crate) fn value_style(&self, level: ValueStyle) -> Style {
        match level {
            ValueStyle::Normal => Style::default().fg(self.text),
            ValueStyle::Important => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD),
            ValueStyle::Dim => Style::default().fg(self.dim),
        }
    }

    pub(crate) fn risk_style(&self, level: RiskLevel) -> Style {
        let color = match level {
            RiskLevel::Critical => self.error,
            RiskLevel::High => self.alert,
            RiskLevel::Medium => self.warn,
            RiskLevel::Low => self.ok,
        };
        Style::default()
            .fg(Color::Black)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn band_style(&self, band: ProbabilityBand) -> Style {
        let color = match band {
            ProbabilityBand::Severe => self.error,
            ProbabilityBand::Elevated => self.alert,
            ProbabilityBand::Low => self.ok,
        };
        Style::default().fg(color)
    }
}
