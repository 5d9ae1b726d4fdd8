use protocol::{ChatMessage, ChatRole, GuidelinePoint, PredictionResult};
use ratatui::text::{Line, Span, Text};
use std::time::SystemTime;

use super::text::{sanitize_text_for_tui, wrap_text_lines};
use super::theme::{Theme, ValueStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ProbabilityBand {
    Low,
    Elevated,
    Severe,
}

pub(super) fn probability_band(probability: f64) -> ProbabilityBand {
    if probability > 75.0 {
        ProbabilityBand::Severe
    } else if probability > 50.0 {
        ProbabilityBand::Elevated
    } else {
        ProbabilityBand::Low
    }
}

pub(super) fn format_probability(probability: f64) -> String {
    if probability.fract() == 0.0 {
        format!("{probability:.0}%")
    } else {
        format!("{probability:.1}%")
    }
}

pub(super) fn format_clock(time: SystemTime) -> String {
    let stamp = humantime::format_rfc3339_seconds(time).to_string();
    stamp.get(11..19).unwrap_or_default().to_string()
}

pub(super) fn format_factors(theme: &Theme, result: &PredictionResult, width: u16) -> Text<'static> {
    let mut lines = Vec::new();
    for factor in &result.factors {
        lines.extend(bullet_lines(theme, &sanitize_text_for_tui(factor), width));
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "no factors reported",
            theme.value_style(ValueStyle::Dim),
        ));
    }
    Text::from(lines)
}

fn bullet_lines(theme: &Theme, text: &str, width: u16) -> Vec<Line<'static>> {
    let width = (width.max(3) as usize).saturating_sub(2);
    wrap_text_lines(text, width)
        .into_iter()
        .enumerate()
        .map(|(idx, segment)| {
            let marker = if idx == 0 { "• " } else { "  " };
            Line::from(vec![
                Span::styled(marker, theme.accent_style()),
                Span::styled(segment, theme.value_style(ValueStyle::Normal)),
            ])
        })
        .collect()
}

pub(super) fn format_message(theme: &Theme, message: &ChatMessage, width: u16) -> Vec<Line<'static>> {
    let (speaker, speaker_style) = match message.role {
        ChatRole::User => ("You", theme.accent_style()),
        ChatRole::Assistant => ("SIH Consultant", theme.title_style()),
    };
    let body_style = if message.is_error {
        theme.error_style()
    } else {
        theme.value_style(ValueStyle::Normal)
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(speaker, speaker_style),
        Span::styled(
            format!("  {}", format_clock(message.timestamp)),
            theme.value_style(ValueStyle::Dim),
        ),
    ])];
    let text = sanitize_text_for_tui(&message.text);
    for segment in wrap_text_lines(&text, width.max(1) as usize) {
        lines.push(Line::styled(segment, body_style));
    }
    lines.push(Line::default());
    lines
}

pub(super) fn format_guideline(
    theme: &Theme,
    point: &GuidelinePoint,
    width: u16,
    expanded: bool,
    selected: bool,
) -> Vec<Line<'static>> {
    let marker = if expanded { "▾ " } else { "▸ " };
    let title_style = if selected {
        theme.highlight_style()
    } else {
        theme.value_style(ValueStyle::Important)
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(marker, theme.accent_style()),
        Span::styled(format!("{:>2}. ", point.id), theme.value_style(ValueStyle::Dim)),
        Span::styled(point.title, title_style),
        Span::styled(format!("  [{}]", point.category), theme.key_style()),
    ])];
    if expanded {
        for segment in wrap_text_lines(point.description, (width.max(7) as usize) - 6) {
            lines.push(Line::styled(
                format!("      {segment}"),
                theme.value_style(ValueStyle::Normal),
            ));
        }
        lines.push(Line::default());
    }
    lines
}
