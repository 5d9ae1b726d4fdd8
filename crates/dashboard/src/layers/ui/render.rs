use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Bar, BarChart, BarGroup, Gauge, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::content::{
    GuidelineFilter, APP_NAME, COMPLAINT_TIMELINE, DELIVERABLES, EVENT_TITLE,
    LIVE_ALERT, PROBLEM_SUMMARY, REGIONAL_RISK, STAT_CARDS,
};

use super::app::{
    AppState, AssistantScreen, FormField, GuidelinesScreen, PredictionScreen, RequestState,
    Screen, ScreenState, StatementScreen,
};
use super::format::{
    format_factors, format_guideline, format_message, format_probability, probability_band,
};
use super::text::{truncate_with_ellipsis, wrap_text_lines};
use super::theme::{Theme, ValueStyle};

pub(crate) fn draw_ui(frame: &mut Frame, app: &mut AppState) {
    let theme = Theme::dark();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, &theme, app, chunks[0]);
    match &mut app.view {
        ScreenState::Dashboard => draw_dashboard(frame, &theme, chunks[1]),
        ScreenState::Prediction(screen) => draw_prediction(frame, &theme, screen, chunks[1]),
        ScreenState::Statement(screen) => draw_statement(frame, &theme, screen, chunks[1]),
        ScreenState::Guidelines(screen) => draw_guidelines(frame, &theme, screen, chunks[1]),
        ScreenState::Assistant(screen) => draw_assistant(frame, &theme, screen, chunks[1]),
    }
    draw_footer(frame, &theme, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, theme: &Theme, app: &AppState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(38)])
        .split(area);

    let title = format!("{APP_NAME} | {EVENT_TITLE}");
    let tabs = Tabs::new(
        Screen::ALL
            .iter()
            .enumerate()
            .map(|(idx, screen)| format!("F{} {}", idx + 1, screen.label())),
    )
    .select(app.screen().index())
    .style(theme.value_style(ValueStyle::Dim))
    .highlight_style(theme.highlight_style())
    .block(theme.block(&title));
    frame.render_widget(tabs, columns[0]);

    let model = truncate_with_ellipsis(&app.model_name, 18);
    let key_status = if app.credentials_ok {
        Span::styled("key ok", theme.ok_style())
    } else {
        Span::styled("API key missing", theme.warn_style())
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(model, theme.value_style(ValueStyle::Important)),
        Span::raw("  "),
        key_status,
    ]))
    .block(theme.block("Model"));
    frame.render_widget(status, columns[1]);
}

fn draw_footer(frame: &mut Frame, theme: &Theme, app: &AppState, area: Rect) {
    let help = match app.screen() {
        Screen::PredictionEngine => "Tab/↑/↓=field  Enter=forecast  F1-F5=screens  Ctrl+C=quit  ",
        Screen::Assistant => "Enter=send  ↑/↓/PgUp/PgDn=scroll  F1-F5=screens  Ctrl+C=quit  ",
        Screen::Guidelines => {
            "Tab/h/l=category  j/k=select  Enter=expand  1-5/←/→=screens  Q=quit  "
        }
        Screen::ProblemStatement => "j/k/PgUp/PgDn=scroll  1-5/←/→=screens  Q=quit  ",
        Screen::Dashboard => "1-5/←/→=screens  Q=quit  ",
    };
    let mut footer_spans = vec![Span::styled(help, theme.help_style())];
    if app.confirm_quit {
        footer_spans.push(Span::styled(
            "Press Q again to quit / Esc to cancel  ",
            theme.warn_style(),
        ));
    }
    let footer = Paragraph::new(Line::from(footer_spans)).block(theme.block("Controls"));
    frame.render_widget(footer, area);
}

fn draw_dashboard(frame: &mut Frame, theme: &Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);
    for (card, slot) in STAT_CARDS.iter().zip(cards.iter()) {
        let widget = Paragraph::new(Line::styled(
            card.value,
            theme.value_style(ValueStyle::Important),
        ))
        .block(theme.block(card.label));
        frame.render_widget(widget, *slot);
    }

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let mut timeline = BarChart::default()
        .block(theme.block("Complaint Volume vs Risk (complaints | risk)"))
        .bar_width(3)
        .bar_gap(0)
        .group_gap(2)
        .value_style(theme.value_style(ValueStyle::Normal).add_modifier(Modifier::BOLD));
    for (label, complaints, risk) in COMPLAINT_TIMELINE {
        let bars = [
            Bar::default()
                .value(complaints)
                .style(theme.value_style(ValueStyle::Important)),
            Bar::default()
                .value(risk)
                .style(theme.band_style(probability_band(risk as f64))),
        ];
        timeline = timeline.data(BarGroup::default().label(Line::from(label)).bars(&bars));
    }
    frame.render_widget(timeline, charts[0]);

    let regional_bars = REGIONAL_RISK
        .iter()
        .map(|(zone, _volume, risk)| {
            Bar::default()
                .label(Line::from(*zone))
                .value(*risk)
                .style(theme.band_style(probability_band(*risk as f64)))
        })
        .collect::<Vec<_>>();
    let regional = BarChart::default()
        .block(theme.block("Regional Risk Score"))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(100)
        .data(BarGroup::default().bars(&regional_bars));
    frame.render_widget(regional, charts[1]);

    let alert = Paragraph::new(Line::from(vec![
        Span::styled("Live Alert System Active  ", theme.warn_style()),
        Span::styled(LIVE_ALERT, theme.value_style(ValueStyle::Normal)),
    ]))
    .block(theme.block("Alerts"))
    .wrap(Wrap { trim: true });
    frame.render_widget(alert, rows[2]);
}

fn draw_prediction(frame: &mut Frame, theme: &Theme, screen: &PredictionScreen, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(6),
        ])
        .split(area);

    let editable = !screen.state.is_pending();
    for (field, slot) in FormField::ALL.iter().zip(rows.iter()) {
        let focused = screen.focus == *field;
        let value = screen.value(*field);
        let block = theme.input_block(field.label(), focused && editable);
        let inner = block.inner(*slot);
        let visible = tail_fitting(value, inner.width.saturating_sub(1) as usize);
        let line = if value.is_empty() {
            Line::styled(field.placeholder(), theme.value_style(ValueStyle::Dim))
        } else {
            Line::styled(visible.clone(), theme.value_style(ValueStyle::Normal))
        };
        frame.render_widget(Paragraph::new(line).block(block), *slot);
        if focused && editable {
            let offset = visible.chars().count() as u16;
            frame.set_cursor_position((inner.x + offset, inner.y));
        }
    }

    let status = match (&screen.notice, &screen.state) {
        (_, RequestState::Pending { .. }) => {
            Line::styled(" Processing AI Model...", theme.warn_style())
        }
        (Some(notice), _) => Line::styled(format!(" {notice}"), theme.warn_style()),
        (None, _) => Line::styled(
            " Enter: Generate Risk Forecast",
            theme.value_style(ValueStyle::Dim),
        ),
    };
    frame.render_widget(Paragraph::new(status), rows[3]);

    let block = theme.block("Forecast Results");
    let inner = block.inner(rows[4]);
    frame.render_widget(block, rows[4]);
    match &screen.state {
        RequestState::Ready(forecast) => {
            let result = &forecast.result;
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Min(2),
                ])
                .split(inner);

            let mut header = vec![
                Span::styled(
                    format!(" {} Risk ", result.risk_level),
                    theme.risk_style(result.risk_level),
                ),
                Span::raw("  "),
                Span::styled(result.location.clone(), theme.value_style(ValueStyle::Important)),
            ];
            if forecast.fallback {
                header.push(Span::styled(
                    "  (heuristic fallback)",
                    theme.value_style(ValueStyle::Dim),
                ));
            }
            frame.render_widget(Paragraph::new(Line::from(header)), parts[0]);

            let probability = result.probability.clamp(0.0, 100.0);
            let gauge = Gauge::default()
                .gauge_style(theme.band_style(probability_band(probability)))
                .ratio(probability / 100.0)
                .label(format!("Probability {}", format_probability(probability)));
            frame.render_widget(gauge, parts[1]);

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(parts[3]);
            let factors_block = theme.block("Key Risk Factors");
            let factors_inner = factors_block.inner(columns[0]);
            frame.render_widget(
                Paragraph::new(format_factors(theme, result, factors_inner.width))
                    .block(factors_block),
                columns[0],
            );
            let action = Paragraph::new(result.recommended_action.clone())
                .style(theme.value_style(ValueStyle::Normal))
                .block(theme.block("Recommended Action"))
                .wrap(Wrap { trim: true });
            frame.render_widget(action, columns[1]);
        }
        RequestState::Pending { .. } => {
            frame.render_widget(
                Paragraph::new(Line::styled(
                    "Forecasting withdrawal risk...",
                    theme.value_style(ValueStyle::Dim),
                )),
                inner,
            );
        }
        RequestState::Idle => {
            frame.render_widget(
                Paragraph::new(Line::styled(
                    "Enter environmental parameters to forecast cybercrime withdrawal hotspot risks.",
                    theme.value_style(ValueStyle::Dim),
                ))
                .wrap(Wrap { trim: true }),
                inner,
            );
        }
    }
}

fn draw_statement(frame: &mut Frame, theme: &Theme, screen: &mut StatementScreen, area: Rect) {
    let block = theme.block("Problem Statement");
    let inner = block.inner(area);
    let width = inner.width.max(1) as usize;

    let mut lines = Vec::new();
    for segment in wrap_text_lines(PROBLEM_SUMMARY.title, width) {
        lines.push(Line::styled(segment, theme.title_style()));
    }
    lines.push(Line::styled(
        PROBLEM_SUMMARY.tags.join("  |  "),
        theme.accent_style(),
    ));
    lines.push(Line::default());
    for (heading, body) in [
        ("Background", PROBLEM_SUMMARY.background),
        ("The Goal", PROBLEM_SUMMARY.goal),
    ] {
        lines.push(Line::styled(heading, theme.value_style(ValueStyle::Important)));
        for segment in wrap_text_lines(body, width) {
            lines.push(Line::styled(segment, theme.value_style(ValueStyle::Normal)));
        }
        lines.push(Line::default());
    }
    lines.push(Line::styled(
        "Key Deliverables",
        theme.value_style(ValueStyle::Important),
    ));
    for (idx, (title, description)) in DELIVERABLES.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", idx + 1), theme.key_style()),
            Span::styled(*title, theme.accent_style()),
        ]));
        for segment in wrap_text_lines(description, width.saturating_sub(3).max(1)) {
            lines.push(Line::styled(
                format!("   {segment}"),
                theme.value_style(ValueStyle::Normal),
            ));
        }
    }

    screen.scroll = clamp_scroll(screen.scroll, lines.len(), inner.height);
    let widget = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((screen.scroll as u16, 0));
    frame.render_widget(widget, area);
}

fn draw_guidelines(frame: &mut Frame, theme: &Theme, screen: &mut GuidelinesScreen, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let filter = screen.filter();
    let selected = GuidelineFilter::TABS
        .iter()
        .position(|tab| *tab == filter)
        .unwrap_or(0);
    let tabs = Tabs::new(GuidelineFilter::TABS.iter().map(|tab| tab.label()))
        .select(selected)
        .style(theme.value_style(ValueStyle::Dim))
        .highlight_style(theme.highlight_style())
        .block(theme.block("Implementation Guidelines"));
    frame.render_widget(tabs, rows[0]);

    let block = theme.block(filter.label());
    let inner = block.inner(rows[1]);
    let points = screen.points();
    let mut lines = Vec::new();
    let mut selected_span = (0, 0);
    for (idx, point) in points.iter().enumerate() {
        let card = format_guideline(
            theme,
            point,
            inner.width,
            screen.is_expanded(point.id),
            idx == screen.selected,
        );
        if idx == screen.selected {
            selected_span = (lines.len(), lines.len() + card.len());
        }
        lines.extend(card);
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "No guidelines found for this category.",
            theme.value_style(ValueStyle::Dim),
        ));
    }

    screen.scroll = scroll_to_reveal(screen.scroll, selected_span, inner.height);
    screen.scroll = clamp_scroll(screen.scroll, lines.len(), inner.height);
    let widget = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((screen.scroll as u16, 0));
    frame.render_widget(widget, rows[1]);
}

fn draw_assistant(frame: &mut Frame, theme: &Theme, screen: &mut AssistantScreen, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(area);

    let block = theme.block("SIH Consultant");
    let inner = block.inner(rows[0]);
    let mut lines = screen
        .transcript
        .messages()
        .iter()
        .flat_map(|message| format_message(theme, message, inner.width))
        .collect::<Vec<_>>();
    let pending = screen.state.is_pending();
    if pending {
        lines.push(Line::styled("Thinking...", theme.accent_style()));
    }

    let max_scroll = lines.len().saturating_sub(inner.height as usize);
    screen.scroll_back = screen.scroll_back.min(max_scroll);
    let offset = max_scroll - screen.scroll_back;
    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((offset as u16, 0));
    frame.render_widget(transcript, rows[0]);

    let title = if pending {
        "Waiting for reply..."
    } else {
        "Message (Enter to send)"
    };
    let input_block = theme.input_block(title, !pending);
    let input_inner = input_block.inner(rows[1]);
    let visible = tail_fitting(&screen.input, input_inner.width.saturating_sub(1) as usize);
    let line = if screen.input.is_empty() {
        Line::styled(
            "Ask about guidelines, implementation timeline, or the problem statement...",
            theme.value_style(ValueStyle::Dim),
        )
    } else {
        Line::styled(visible.clone(), theme.value_style(ValueStyle::Normal))
    };
    frame.render_widget(Paragraph::new(line).block(input_block), rows[1]);
    if !pending {
        let offset = visible.chars().count() as u16;
        frame.set_cursor_position((input_inner.x + offset, input_inner.y));
    }
}

fn clamp_scroll(scroll: usize, total_lines: usize, view_height: u16) -> usize {
    scroll.min(total_lines.saturating_sub(view_height as usize))
}

fn scroll_to_reveal(scroll: usize, (start, end): (usize, usize), view_height: u16) -> usize {
    let height = view_height as usize;
    if start < scroll {
        start
    } else if end > scroll + height {
        end.saturating_sub(height).min(start)
    } else {
        scroll
    }
}

fn tail_fitting(text: &str, width: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(width)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::engine::Forecast;
    use protocol::PredictionResult;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn render(app: &mut AppState) -> String {
        let backend = TestBackend::new(160, 40);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| draw_ui(frame, app)).expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn tail_keeps_end_of_input() {
        assert_eq!(tail_fitting("abcdef", 3), "def");
        assert_eq!(tail_fitting("ab", 3), "ab");
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        assert_eq!(clamp_scroll(50, 30, 10), 20);
        assert_eq!(clamp_scroll(5, 3, 10), 0);
    }

    #[test]
    fn header_lists_every_screen() {
        let mut app = AppState::new("gemini-2.5-flash", false);
        let text = render(&mut app);
        for screen in Screen::ALL {
            assert!(text.contains(screen.label()), "missing {}", screen.label());
        }
        assert!(text.contains("API key missing"));
        assert!(text.contains("Daily Complaints"));
    }

    #[test]
    fn prediction_result_renders_badge_and_action() {
        let mut app = AppState::new("gemini-2.5-flash", true);
        app.navigate(Screen::PredictionEngine);
        if let ScreenState::Prediction(screen) = &mut app.view {
            screen.state = RequestState::Ready(Forecast::fallback("Andheri"));
        }
        let text = render(&mut app);
        assert!(text.contains("Medium Risk"));
        assert!(text.contains("Probability 50%"));
        assert!(text.contains("Monitor manually"));
        assert!(text.contains("Data unavailable"));
        assert!(text.contains("(heuristic fallback)"));
    }

    #[test]
    fn model_forecast_matching_fallback_values_is_not_marked() {
        let mut app = AppState::new("gemini-2.5-flash", true);
        app.navigate(Screen::PredictionEngine);
        if let ScreenState::Prediction(screen) = &mut app.view {
            screen.state = RequestState::Ready(Forecast {
                result: PredictionResult::fallback("Andheri"),
                fallback: false,
            });
        }
        let text = render(&mut app);
        assert!(text.contains("Medium Risk"));
        assert!(!text.contains("(heuristic fallback)"));
    }

    #[test]
    fn guideline_descriptions_show_only_when_expanded() {
        let mut app = AppState::new("gemini-2.5-flash", true);
        app.navigate(Screen::Guidelines);
        let text = render(&mut app);
        assert!(text.contains("Prototype Maturity"));
        assert!(text.contains("Reporting"));
        assert!(!text.contains("Hackathon prototypes are usually crude"));

        if let ScreenState::Guidelines(screen) = &mut app.view {
            screen.toggle_selected();
        }
        let text = render(&mut app);
        assert!(text.contains("Hackathon prototypes are usually crude"));
        assert!(!text.contains("Ideally 6 months to 1 year"));
    }

    #[test]
    fn reveal_keeps_selected_card_on_screen() {
        assert_eq!(scroll_to_reveal(5, (2, 3), 10), 2);
        assert_eq!(scroll_to_reveal(0, (12, 14), 10), 4);
        assert_eq!(scroll_to_reveal(0, (12, 30), 10), 12);
        assert_eq!(scroll_to_reveal(3, (5, 8), 10), 3);
    }

    #[test]
    fn pending_chat_shows_thinking_indicator() {
        let mut app = AppState::new("gemini-2.5-flash", true);
        app.navigate(Screen::Assistant);
        if let ScreenState::Assistant(screen) = &mut app.view {
            screen.input = "What is the stipend?".to_string();
        }
        assert!(app.submit_chat().is_some());
        let text = render(&mut app);
        assert!(text.contains("Thinking..."));
        assert!(text.contains("What is the stipend?"));
    }
}
