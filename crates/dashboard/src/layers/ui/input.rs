use crate::layers::service::events::ServiceCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use super::app::{AppState, Screen, ScreenState};

const SCROLL_PAGE: usize = 10;

/// Returns true when the application should exit.
pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut AppState,
    cmd_tx: &mpsc::Sender<ServiceCommand>,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.confirm_quit {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Esc => {
                app.confirm_quit = false;
                return false;
            }
            _ => {
                app.confirm_quit = false;
            }
        }
    }

    if let KeyCode::F(n) = key.code {
        if let Some(screen) = Screen::from_index(usize::from(n).wrapping_sub(1)) {
            app.navigate(screen);
        }
        return false;
    }

    if app.is_editing() {
        handle_editing_key(key, app, cmd_tx);
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.confirm_quit = true,
        KeyCode::Char(ch @ '1'..='5') => {
            let index = ch as usize - '1' as usize;
            if let Some(screen) = Screen::from_index(index) {
                app.navigate(screen);
            }
        }
        KeyCode::Right => app.navigate(app.screen().next()),
        KeyCode::Left => app.navigate(app.screen().prev()),
        _ => handle_browse_key(key, &mut app.view),
    }
    false
}

fn handle_browse_key(key: KeyEvent, view: &mut ScreenState) {
    match view {
        ScreenState::Statement(screen) => {
            let scroll = &mut screen.scroll;
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
                KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
                KeyCode::PageDown => *scroll = scroll.saturating_add(SCROLL_PAGE),
                KeyCode::PageUp => *scroll = scroll.saturating_sub(SCROLL_PAGE),
                KeyCode::Home | KeyCode::Char('g') => *scroll = 0,
                _ => {}
            }
        }
        ScreenState::Guidelines(screen) => match key.code {
            KeyCode::Tab | KeyCode::Char('l') => screen.next_filter(),
            KeyCode::BackTab | KeyCode::Char('h') => screen.prev_filter(),
            KeyCode::Down | KeyCode::Char('j') => screen.select_next(1),
            KeyCode::Up | KeyCode::Char('k') => screen.select_prev(1),
            KeyCode::PageDown => screen.select_next(SCROLL_PAGE),
            KeyCode::PageUp => screen.select_prev(SCROLL_PAGE),
            KeyCode::Home | KeyCode::Char('g') => screen.select_first(),
            KeyCode::End | KeyCode::Char('G') => screen.select_last(),
            KeyCode::Enter | KeyCode::Char(' ') => screen.toggle_selected(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_editing_key(key: KeyEvent, app: &mut AppState, cmd_tx: &mpsc::Sender<ServiceCommand>) {
    if key.code == KeyCode::Enter {
        let command = match app.screen() {
            Screen::PredictionEngine => app.submit_prediction(),
            Screen::Assistant => app.submit_chat(),
            _ => None,
        };
        if let Some(command) = command {
            dispatch(app, cmd_tx, command);
        }
        return;
    }

    let typed = match key.code {
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(ch)
        }
        _ => None,
    };

    match &mut app.view {
        ScreenState::Prediction(screen) => match key.code {
            KeyCode::Tab | KeyCode::Down => screen.focus_next(),
            KeyCode::BackTab | KeyCode::Up => screen.focus_prev(),
            KeyCode::Backspace => screen.backspace(),
            _ => {
                if let Some(ch) = typed {
                    screen.insert_char(ch);
                }
            }
        },
        ScreenState::Assistant(screen) => match key.code {
            KeyCode::Backspace => {
                screen.input.pop();
            }
            KeyCode::Up => screen.scroll_back = screen.scroll_back.saturating_add(1),
            KeyCode::Down => screen.scroll_back = screen.scroll_back.saturating_sub(1),
            KeyCode::PageUp => screen.scroll_back = screen.scroll_back.saturating_add(SCROLL_PAGE),
            KeyCode::PageDown => {
                screen.scroll_back = screen.scroll_back.saturating_sub(SCROLL_PAGE)
            }
            KeyCode::End => screen.scroll_back = 0,
            _ => {
                if let Some(ch) = typed {
                    screen.input.push(ch);
                }
            }
        },
        _ => {}
    }
}

fn dispatch(app: &mut AppState, cmd_tx: &mpsc::Sender<ServiceCommand>, command: ServiceCommand) {
    if let Err(err) = cmd_tx.try_send(command) {
        tracing::warn!(event = "command_not_sent", error = %err);
        app.dispatch_failed(err.into_inner());
    }
}
