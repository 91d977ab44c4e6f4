use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::terminal::state::{AppState, Screen};

/// Apply one key press. Returns `true` when the app should quit.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if ctrl => return true,
        _ => {}
    }

    match state.screen {
        Screen::Login => handle_login_keys(key, state, ctrl),
        Screen::Chat => handle_chat_keys(key, state, ctrl),
    }
    false
}

fn handle_login_keys(key: KeyEvent, state: &mut AppState, ctrl: bool) {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => state.toggle_field(),
        KeyCode::Enter => state.submit_form(),
        KeyCode::Backspace => state.backspace(),
        KeyCode::Char(c) if !ctrl => state.push_char(c),
        _ => {}
    }
}

fn handle_chat_keys(key: KeyEvent, state: &mut AppState, ctrl: bool) {
    match key.code {
        KeyCode::Char('r') if ctrl => state.reset(),
        KeyCode::Enter => state.submit_question(),
        KeyCode::Backspace => state.backspace(),
        KeyCode::Char(c) if !ctrl => state.push_char(c),
        KeyCode::PageUp => state.scroll_history(10),
        KeyCode::PageDown => state.scroll_history(-10),
        KeyCode::Up => state.scroll_history(1),
        KeyCode::Down => state.scroll_history(-1),
        KeyCode::End => state.scroll_back = 0,
        _ => {}
    }
}
