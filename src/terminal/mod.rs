pub mod events;
pub mod state;
pub mod ui;

use anyhow::Result;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{self, Event, KeyEventKind},
};

use crate::llm::ChatModel;
use crate::mail::Mailbox;
use crate::terminal::state::AppState;

pub fn run_tui(mailbox: &dyn Mailbox, model: &dyn ChatModel, address: Option<String>) -> Result<()> {
    let mut state = AppState::new(address);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut state, mailbox, model);
    ratatui::restore();

    result
}

fn run(
    terminal: &mut DefaultTerminal,
    state: &mut AppState,
    mailbox: &dyn Mailbox,
    model: &dyn ChatModel,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, state))?;

        // the status line for this work is already on screen
        if state.pending.is_some() {
            state.run_pending(mailbox, model);
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if events::handle_key(key, state) {
                break;
            }
        }
    }
    Ok(())
}
