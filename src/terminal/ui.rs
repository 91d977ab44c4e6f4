use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::domain::email::Role;
use crate::terminal::state::{AppState, Field, Screen, Status};

const TITLE: &str = " InboxMind - Your AI Email Assistant ";

pub fn render(f: &mut Frame, state: &AppState) {
    let [main, status_area, footer] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .areas(f.area());

    match state.screen {
        Screen::Login => render_login(f, main, state),
        Screen::Chat => render_chat(f, main, state),
    }

    if let Some(status) = &state.status {
        let (text, color) = match status {
            Status::Info(s) => (s.as_str(), Color::Green),
            Status::Error(s) => (s.as_str(), Color::Red),
        };
        f.render_widget(
            Paragraph::new(text).style(Style::default().fg(color)),
            status_area,
        );
    }

    f.render_widget(Paragraph::new(hints(state.screen)), footer);
}

fn hints(screen: Screen) -> Line<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let pairs: &[(&str, &str)] = match screen {
        Screen::Login => &[("Tab", " field  "), ("Enter", " connect  "), ("Esc", " quit")],
        Screen::Chat => &[
            ("Enter", " ask  "),
            ("PgUp/PgDn", " scroll  "),
            ("Ctrl-R", " new session  "),
            ("Esc", " quit"),
        ],
    };
    Line::from(
        pairs
            .iter()
            .flat_map(|(k, v)| [Span::styled(*k, bold), Span::raw(*v)])
            .collect::<Vec<_>>(),
    )
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn render_login(f: &mut Frame, area: Rect, state: &AppState) {
    let [header, address, secret, _rest] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let intro = Text::from(vec![
        Line::from(Span::styled(TITLE.trim(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            "Securely analyze your inbox with AI | Most recent emails only",
            Style::default().fg(Color::Gray),
        )),
    ]);
    f.render_widget(Paragraph::new(intro), header);

    f.render_widget(
        Paragraph::new(state.address.as_str())
            .block(field_block(" Email address ", state.field == Field::Address)),
        address,
    );

    // never echo the password
    let masked = "•".repeat(state.secret.chars().count());
    f.render_widget(
        Paragraph::new(masked).block(field_block(" App password ", state.field == Field::Secret)),
        secret,
    );
}

fn render_chat(f: &mut Frame, area: Rect, state: &AppState) {
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)]).areas(area);
    let [history_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(right);

    let items: Vec<ListItem> = state
        .session
        .emails()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let subj = Span::styled(
                format!("{}. {}", i + 1, e.subject),
                Style::default().add_modifier(Modifier::BOLD),
            );
            let from = Span::styled(e.sender.clone(), Style::default().fg(Color::Gray));
            ListItem::new(Text::from(vec![Line::from(subj), Line::from(from)]))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .title(" Retrieved emails ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(list, left);

    let mut lines: Vec<Line> = Vec::new();
    for turn in state.session.history() {
        let (who, color) = match turn.role {
            Role::User => ("you", Color::Cyan),
            Role::Assistant => ("assistant", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            who,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(turn.text.lines().map(|l| Line::from(l.to_string())));
        lines.push(Line::default());
    }

    let inner_width = history_area.width.saturating_sub(2);
    let inner_height = history_area.height.saturating_sub(2);
    let history = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // rows after word wrapping, measured before the border is attached
    let total = u16::try_from(history.line_count(inner_width)).unwrap_or(u16::MAX);
    let bottom = total.saturating_sub(inner_height);
    let scroll = bottom.saturating_sub(state.scroll_back);

    let history = history
        .block(
            Block::default()
                .title(" Email Analysis Chat ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .scroll((scroll, 0));
    f.render_widget(history, history_area);

    let input = Paragraph::new(state.input.as_str())
        .block(field_block(" Ask about your emails... ", true));
    f.render_widget(input, input_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::email::{ConversationTurn, MailboxCredentials, RawMessage};
    use crate::error::{CompletionError, ConnectionError};
    use crate::llm::ChatModel;
    use crate::mail::Mailbox;
    use ratatui::{Terminal, backend::TestBackend};

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn password_is_masked() {
        let mut state = AppState::new(Some("me@example.com".into()));
        state.secret = "hunter2".into();
        let screen = draw(&state);
        assert!(screen.contains("me@example.com"));
        assert!(!screen.contains("hunter2"));
    }

    struct OneMessage;

    impl Mailbox for OneMessage {
        fn fetch_recent(
            &self,
            _creds: &MailboxCredentials,
        ) -> Result<Vec<RawMessage>, ConnectionError> {
            Ok(vec![RawMessage {
                id: 1,
                bytes: b"From: a@example.com\r\nSubject: hi\r\n\r\nhello\r\n".to_vec(),
            }])
        }
    }

    /// Twenty long words, then a marker that must end up on screen.
    struct Verbose;

    impl ChatModel for Verbose {
        fn complete(
            &self,
            _system: &str,
            _history: &[ConversationTurn],
            _question: &str,
        ) -> Result<String, CompletionError> {
            let word = "w".repeat(30);
            let mut reply = vec![word.as_str(); 20].join(" ");
            reply.push_str(" ENDMARK");
            Ok(reply)
        }
    }

    fn chatting() -> AppState {
        let mut state = AppState::new(Some("me@example.com".into()));
        state
            .session
            .connect(&OneMessage, MailboxCredentials::new("me@example.com", "pw"))
            .unwrap();
        state.screen = Screen::Chat;
        state
    }

    #[test]
    fn end_of_long_reply_is_visible() {
        let mut state = chatting();
        state.session.ask(&Verbose, "summarize").unwrap();

        let screen = draw(&state);
        assert!(screen.contains("ENDMARK"));
    }

    #[test]
    fn scrolling_back_hides_the_end() {
        let mut state = chatting();
        state.session.ask(&Verbose, "summarize").unwrap();
        state.scroll_history(5);

        let screen = draw(&state);
        assert!(!screen.contains("ENDMARK"));
    }
}
