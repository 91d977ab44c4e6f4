use std::cell::RefCell;

use inbox_mind::domain::email::{ConversationTurn, MailboxCredentials, RawMessage, Role};
use inbox_mind::error::{CompletionError, ConnectionError, ConnectionStage, SessionError};
use inbox_mind::llm::ChatModel;
use inbox_mind::mail::Mailbox;
use inbox_mind::session::Session;

struct FakeInbox {
    messages: Vec<RawMessage>,
}

impl FakeInbox {
    fn with(n: u32) -> Self {
        let messages = (1..=n)
            .map(|i| RawMessage {
                id: i,
                bytes: format!(
                    "From: sender{i}@example.com\r\nSubject: Topic {i}\r\n\r\nBody of message {i}\r\n"
                )
                .into_bytes(),
            })
            .collect();
        Self { messages }
    }
}

impl Mailbox for FakeInbox {
    fn fetch_recent(&self, creds: &MailboxCredentials) -> Result<Vec<RawMessage>, ConnectionError> {
        if creds.secret != "app-password" {
            return Err(ConnectionError::new(
                ConnectionStage::Login,
                "[AUTHENTICATIONFAILED] Invalid credentials (Failure)",
            ));
        }
        Ok(self.messages.clone())
    }
}

/// Records every call and answers by enumerating the emails it was shown.
#[derive(Default)]
struct RecordingModel {
    calls: RefCell<Vec<(String, Vec<ConversationTurn>, String)>>,
    fail: bool,
}

impl ChatModel for RecordingModel {
    fn complete(
        &self,
        system: &str,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String, CompletionError> {
        self.calls
            .borrow_mut()
            .push((system.to_string(), history.to_vec(), question.to_string()));
        if self.fail {
            return Err(CompletionError::Status {
                status: 503,
                body: "overloaded".into(),
            });
        }
        let n = system.matches("EMAIL #").count();
        Ok((1..=n)
            .map(|i| format!("{i}. summary"))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

fn creds() -> MailboxCredentials {
    MailboxCredentials::new("me@example.com", "app-password")
}

#[test]
fn connect_then_summarize() {
    let mut session = Session::new();
    let model = RecordingModel::default();

    let n = session.connect(&FakeInbox::with(3), creds()).unwrap();
    assert_eq!(n, 3);
    assert!(session.is_connected());

    let history = session.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::Assistant);
    assert_eq!(history[0].text, "I've analyzed your last 3 emails. How can I help?");

    let answer = session.ask(&model, "summarize").unwrap().text.clone();
    assert_eq!(answer, "1. summary\n2. summary\n3. summary");

    let history = session.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1], ConversationTurn::user("summarize"));
    assert_eq!(history[2].role, Role::Assistant);
}

#[test]
fn emails_keep_mailbox_order() {
    let mut session = Session::new();
    session.connect(&FakeInbox::with(3), creds()).unwrap();

    let subjects: Vec<_> = session
        .emails()
        .unwrap()
        .iter()
        .map(|e| e.subject.as_str())
        .collect();
    assert_eq!(subjects, ["Topic 1", "Topic 2", "Topic 3"]);
    assert!(session.instruction().contains("EMAIL #3:\nFROM: sender3@example.com"));
}

#[test]
fn model_sees_prior_exchanges_but_not_the_greeting() {
    let mut session = Session::new();
    let model = RecordingModel::default();
    session.connect(&FakeInbox::with(2), creds()).unwrap();

    session.ask(&model, "summarize").unwrap();
    session.ask(&model, "who sent the second one?").unwrap();

    let calls = model.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].1.is_empty());
    assert_eq!(calls[1].1.len(), 2);
    assert_eq!(calls[1].1[0], ConversationTurn::user("summarize"));
    assert_eq!(calls[1].2, "who sent the second one?");
    // the instruction never changes within a session
    assert_eq!(calls[0].0, calls[1].0);
}

#[test]
fn bad_credentials_leave_session_empty() {
    let mut session = Session::new();
    let wrong = MailboxCredentials::new("me@example.com", "nope");

    let err = session.connect(&FakeInbox::with(3), wrong).unwrap_err();
    assert_eq!(err.stage, ConnectionStage::Login);
    assert!(err.to_string().contains("AUTHENTICATIONFAILED"));
    assert!(!session.is_connected());
    assert!(session.emails().is_none());
    assert!(session.history().is_empty());

    let model = RecordingModel::default();
    assert!(matches!(
        session.ask(&model, "summarize"),
        Err(SessionError::NotConnected)
    ));
    assert!(model.calls.borrow().is_empty());
}

#[test]
fn failed_completion_appends_nothing() {
    let mut session = Session::new();
    session.connect(&FakeInbox::with(1), creds()).unwrap();

    let model = RecordingModel {
        fail: true,
        ..Default::default()
    };
    let err = session.ask(&model, "summarize").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Completion(CompletionError::Status { status: 503, .. })
    ));
    assert_eq!(session.history().len(), 1);
    assert!(session.is_connected());
}

#[test]
fn blank_question_is_rejected_locally() {
    let mut session = Session::new();
    session.connect(&FakeInbox::with(1), creds()).unwrap();
    let model = RecordingModel::default();

    assert!(matches!(session.ask(&model, "   "), Err(SessionError::EmptyQuestion)));
    assert!(model.calls.borrow().is_empty());
}

#[test]
fn reset_and_reconnect_starts_over() {
    let mut session = Session::new();
    let model = RecordingModel::default();
    session.connect(&FakeInbox::with(2), creds()).unwrap();
    session.ask(&model, "summarize").unwrap();

    session.reset();
    assert!(!session.is_connected());
    assert!(session.history().is_empty());

    session.connect(&FakeInbox::with(1), creds()).unwrap();
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.emails().unwrap().len(), 1);
}

#[test]
fn empty_mailbox_still_connects() {
    let mut session = Session::new();
    assert_eq!(session.connect(&FakeInbox::with(0), creds()).unwrap(), 0);
    assert!(session.is_connected());
    assert!(session.instruction().contains("The user has 0 emails"));
}
