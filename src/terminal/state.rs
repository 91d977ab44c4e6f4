use crate::domain::email::MailboxCredentials;
use crate::llm::ChatModel;
use crate::mail::Mailbox;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Login,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Address,
    Secret,
}

/// Blocking work queued by a key press, run after the next frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Connect,
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct AppState {
    pub screen: Screen,
    pub field: Field,

    pub address: String,
    pub secret: String,

    /// Chat input line
    pub input: String,
    /// Lines scrolled back from the bottom of the history pane
    pub scroll_back: u16,

    pub status: Option<Status>,
    pub pending: Option<Pending>,
    pub session: Session,
}

impl AppState {
    pub fn new(address: Option<String>) -> Self {
        let mut s = Self::default();
        if let Some(a) = address {
            s.address = a;
            s.field = Field::Secret;
        }
        s
    }

    fn active_buffer(&mut self) -> &mut String {
        match (self.screen, self.field) {
            (Screen::Chat, _) => &mut self.input,
            (Screen::Login, Field::Address) => &mut self.address,
            (Screen::Login, Field::Secret) => &mut self.secret,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.active_buffer().push(c);
    }

    pub fn backspace(&mut self) {
        self.active_buffer().pop();
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            Field::Address => Field::Secret,
            Field::Secret => Field::Address,
        };
    }

    pub fn submit_form(&mut self) {
        if self.address.trim().is_empty() {
            self.field = Field::Address;
            self.status = Some(Status::Error("Enter your email address".to_string()));
            return;
        }
        if self.secret.is_empty() {
            self.field = Field::Secret;
            self.status = Some(Status::Error("Enter your app password".to_string()));
            return;
        }
        self.status = Some(Status::Info("Securely accessing your inbox...".to_string()));
        self.pending = Some(Pending::Connect);
    }

    pub fn submit_question(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }
        self.status = Some(Status::Info("Thinking...".to_string()));
        self.pending = Some(Pending::Ask);
    }

    pub fn scroll_history(&mut self, delta: i32) {
        if delta > 0 {
            self.scroll_back = self.scroll_back.saturating_add(delta as u16);
        } else {
            self.scroll_back = self.scroll_back.saturating_sub((-delta) as u16);
        }
    }

    /// Back to an empty login form; everything fetched is dropped.
    pub fn reset(&mut self) {
        let address = std::mem::take(&mut self.address);
        *self = Self::new(Some(address));
        self.status = Some(Status::Info("Session cleared".to_string()));
    }

    pub fn run_pending(&mut self, mailbox: &dyn Mailbox, model: &dyn ChatModel) {
        match self.pending.take() {
            Some(Pending::Connect) => self.connect(mailbox),
            Some(Pending::Ask) => self.ask(model),
            None => {}
        }
    }

    fn connect(&mut self, mailbox: &dyn Mailbox) {
        // the password is not kept past this attempt
        let creds = MailboxCredentials::new(self.address.trim(), std::mem::take(&mut self.secret));
        match self.session.connect(mailbox, creds) {
            Ok(n) => {
                self.screen = Screen::Chat;
                self.scroll_back = 0;
                self.status = Some(Status::Info(format!(
                    "Connected! Analyzed {n} recent emails"
                )));
            }
            Err(e) => {
                log::warn!("connection failed: {e}");
                self.field = Field::Secret;
                self.status = Some(Status::Error(format!("Connection failed: {e}")));
            }
        }
    }

    fn ask(&mut self, model: &dyn ChatModel) {
        match self.session.ask(model, &self.input) {
            Ok(_) => {
                self.input.clear();
                self.scroll_back = 0;
                self.status = None;
            }
            Err(e) => {
                log::warn!("question failed: {e}");
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }
}
