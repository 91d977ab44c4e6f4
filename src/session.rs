//! In-memory state for one user: fetched emails, system instruction, chat history.

use crate::context;
use crate::domain::email::{ConversationTurn, MailboxCredentials, NormalizedEmail};
use crate::error::{ConnectionError, SessionError};
use crate::llm::ChatModel;
use crate::mail::{Mailbox, normalize};

#[derive(Debug, Default)]
pub struct Session {
    emails: Option<Vec<NormalizedEmail>>,
    instruction: String,
    history: Vec<ConversationTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and normalize once, then start a fresh conversation.
    ///
    /// On failure nothing changes; the caller resubmits credentials to retry.
    pub fn connect(
        &mut self,
        mailbox: &dyn Mailbox,
        creds: MailboxCredentials,
    ) -> Result<usize, ConnectionError> {
        let raw = mailbox.fetch_recent(&creds)?;

        let emails: Vec<NormalizedEmail> = raw.iter().map(normalize).collect();
        let count = emails.len();

        self.instruction = context::system_instruction(&emails);
        self.history = vec![ConversationTurn::assistant(context::greeting(count))];
        self.emails = Some(emails);

        log::info!("session ready with {} emails", count);
        Ok(count)
    }

    /// Ask the model; both turns are appended only if the call succeeds.
    pub fn ask(
        &mut self,
        model: &dyn ChatModel,
        question: &str,
    ) -> Result<&ConversationTurn, SessionError> {
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let answer = model.complete(&self.instruction, self.model_history(), question)?;

        self.history.push(ConversationTurn::user(question));
        self.history.push(ConversationTurn::assistant(answer));
        Ok(&self.history[self.history.len() - 1])
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_connected(&self) -> bool {
        self.emails.is_some()
    }

    pub fn emails(&self) -> Option<&[NormalizedEmail]> {
        self.emails.as_deref()
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Turns the model actually took part in; the greeting is local only.
    fn model_history(&self) -> &[ConversationTurn] {
        self.history.get(1..).unwrap_or(&[])
    }
}
