//! Error types shared by the fetcher, the model client and the session.

use std::fmt;

/// Which step of the mailbox round trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStage {
    Connect,
    Login,
    Select,
    Search,
    Fetch,
}

impl fmt::Display for ConnectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStage::Connect => "connect",
            ConnectionStage::Login => "login",
            ConnectionStage::Select => "select",
            ConnectionStage::Search => "search",
            ConnectionStage::Fetch => "fetch",
        };
        f.write_str(s)
    }
}

/// Any failure while talking to the mailbox. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail} (during {stage})")]
pub struct ConnectionError {
    pub stage: ConnectionStage,
    /// Diagnostic text from the server or the transport.
    pub detail: String,
}

impl ConnectionError {
    pub fn new(stage: ConnectionStage, detail: impl fmt::Display) -> Self {
        Self {
            stage,
            detail: detail.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("no API key found (set {env_var} or run `inbox_mind set-api-key`)")]
    MissingApiKey { env_var: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider reply had no message content")]
    EmptyReply,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not connected to a mailbox yet")]
    NotConnected,

    #[error("question is empty")]
    EmptyQuestion,

    #[error("model request failed: {0}")]
    Completion(#[from] CompletionError),
}
