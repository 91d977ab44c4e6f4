//! Chat completion boundary: an OpenAI-compatible endpoint (Groq by default).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::domain::email::{ConversationTurn, Role};
use crate::error::CompletionError;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Anything that can answer a question given a system prompt and prior turns.
pub trait ChatModel {
    fn complete(
        &self,
        system: &str,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    model: String,
    temperature: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

pub struct GroqClient {
    api_base: String,
    api_key: String,
    model: String,
    temperature: f64,
    http: Client,
}

impl GroqClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            http,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl ChatModel for GroqClient {
    fn complete(
        &self,
        system: &str,
        history: &[ConversationTurn],
        question: &str,
    ) -> Result<String, CompletionError> {
        let req = build_request(&self.model, self.temperature, system, history, question);
        log::debug!(
            "POST {} model={} messages={}",
            self.endpoint(),
            req.model,
            req.messages.len()
        );

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<failed to read error body>".to_string());
            log::error!("completion request failed with status {}: {}", status, body);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = resp.json()?;
        first_reply(body)
    }
}

pub(crate) fn build_request(
    model: &str,
    temperature: f64,
    system: &str,
    history: &[ConversationTurn],
    question: &str,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage {
        role: "system".to_string(),
        content: system.to_string(),
    });
    messages.extend(history.iter().map(|t| ChatMessage {
        role: t.role.as_str().to_string(),
        content: t.text.clone(),
    }));
    messages.push(ChatMessage {
        role: Role::User.as_str().to_string(),
        content: question.to_string(),
    });

    ChatRequest {
        model: model.to_string(),
        temperature,
        messages,
    }
}

fn first_reply(body: ChatResponse) -> Result<String, CompletionError> {
    body.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .filter(|s| !s.trim().is_empty())
        .ok_or(CompletionError::EmptyReply)
}
