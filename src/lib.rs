pub mod auth;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod llm;
pub mod mail;
pub mod session;
pub mod terminal;
