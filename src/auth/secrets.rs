use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

use crate::error::CompletionError;

const SERVICE: &str = "inbox_mind";
const API_KEY_USER: &str = "llm-api-key";

/// Save the model API key into the OS keyring
pub fn save_api_key(api_key: &str) -> Result<()> {
    let entry = Entry::new(SERVICE, API_KEY_USER);
    entry?
        .set_password(api_key)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}

/// Load the model API key from the keyring
pub fn load_api_key() -> Result<Option<String>> {
    let entry = Entry::new(SERVICE, API_KEY_USER);
    match entry?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Environment variable `env_var` first, keyring second.
pub fn resolve_api_key(env_var: &str) -> Result<String, CompletionError> {
    resolve_with(std::env::var(env_var).ok(), load_api_key, env_var)
}

fn resolve_with(
    from_env: Option<String>,
    from_keyring: impl FnOnce() -> Result<Option<String>>,
    env_var: &str,
) -> Result<String, CompletionError> {
    if let Some(k) = from_env.filter(|k| !k.trim().is_empty()) {
        return Ok(k.trim().to_string());
    }
    match from_keyring() {
        Ok(Some(k)) => return Ok(k),
        Ok(None) => {}
        Err(e) => log::warn!("keyring lookup failed: {e}"),
    }
    Err(CompletionError::MissingApiKey {
        env_var: env_var.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_wins_over_keyring() {
        let key = resolve_with(Some("from-env".into()), || Ok(Some("kr".into())), "K").unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn blank_env_falls_through_to_keyring() {
        let key = resolve_with(Some("  ".into()), || Ok(Some("kr".into())), "K").unwrap();
        assert_eq!(key, "kr");
    }

    #[test]
    fn nothing_anywhere_names_the_variable() {
        let err = resolve_with(None, || Err(anyhow!("no backend")), "GROQ_API_KEY").unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }
}
