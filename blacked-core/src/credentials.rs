//! API key storage and interactive prompting
//!
//! The key lives in a small JSON file (`{"api_key": "..."}`). When the file
//! is absent the user is prompted once and the answer is written back.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default credential file, relative to the working directory
pub const DEFAULT_KEY_FILE: &str = "apikey.json";

#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    api_key: String,
}

/// Source of a key typed in by the user
pub trait KeyPrompt {
    fn ask(&mut self) -> Result<String>;
}

/// Prompts on the terminal with hidden input
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl KeyPrompt for TerminalPrompt {
    fn ask(&mut self) -> Result<String> {
        dialoguer::Password::new()
            .with_prompt("[+] Enter your Shodan API Key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| Error::Config(format!("Failed to read API key: {}", e)))
    }
}

/// Reads and persists the API key file
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_FILE)
    }
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored key
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but is not a JSON object
    /// with a non-empty string `api_key`.
    pub fn load(&self) -> Result<Option<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Config(format!(
                    "Cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let file: KeyFile = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "{} must contain a JSON object with an \"api_key\" string: {}",
                self.path.display(),
                e
            ))
        })?;

        let key = file.api_key.trim();
        if key.is_empty() {
            return Err(Error::Config(format!(
                "{} contains an empty \"api_key\"",
                self.path.display()
            )));
        }

        Ok(Some(key.to_string()))
    }

    /// Writes `key` to the credential file, replacing previous content
    pub fn save(&self, key: &str) -> Result<()> {
        let body = serde_json::to_string(&KeyFile {
            api_key: key.to_string(),
        })?;
        fs::write(&self.path, body)?;
        tracing::debug!(path = %self.path.display(), "stored API key");
        Ok(())
    }

    /// Returns the stored key, prompting for and persisting one if absent
    pub fn api_key(&self, prompt: &mut dyn KeyPrompt) -> Result<String> {
        if let Some(key) = self.load()? {
            return Ok(key);
        }

        let key = prompt.ask()?.trim().to_string();
        if key.is_empty() {
            return Err(Error::Config("No API key entered".to_string()));
        }

        self.save(&key)?;
        Ok(key)
    }
}

/// Picks the key to use: an explicit key wins and is never persisted
pub fn resolve_api_key(
    explicit: Option<&str>,
    store: &CredentialStore,
    prompt: &mut dyn KeyPrompt,
) -> Result<String> {
    match explicit.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => store.api_key(prompt),
    }
}
