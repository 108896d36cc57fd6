use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::warn;

/// File-backed stand-in for a browser cookie jar, holding one raw cookie
/// string. The backend issues `session_id` on every response; absence is a
/// valid state and resolves to the empty string, which the backend treats
/// as "create a new session".
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open_default() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(Self::at(config_dir.join("wanderlust").join("cookies")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// The current session id, or the empty string when none has been
    /// issued yet. Never fails: an unreadable or malformed cookie file is
    /// the same as no session.
    pub fn resolve(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(raw) => parse_session_id(&raw),
            Err(_) => String::new(),
        }
    }

    /// Persist the raw cookie string from a `Set-Cookie` header.
    pub fn store_cookie(&self, raw: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(error = %err, "could not create session directory");
                return;
            }
        }
        if let Err(err) = fs::write(&self.path, raw) {
            warn!(error = %err, "could not persist session cookie");
        }
    }
}

fn parse_session_id(raw: &str) -> String {
    let Ok(pattern) = Regex::new(r"(?:^|;)\s*session_id=([^;]+)") else {
        return String::new();
    };
    pattern
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_resolves_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("cookies"));
        assert_eq!(store.resolve(), "");
    }

    #[test]
    fn parses_session_id_from_raw_cookie() {
        assert_eq!(parse_session_id("session_id=abc123"), "abc123");
        assert_eq!(
            parse_session_id("theme=dark; session_id=abc123; lang=en"),
            "abc123"
        );
        assert_eq!(
            parse_session_id("session_id=abc123; Max-Age=3600; Path=/"),
            "abc123"
        );
    }

    #[test]
    fn unrelated_cookies_resolve_to_empty() {
        assert_eq!(parse_session_id(""), "");
        assert_eq!(parse_session_id("theme=dark; lang=en"), "");
        // Suffixed names must not match.
        assert_eq!(parse_session_id("old_session_id=zzz"), "");
    }

    #[test]
    fn store_then_resolve_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("nested").join("cookies"));
        store.store_cookie("session_id=9f8e7d; Max-Age=3600; Path=/");
        assert_eq!(store.resolve(), "9f8e7d");

        // A later cookie replaces the session wholesale.
        store.store_cookie("session_id=new-id; Max-Age=3600");
        assert_eq!(store.resolve(), "new-id");
    }
}
