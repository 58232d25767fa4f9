//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! services. The intent is to avoid reading process-wide environment
//! variables during request handling, which can lead to inconsistent
//! behaviour in multi-threaded runtimes and test harnesses.

use crate::{OpxError, OpxResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default lifetime of a login session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Default lifetime of a password-reset token.
pub const DEFAULT_RESET_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_url: String,
    upload_dir: PathBuf,
    session_ttl: Duration,
    bind_addr: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    /// Returns `OpxError::InvalidInput` if the database URL or bind address
    /// is empty, or if `session_ttl` is zero.
    pub fn new(
        database_url: String,
        upload_dir: PathBuf,
        session_ttl: Duration,
        bind_addr: String,
    ) -> OpxResult<Self> {
        if database_url.trim().is_empty() {
            return Err(OpxError::InvalidInput("database_url cannot be empty".into()));
        }
        if bind_addr.trim().is_empty() {
            return Err(OpxError::InvalidInput("bind_addr cannot be empty".into()));
        }
        if session_ttl.is_zero() {
            return Err(OpxError::InvalidInput("session_ttl cannot be zero".into()));
        }

        Ok(Self {
            database_url,
            upload_dir,
            session_ttl,
            bind_addr,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
}

/// Parse a session TTL from an optional env value given in minutes.
///
/// `None` or empty/whitespace input falls back to [`DEFAULT_SESSION_TTL`].
pub fn session_ttl_from_env_value(value: Option<String>) -> OpxResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_SESSION_TTL);
    };

    let minutes: u64 = value
        .parse()
        .map_err(|_| OpxError::InvalidInput(format!("invalid session TTL minutes: {value}")))?;
    if minutes == 0 {
        return Err(OpxError::InvalidInput("session TTL must be positive".into()));
    }
    Ok(Duration::from_secs(minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_database_url() {
        let err = CoreConfig::new(
            "  ".into(),
            PathBuf::from("/tmp/uploads"),
            DEFAULT_SESSION_TTL,
            "0.0.0.0:3000".into(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn session_ttl_defaults_when_unset() {
        assert_eq!(
            session_ttl_from_env_value(None).unwrap(),
            DEFAULT_SESSION_TTL
        );
        assert_eq!(
            session_ttl_from_env_value(Some("  ".into())).unwrap(),
            DEFAULT_SESSION_TTL
        );
    }

    #[test]
    fn session_ttl_parses_minutes() {
        assert_eq!(
            session_ttl_from_env_value(Some("90".into())).unwrap(),
            Duration::from_secs(90 * 60)
        );
        assert!(session_ttl_from_env_value(Some("0".into())).is_err());
        assert!(session_ttl_from_env_value(Some("soon".into())).is_err());
    }
}
