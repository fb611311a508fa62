//! Remote login credentials carried by every leaf pane.

use std::fmt;
use std::path::Path;

use crate::session::SessionError;

/// Target host, login user and authentication secret for one remote shell.
///
/// Leaves share a single `Arc<Credentials>`; the secret never appears in
/// `Debug` output or in a persisted layout.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub auth_secret: String,
}

impl Credentials {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        auth_secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            auth_secret: auth_secret.into(),
        }
    }

    /// Read the secret from `path`, rejecting files larger than `max_bytes`.
    ///
    /// The size is checked from metadata before the file is read, so an
    /// oversized key never reaches memory or the network.
    pub fn from_key_file(
        host: impl Into<String>,
        username: impl Into<String>,
        path: &Path,
        max_bytes: usize,
    ) -> Result<Self, SessionError> {
        let len = std::fs::metadata(path)?.len();
        if len > max_bytes as u64 {
            return Err(SessionError::SecretTooLarge {
                size: len as usize,
                max: max_bytes,
            });
        }
        let secret = std::fs::read_to_string(path)?;
        let creds = Self::new(host, username, secret);
        creds.check_secret_size(max_bytes)?;
        Ok(creds)
    }

    /// Reject secrets over `max_bytes`.
    pub fn check_secret_size(&self, max_bytes: usize) -> Result<(), SessionError> {
        let size = self.auth_secret.len();
        if size > max_bytes {
            return Err(SessionError::SecretTooLarge {
                size,
                max: max_bytes,
            });
        }
        Ok(())
    }

    /// `user@host` label used in pane titles.
    pub fn label(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }

    /// Home directory the remote shell reports as `~`.
    pub fn home_dir(&self) -> String {
        if self.username == "root" {
            "/root".to_string()
        } else {
            format!("/home/{}", self.username)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("auth_secret", &"<redacted>")
            .finish()
    }
}
