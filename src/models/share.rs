use super::serde_helpers::{empty_secret_as_none, empty_string_as_none, trimmed};
use serde::Deserialize;
use std::{fmt, path::PathBuf};

/// A network share that should be mounted.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct NetworkShare {
    #[serde(deserialize_with = "trimmed")]
    pub server: String,

    #[serde(deserialize_with = "trimmed")]
    pub share: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "empty_secret_as_none")]
    pub password: Option<String>,
}

impl NetworkShare {
    pub fn new(server: &str, share: &str, username: Option<&str>, password: Option<&str>) -> Self {
        NetworkShare {
            server: server.to_string(),
            share: share.to_string(),
            username: username.map(String::from),
            password: password.map(String::from),
        }
    }

    pub fn key(&self) -> ShareKey {
        ShareKey::new(&self.server, &self.share, self.username.as_deref())
    }

    /// UNC-style source, e.g. `//nas/cameras`.
    pub fn source(&self) -> String {
        format!("//{}/{}", self.server, self.share)
    }
}

// Hand-written so passwords never end up in logs.
impl fmt::Debug for NetworkShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkShare")
            .field("server", &self.server)
            .field("share", &self.share)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Identity of a share: server, share name and username.
///
/// A missing username is stored as the empty string so that a guest share
/// configured without a username matches a guest mount found in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShareKey {
    pub server: String,
    pub share: String,
    pub username: String,
}

impl ShareKey {
    pub fn new(server: &str, share: &str, username: Option<&str>) -> Self {
        ShareKey {
            server: server.to_string(),
            share: share.to_string(),
            username: username.unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for ShareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.username.is_empty() {
            write!(f, "//{}/{}", self.server, self.share)
        } else {
            write!(f, "//{}/{} (user {})", self.server, self.share, self.username)
        }
    }
}

/// A managed CIFS mount found in the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub server: String,
    pub share: String,
    pub username: Option<String>,
    pub mount_point: PathBuf,
}

impl Mount {
    pub fn key(&self) -> ShareKey {
        ShareKey::new(&self.server, &self.share, self.username.as_deref())
    }

    pub fn source(&self) -> String {
        format!("//{}/{}", self.server, self.share)
    }
}
