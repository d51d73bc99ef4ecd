use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session token issued by the authentication service.
///
/// Never parsed or validated here. It is attached to outgoing chat frames and
/// compared byte-for-byte to decide which messages are our own.
#[derive(Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Tokens end up in logs through `{:?}` far too easily.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} bytes>)", self.0.len())
    }
}
