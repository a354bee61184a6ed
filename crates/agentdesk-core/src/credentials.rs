//! Session credentials passed explicitly to every fetch.

use std::fmt;

/// Agent identity and session token issued by the server at login.
///
/// Fetch layers receive this as an argument rather than reading it from
/// process-wide storage.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub agent_id: String,
    token: String,
}

impl Credentials {
    pub fn new(agent_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            token: token.into(),
        }
    }

    /// Credentials for sources that do not authenticate.
    pub fn anonymous() -> Self {
        Self::new("", "")
    }

    pub fn is_anonymous(&self) -> bool {
        self.agent_id.is_empty() && self.token.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("agent_id", &self.agent_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
