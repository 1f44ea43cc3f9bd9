use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unique identifier for a guestbook message.
///
/// A string of decimal digits. Numerically larger ids were inserted later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Numeric value of the id, if it is made of digits only.
    pub fn as_number(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single guestbook entry.
///
/// Wire and storage form: `{"id", "name", "message", "createdAt"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub name: String,
    #[serde(rename = "message", alias = "text")]
    pub text: String,
    /// Epoch milliseconds at insertion. Display only, not part of identity.
    #[serde(rename = "createdAt")]
    pub created_at_millis: i64,
}

/// A validated append request: both fields present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub text: String,
}

impl Submission {
    /// Validate author input. Surrounding whitespace is dropped.
    ///
    /// Fails with [`Error::InvalidInput`] naming every blank field.
    pub fn new(name: &str, text: &str) -> Result<Self> {
        let name = name.trim();
        let text = text.trim();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if text.is_empty() {
            missing.push("message");
        }
        if !missing.is_empty() {
            return Err(Error::InvalidInput { missing });
        }

        Ok(Self {
            name: name.to_string(),
            text: text.to_string(),
        })
    }

    pub(crate) fn into_message(self, id: MessageId, created_at_millis: i64) -> Message {
        Message {
            id,
            name: self.name,
            text: self.text,
            created_at_millis,
        }
    }
}
