//! Participants of the real-time service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::Identifier;
use crate::error::AppError;

/// The two kinds of page users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    /// Dashboard operator; receives stats and notifications.
    Admin,
    /// Exam taker.
    #[default]
    Student,
}

impl ParticipantKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }

    /// Capitalized label used in notification text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Student => "Student",
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            other => Err(AppError::validation(format!(
                "Unknown participant kind: '{other}'"
            ))),
        }
    }
}

/// A participant identity: who is on the other end of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Participant id assigned by the web application.
    pub id: Identifier,
    /// Participant kind.
    pub kind: ParticipantKind,
}

impl Participant {
    /// Create a participant, rejecting blank ids.
    pub fn new(id: impl Into<Identifier>, kind: ParticipantKind) -> Result<Self, AppError> {
        let id = id.into();
        if id.is_blank() {
            return Err(AppError::validation("Participant id must not be empty"));
        }
        Ok(Self { id, kind })
    }

    /// Resolve a participant from page-supplied values.
    ///
    /// Returns `None` for anonymous pages (missing, empty or `"null"` id).
    /// An absent or unrecognized kind falls back to `student`.
    pub fn from_page(user_id: Option<&str>, user_type: Option<&str>) -> Option<Self> {
        let id = Identifier::new(user_id?.trim());
        if id.is_blank() {
            return None;
        }
        let kind = user_type
            .and_then(|t| t.parse().ok())
            .unwrap_or_default();
        Some(Self { id, kind })
    }

    /// Synthesized client identity, `"{kind}_{id}"`.
    pub fn client_id(&self) -> String {
        format!("{}_{}", self.kind, self.id)
    }

    /// Whether this participant is an admin.
    pub fn is_admin(&self) -> bool {
        self.kind == ParticipantKind::Admin
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.client_id())
    }
}
