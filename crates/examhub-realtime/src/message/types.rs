//! Client and server event definitions.
//!
//! Every frame is a JSON object tagged by its `type` field.

use serde::{Deserialize, Deserializer, Serialize};

use examhub_core::types::Identifier;

/// Events sent by a page to the status service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Announce the participant behind this connection.
    Connect {
        /// Synthesized `"{kind}_{id}"` identity.
        client_id: String,
        /// Participant id.
        #[serde(default)]
        user_id: Option<Identifier>,
        /// Participant kind; unknown kinds are ignored by the service.
        #[serde(default)]
        user_type: Option<String>,
    },
    /// Ask for an immediate `stats_update`.
    RequestStats,
    /// A student opened an exam.
    JoinExam {
        /// Exam id.
        exam_id: Identifier,
        /// Student id.
        student_id: Identifier,
    },
    /// A student moved to another question.
    ExamProgress {
        /// Exam id.
        exam_id: Identifier,
        /// Student id.
        student_id: Identifier,
        /// Index of the question on screen.
        #[serde(deserialize_with = "question_index")]
        current_question: u32,
    },
    /// A student submitted an exam.
    SubmitExam {
        /// Exam id.
        exam_id: Identifier,
        /// Student id.
        student_id: Identifier,
        /// Final score. Missing, null or non-numeric scores read as 0.
        #[serde(default, deserialize_with = "lenient_score")]
        score: f64,
    },
    /// Explicit sign-out.
    UserLogout {
        /// Participant id.
        user_id: Identifier,
    },
}

impl ClientEvent {
    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::RequestStats => "request_stats",
            Self::JoinExam { .. } => "join_exam",
            Self::ExamProgress { .. } => "exam_progress",
            Self::SubmitExam { .. } => "submit_exam",
            Self::UserLogout { .. } => "user_logout",
        }
    }
}

/// Events sent by the status service to pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Dashboard counters.
    StatsUpdate(StatsPayload),
    /// Entry for the admin notification feed.
    AdminNotification(NotificationPayload),
    /// The service rejected a frame.
    Error {
        /// Machine-readable code.
        code: String,
        /// Description.
        message: String,
    },
    /// Any type this client does not know about.
    #[serde(other)]
    Unknown,
}

/// Payload of a `stats_update` event. Counters may arrive as integers,
/// integral floats or numeric strings; missing, null or unreadable
/// counters read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Participants currently logged in.
    #[serde(default, deserialize_with = "lenient_count")]
    pub online_users: u64,
    /// Open (exam, student) sessions.
    #[serde(default, deserialize_with = "lenient_count")]
    pub active_sessions: u64,
    /// Exams submitted today.
    #[serde(default, deserialize_with = "lenient_count")]
    pub completed_today: u64,
    /// When the snapshot was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Payload of an `admin_notification` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Short heading.
    #[serde(default)]
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// ISO-8601 time of the underlying event.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A number as pages and services actually send it.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Unsigned(n) => *n as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }

    fn as_u64(&self) -> Option<u64> {
        if let Self::Unsigned(n) = self {
            return Some(*n);
        }
        if let Self::Text(s) = self {
            if let Ok(n) = s.trim().parse() {
                return Some(n);
            }
        }
        let value = self.as_f64()?;
        (value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64).then_some(value as u64)
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseNumber>::deserialize(deserializer)?
        .and_then(|n| n.as_u64())
        .unwrap_or(0))
}

fn question_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    LooseNumber::deserialize(deserializer)?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| serde::de::Error::custom("current_question must be a non-negative integer"))
}

fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    })
}
