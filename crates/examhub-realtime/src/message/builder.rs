//! Builders for the events the status service pushes to admins.

use chrono::Local;

use examhub_core::types::{Identifier, Participant};

use super::types::{NotificationPayload, ServerEvent, StatsPayload};

/// Current local time as RFC 3339.
pub fn now_timestamp() -> String {
    Local::now().to_rfc3339()
}

/// Build an admin notification stamped with the current time.
pub fn notification(title: &str, message: impl Into<String>) -> ServerEvent {
    ServerEvent::AdminNotification(NotificationPayload {
        title: title.to_string(),
        message: message.into(),
        timestamp: Some(now_timestamp()),
    })
}

/// Build a stats update stamped with the current time.
pub fn stats_update(online_users: u64, active_sessions: u64, completed_today: u64) -> ServerEvent {
    ServerEvent::StatsUpdate(StatsPayload {
        online_users,
        active_sessions,
        completed_today,
        timestamp: Some(now_timestamp()),
    })
}

/// A participant logged in for the first time.
pub fn user_logged_in(participant: &Participant) -> ServerEvent {
    notification(
        "User logged in",
        format!("{} ID {} logged in", participant.kind.label(), participant.id),
    )
}

/// A participant logged out or did not come back within the grace period.
pub fn user_logged_out(participant: &Participant) -> ServerEvent {
    notification(
        "User logged out",
        format!("{} ID {} logged out", participant.kind.label(), participant.id),
    )
}

/// A student opened an exam.
pub fn exam_started(student_id: &Identifier, exam_id: &Identifier) -> ServerEvent {
    notification(
        "Exam started",
        format!("Student {student_id} started exam {exam_id}"),
    )
}

/// A student moved to another question.
pub fn exam_progress(student_id: &Identifier, current_question: u32) -> ServerEvent {
    notification(
        "Exam progress",
        format!("Student {student_id} is on question {current_question}"),
    )
}

/// A student submitted an exam.
pub fn exam_completed(student_id: &Identifier, score: f64) -> ServerEvent {
    notification(
        "Exam completed",
        format!("Student {student_id} completed with score {score}"),
    )
}

/// Build an error reply.
pub fn error(code: &str, message: impl Into<String>) -> ServerEvent {
    ServerEvent::Error {
        code: code.to_string(),
        message: message.into(),
    }
}
