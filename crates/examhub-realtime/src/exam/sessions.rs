//! Open exam sessions, keyed by exam then student.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use examhub_core::types::Identifier;

/// Tracks which students currently have which exams open.
#[derive(Debug, Default)]
pub struct ExamSessionTracker {
    /// Exam id → (student id → start time).
    sessions: DashMap<Identifier, HashMap<Identifier, DateTime<Utc>>>,
}

impl ExamSessionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a student opened an exam. Re-joining restarts the clock.
    pub fn join(&self, exam_id: &Identifier, student_id: &Identifier) {
        self.sessions
            .entry(exam_id.clone())
            .or_default()
            .insert(student_id.clone(), Utc::now());
    }

    /// Close a student's session. Exams without sessions are dropped.
    /// Returns whether a session existed.
    pub fn leave(&self, exam_id: &Identifier, student_id: &Identifier) -> bool {
        let removed = match self.sessions.get_mut(exam_id) {
            Some(mut students) => students.remove(student_id).is_some(),
            None => false,
        };
        self.sessions.remove_if(exam_id, |_, students| students.is_empty());
        removed
    }

    /// When the student opened the exam, if still open.
    pub fn started_at(&self, exam_id: &Identifier, student_id: &Identifier) -> Option<DateTime<Utc>> {
        self.sessions
            .get(exam_id)
            .and_then(|students| students.get(student_id).copied())
    }

    /// Total number of open (exam, student) sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of exams with at least one open session.
    pub fn exam_count(&self) -> usize {
        self.sessions.len()
    }
}
