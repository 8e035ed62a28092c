//! Exam activity: open sessions and daily completion counts.

pub mod completions;
pub mod sessions;

pub use completions::DailyCompletions;
pub use sessions::ExamSessionTracker;
