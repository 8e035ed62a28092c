//! Admin display panel: the stats counters and the notification feed.
//!
//! Targets are named after the dashboard elements they back
//! (`online-users`, `active-sessions`, `completed-today`,
//! `admin-notifications`).

use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::message::types::{NotificationPayload, ServerEvent, StatsPayload};

use super::render;

/// Buffer of the panel update broadcast channel.
const UPDATE_BUFFER: usize = 64;

/// Numeric display targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayTarget {
    /// Participants logged in.
    OnlineUsers,
    /// Open exam sessions.
    ActiveSessions,
    /// Exams submitted today.
    CompletedToday,
}

impl DisplayTarget {
    /// All numeric targets, in dashboard order.
    pub const ALL: [Self; 3] = [Self::OnlineUsers, Self::ActiveSessions, Self::CompletedToday];

    /// Dashboard element id.
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::OnlineUsers => "online-users",
            Self::ActiveSessions => "active-sessions",
            Self::CompletedToday => "completed-today",
        }
    }
}

/// Last stats shown on the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsView {
    /// Participants logged in.
    pub online_users: u64,
    /// Open exam sessions.
    pub active_sessions: u64,
    /// Exams submitted today.
    pub completed_today: u64,
}

impl StatsView {
    /// Value of one target.
    pub fn get(&self, target: DisplayTarget) -> u64 {
        match target {
            DisplayTarget::OnlineUsers => self.online_users,
            DisplayTarget::ActiveSessions => self.active_sessions,
            DisplayTarget::CompletedToday => self.completed_today,
        }
    }
}

impl From<&StatsPayload> for StatsView {
    fn from(payload: &StatsPayload) -> Self {
        Self {
            online_users: payload.online_users,
            active_sessions: payload.active_sessions,
            completed_today: payload.completed_today,
        }
    }
}

/// One entry of the notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEntry {
    /// Heading.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Raw ISO-8601 timestamp from the service.
    pub timestamp: Option<String>,
}

impl NotificationEntry {
    /// Render as the dashboard alert card.
    pub fn render_html(&self) -> String {
        render::notification_html(self)
    }

    /// Local `HH:MM:SS` time of the entry.
    pub fn display_time(&self) -> String {
        render::display_time(self.timestamp.as_deref())
    }
}

impl From<NotificationPayload> for NotificationEntry {
    fn from(payload: NotificationPayload) -> Self {
        Self {
            title: payload.title,
            message: payload.message,
            timestamp: payload.timestamp,
        }
    }
}

/// Change published to panel subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelUpdate {
    /// New counter values.
    Stats(StatsView),
    /// A notification was prepended to the feed.
    Notification(NotificationEntry),
}

#[derive(Debug)]
struct PanelState {
    stats: Option<StatsView>,
    feed: VecDeque<NotificationEntry>,
    waiting: bool,
}

/// In-process stand-in for the dashboard elements driven by the client.
#[derive(Debug)]
pub struct AdminPanel {
    capacity: usize,
    state: RwLock<PanelState>,
    updates: broadcast::Sender<PanelUpdate>,
}

impl AdminPanel {
    /// Create an empty panel whose feed keeps at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        Self {
            capacity,
            state: RwLock::new(PanelState {
                stats: None,
                feed: VecDeque::with_capacity(capacity + 1),
                waiting: true,
            }),
            updates,
        }
    }

    /// Apply one decoded server event. Unknown events are ignored.
    pub fn apply(&self, event: ServerEvent) {
        match event {
            ServerEvent::StatsUpdate(payload) => self.update_stats(&payload),
            ServerEvent::AdminNotification(payload) => self.push_notification(payload.into()),
            ServerEvent::Error { code, message } => {
                debug!(code = %code, message = %message, "Status service rejected a frame");
            }
            ServerEvent::Unknown => trace!("Ignoring unknown server event"),
        }
    }

    fn update_stats(&self, payload: &StatsPayload) {
        let view = StatsView::from(payload);
        self.write().stats = Some(view);
        let _ = self.updates.send(PanelUpdate::Stats(view));
    }

    fn push_notification(&self, entry: NotificationEntry) {
        {
            let mut state = self.write();
            state.waiting = false;
            state.feed.push_front(entry.clone());
            while state.feed.len() > self.capacity {
                state.feed.pop_back();
            }
        }
        let _ = self.updates.send(PanelUpdate::Notification(entry));
    }

    /// Text of a numeric target; `None` until the first stats update.
    pub fn text(&self, target: DisplayTarget) -> Option<String> {
        self.read().stats.map(|s| s.get(target).to_string())
    }

    /// Last stats received.
    pub fn stats(&self) -> Option<StatsView> {
        self.read().stats
    }

    /// Feed entries, newest first.
    pub fn notifications(&self) -> Vec<NotificationEntry> {
        self.read().feed.iter().cloned().collect()
    }

    /// Feed rendered as HTML cards, newest first.
    pub fn render_feed(&self) -> Vec<String> {
        self.read()
            .feed
            .iter()
            .map(NotificationEntry::render_html)
            .collect()
    }

    /// Whether the "waiting for connection" placeholder is still shown.
    pub fn is_waiting(&self) -> bool {
        self.read().waiting
    }

    /// Maximum feed length.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Receive every subsequent panel change.
    pub fn subscribe(&self) -> broadcast::Receiver<PanelUpdate> {
        self.updates.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, PanelState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PanelState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
