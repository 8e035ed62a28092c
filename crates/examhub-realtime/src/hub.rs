//! Status service hub. Routes client events, tracks presence and exams,
//! and broadcasts notifications and stats to admin connections.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use examhub_core::config::RealtimeConfig;
use examhub_core::types::{ConnectionId, Identifier, Participant, ParticipantKind};

use crate::connection::{ConnectionHandle, ConnectionPool, SocketSession};
use crate::exam::{DailyCompletions, ExamSessionTracker};
use crate::message::types::{ClientEvent, ServerEvent, StatsPayload};
use crate::message::{builder, serializer, validator};
use crate::metrics::HubMetrics;
use crate::presence::PresenceTracker;

/// Shared state of the status service.
pub struct RealtimeHub {
    config: RealtimeConfig,
    pool: ConnectionPool,
    presence: PresenceTracker,
    exams: ExamSessionTracker,
    completions: DailyCompletions,
    metrics: HubMetrics,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("connections", &self.pool.connection_count())
            .field("online", &self.presence.online_count())
            .finish()
    }
}

impl RealtimeHub {
    /// Create a hub with empty state.
    pub fn new(config: RealtimeConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        info!(
            logout_grace_seconds = config.logout_grace_seconds,
            "Status hub initialized"
        );
        Self {
            config,
            pool: ConnectionPool::new(),
            presence: PresenceTracker::new(),
            exams: ExamSessionTracker::new(),
            completions: DailyCompletions::new(),
            metrics: HubMetrics::new(),
            shutdown_tx,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Registered connections.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Login presence.
    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Open exam sessions.
    pub fn exams(&self) -> &ExamSessionTracker {
        &self.exams
    }

    /// Counters.
    pub fn metrics(&self) -> &HubMetrics {
        &self.metrics
    }

    /// Subscribe to the shutdown signal sent by [`close_all`](Self::close_all).
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Accept a new socket. The receiver yields the frames to write to it.
    pub fn open_socket(&self) -> (SocketSession, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let socket = SocketSession::new(tx);
        self.metrics.socket_opened();
        debug!(conn_id = %socket.id, "Socket opened");
        (socket, rx)
    }

    /// Current counters, computed from live state.
    pub fn stats(&self) -> StatsPayload {
        StatsPayload {
            online_users: self.presence.online_count() as u64,
            active_sessions: self.exams.active_count() as u64,
            completed_today: self.completions.count(DailyCompletions::today()),
            timestamp: Some(builder::now_timestamp()),
        }
    }

    /// Process one inbound text frame from `socket`.
    ///
    /// Frames that fail validation or decoding are answered with an
    /// `INVALID_MESSAGE` error on the same socket; the socket stays open.
    pub fn handle_frame(self: &Arc<Self>, socket: &mut SocketSession, raw: &str) {
        let event = match validator::validate_frame(raw, self.config.max_message_bytes)
            .and_then(|()| serializer::decode_client(raw))
        {
            Ok(event) => event,
            Err(e) => {
                self.metrics.frame_rejected();
                debug!(conn_id = %socket.id, error = %e, "Rejected inbound frame");
                self.reply(socket, &builder::error("INVALID_MESSAGE", e.message));
                return;
            }
        };

        self.metrics.frame_received();
        debug!(conn_id = %socket.id, kind = event.kind(), "Inbound event");

        match event {
            ClientEvent::Connect {
                client_id,
                user_id,
                user_type,
            } => self.handle_connect(socket, client_id, user_id, user_type.as_deref()),
            ClientEvent::UserLogout { user_id } => self.handle_logout(&user_id),
            ClientEvent::JoinExam {
                exam_id,
                student_id,
            } => {
                self.exams.join(&exam_id, &student_id);
                info!(exam_id = %exam_id, student_id = %student_id, "Exam started");
                self.broadcast_to_admins(&builder::exam_started(&student_id, &exam_id));
                self.broadcast_stats();
            }
            ClientEvent::ExamProgress {
                student_id,
                current_question,
                ..
            } => {
                self.broadcast_to_admins(&builder::exam_progress(&student_id, current_question));
            }
            ClientEvent::SubmitExam {
                exam_id,
                student_id,
                score,
            } => {
                if !self.exams.leave(&exam_id, &student_id) {
                    debug!(exam_id = %exam_id, student_id = %student_id, "Submit without open session");
                }
                let today = DailyCompletions::today();
                self.completions.prune_before(today);
                let completed_today = self.completions.record(today);
                info!(
                    exam_id = %exam_id,
                    student_id = %student_id,
                    score,
                    completed_today,
                    "Exam completed"
                );
                self.broadcast_to_admins(&builder::exam_completed(&student_id, score));
                self.broadcast_stats();
            }
            ClientEvent::RequestStats => {
                self.reply(socket, &ServerEvent::StatsUpdate(self.stats()));
            }
        }
    }

    fn handle_connect(
        self: &Arc<Self>,
        socket: &mut SocketSession,
        client_id: String,
        user_id: Option<Identifier>,
        user_type: Option<&str>,
    ) {
        let Some(kind) = user_type.and_then(|t| t.parse::<ParticipantKind>().ok()) else {
            debug!(conn_id = %socket.id, user_type = ?user_type, "Ignoring connect with unknown participant kind");
            return;
        };
        let Some(participant) = user_id.and_then(|id| Participant::new(id, kind).ok()) else {
            debug!(conn_id = %socket.id, "Ignoring anonymous connect");
            return;
        };

        if let Some(previous) = socket.participant.take() {
            if previous.id != participant.id {
                self.release(previous, socket.id);
            }
        }

        let handle = Arc::new(ConnectionHandle::new(
            socket.id,
            participant.clone(),
            client_id,
            socket.sender.clone(),
        ));
        if let Some(replaced) = self.pool.insert(handle) {
            if replaced.id != socket.id {
                debug!(
                    user_id = %participant.id,
                    old_conn = %replaced.id,
                    new_conn = %socket.id,
                    "Replaced older connection"
                );
            }
        }
        socket.participant = Some(participant.clone());

        if self.presence.login(&participant.id, participant.kind) {
            info!(user_id = %participant.id, kind = %participant.kind, "User logged in");
            self.broadcast_to_admins(&builder::user_logged_in(&participant));
            self.broadcast_stats();
        } else {
            debug!(user_id = %participant.id, "Participant reconnected");
        }
    }

    fn handle_logout(&self, user_id: &Identifier) {
        let Some(kind) = self.presence.logout(user_id) else {
            debug!(user_id = %user_id, "Logout for participant not logged in");
            return;
        };
        self.pool.remove(user_id);
        info!(user_id = %user_id, "User logged out");
        self.announce_logout(user_id.clone(), kind);
    }

    /// Release a closed socket.
    ///
    /// The participant's connection is dropped if it is still this socket;
    /// the logout is announced only if they have not come back once the
    /// grace period has elapsed.
    pub fn close_socket(self: &Arc<Self>, socket: SocketSession) {
        self.metrics.socket_closed();
        debug!(conn_id = %socket.id, "Socket closed");
        if let Some(participant) = socket.participant {
            self.release(participant, socket.id);
        }
    }

    fn release(self: &Arc<Self>, participant: Participant, conn_id: ConnectionId) {
        let Some(handle) = self.pool.remove_if_current(&participant.id, conn_id) else {
            return;
        };
        handle.mark_dead();

        let grace = Duration::from_secs(self.config.logout_grace_seconds);
        if grace.is_zero() {
            self.expire_if_absent(&participant.id);
            return;
        }

        let hub = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            hub.expire_if_absent(&participant.id);
        });
    }

    fn expire_if_absent(&self, user_id: &Identifier) {
        if self.pool.contains(user_id) {
            return;
        }
        if let Some(kind) = self.presence.logout(user_id) {
            info!(user_id = %user_id, "User did not reconnect, logged out");
            self.announce_logout(user_id.clone(), kind);
        }
    }

    fn announce_logout(&self, id: Identifier, kind: ParticipantKind) {
        let participant = Participant { id, kind };
        self.broadcast_to_admins(&builder::user_logged_out(&participant));
        self.broadcast_stats();
    }

    /// Send the current stats to every admin.
    pub fn broadcast_stats(&self) {
        self.broadcast_to_admins(&ServerEvent::StatsUpdate(self.stats()));
    }

    /// Send an event to every admin connection, dropping connections
    /// whose socket has gone away. Returns the number of admins reached.
    pub fn broadcast_to_admins(&self, event: &ServerEvent) -> usize {
        let frame = match serializer::encode(event) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to encode broadcast");
                return 0;
            }
        };

        let mut delivered = 0;
        for admin in self.pool.admins() {
            if admin.send(frame.clone()) {
                delivered += 1;
            } else if !admin.is_alive() {
                debug!(conn_id = %admin.id, user_id = %admin.participant.id, "Dropping dead admin connection");
                self.pool.remove_if_current(&admin.participant.id, admin.id);
            }
        }
        self.metrics.frames_sent(delivered as u64);
        delivered
    }

    fn reply(&self, socket: &SocketSession, event: &ServerEvent) {
        match serializer::encode(event) {
            Ok(frame) => {
                if socket.reply(frame) {
                    self.metrics.frames_sent(1);
                } else {
                    warn!(conn_id = %socket.id, "Reply dropped");
                }
            }
            Err(e) => warn!(conn_id = %socket.id, error = %e, "Failed to encode reply"),
        }
    }

    /// Disconnect everyone. Presence and exam state are left as they are.
    pub fn close_all(&self) {
        let _ = self.shutdown_tx.send(());
        let drained = self.pool.drain();
        for handle in &drained {
            handle.mark_dead();
        }
        info!(count = drained.len(), "Closed all connections");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::NotificationPayload;
    use serde_json::json;

    fn hub_with_grace(seconds: u64) -> Arc<RealtimeHub> {
        Arc::new(RealtimeHub::new(RealtimeConfig {
            logout_grace_seconds: seconds,
            ..RealtimeConfig::default()
        }))
    }

    fn connect(hub: &Arc<RealtimeHub>, socket: &mut SocketSession, id: &str, kind: &str) {
        let frame = json!({
            "type": "connect",
            "client_id": format!("{kind}_{id}"),
            "user_id": id,
            "user_type": kind,
        });
        hub.handle_frame(socket, &frame.to_string());
    }

    fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            events.push(serializer::decode_server(&frame).expect("server frame"));
        }
        events
    }

    fn titles(events: &[ServerEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                ServerEvent::AdminNotification(NotificationPayload { title, .. }) => {
                    Some(title.clone())
                }
                _ => None,
            })
            .collect()
    }

    fn last_stats(events: &[ServerEvent]) -> StatsPayload {
        events
            .iter()
            .rev()
            .find_map(|e| match e {
                ServerEvent::StatsUpdate(s) => Some(s.clone()),
                _ => None,
            })
            .expect("stats update")
    }

    #[tokio::test]
    async fn test_admin_sees_own_login() {
        let hub = hub_with_grace(10);
        let (mut admin, mut admin_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");

        let events = drain(&mut admin_rx);
        assert_eq!(titles(&events), vec!["User logged in"]);
        assert_eq!(last_stats(&events).online_users, 1);
    }

    #[tokio::test]
    async fn test_exam_lifecycle_updates_stats() {
        let hub = hub_with_grace(10);
        let (mut admin, mut admin_rx) = hub.open_socket();
        let (mut student, mut student_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        connect(&hub, &mut student, "12", "student");
        drain(&mut admin_rx);

        hub.handle_frame(&mut student, r#"{"type":"join_exam","exam_id":3,"student_id":12}"#);
        let events = drain(&mut admin_rx);
        assert_eq!(titles(&events), vec!["Exam started"]);
        let stats = last_stats(&events);
        assert_eq!((stats.online_users, stats.active_sessions), (2, 1));

        hub.handle_frame(
            &mut student,
            r#"{"type":"exam_progress","exam_id":3,"student_id":12,"current_question":4}"#,
        );
        let events = drain(&mut admin_rx);
        assert_eq!(titles(&events), vec!["Exam progress"]);
        assert!(!events.iter().any(|e| matches!(e, ServerEvent::StatsUpdate(_))));

        hub.handle_frame(
            &mut student,
            r#"{"type":"submit_exam","exam_id":3,"student_id":12,"score":8.5}"#,
        );
        let events = drain(&mut admin_rx);
        assert_eq!(titles(&events), vec!["Exam completed"]);
        let stats = last_stats(&events);
        assert_eq!((stats.active_sessions, stats.completed_today), (0, 1));

        assert!(drain(&mut student_rx).is_empty());
    }

    #[tokio::test]
    async fn test_request_stats_replies_to_requester_only() {
        let hub = hub_with_grace(10);
        let (mut admin, mut admin_rx) = hub.open_socket();
        let (mut student, mut student_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        connect(&hub, &mut student, "12", "student");
        drain(&mut admin_rx);

        hub.handle_frame(&mut student, r#"{"type":"request_stats"}"#);

        assert!(drain(&mut admin_rx).is_empty());
        let events = drain(&mut student_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(last_stats(&events).online_users, 2);
    }

    #[tokio::test]
    async fn test_malformed_frame_gets_error_reply() {
        let hub = hub_with_grace(10);
        let (mut socket, mut rx) = hub.open_socket();

        hub.handle_frame(&mut socket, "{not json");
        hub.handle_frame(&mut socket, r#"{"type":"teleport"}"#);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(
            |e| matches!(e, ServerEvent::Error { code, .. } if code == "INVALID_MESSAGE")
        ));
        assert_eq!(hub.metrics().snapshot().frames_rejected, 2);
    }

    #[tokio::test]
    async fn test_connect_requires_known_kind_and_id() {
        let hub = hub_with_grace(10);
        let (mut socket, _rx) = hub.open_socket();

        connect(&hub, &mut socket, "5", "proctor");
        connect(&hub, &mut socket, "null", "student");
        hub.handle_frame(&mut socket, r#"{"type":"connect","client_id":"student_x"}"#);

        assert_eq!(hub.pool().connection_count(), 0);
        assert_eq!(hub.presence().online_count(), 0);
    }

    #[tokio::test]
    async fn test_explicit_logout() {
        let hub = hub_with_grace(10);
        let (mut admin, mut admin_rx) = hub.open_socket();
        let (mut student, _student_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        connect(&hub, &mut student, "12", "student");
        drain(&mut admin_rx);

        hub.handle_frame(&mut student, r#"{"type":"user_logout","user_id":12}"#);

        let events = drain(&mut admin_rx);
        assert_eq!(titles(&events), vec!["User logged out"]);
        assert_eq!(last_stats(&events).online_users, 1);
        assert!(!hub.pool().contains(&Identifier::new("12")));

        hub.handle_frame(&mut student, r#"{"type":"user_logout","user_id":12}"#);
        assert!(drain(&mut admin_rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_within_grace_is_silent() {
        let hub = hub_with_grace(10);
        let (mut admin, mut admin_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        let (mut first, _first_rx) = hub.open_socket();
        connect(&hub, &mut first, "12", "student");
        drain(&mut admin_rx);

        hub.close_socket(first);
        tokio::time::sleep(Duration::from_secs(3)).await;
        let (mut second, _second_rx) = hub.open_socket();
        connect(&hub, &mut second, "12", "student");
        tokio::time::sleep(Duration::from_secs(15)).await;

        assert!(drain(&mut admin_rx).is_empty());
        assert!(hub.presence().is_logged_in(&Identifier::new("12")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_announced_after_grace() {
        let hub = hub_with_grace(10);
        let (mut admin, mut admin_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        let (mut student, _student_rx) = hub.open_socket();
        connect(&hub, &mut student, "12", "student");
        drain(&mut admin_rx);

        hub.close_socket(student);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut admin_rx).is_empty());

        tokio::time::sleep(Duration::from_secs(6)).await;
        let events = drain(&mut admin_rx);
        assert_eq!(titles(&events), vec!["User logged out"]);
        assert_eq!(last_stats(&events).online_users, 1);
    }

    #[tokio::test]
    async fn test_stale_close_keeps_newer_connection() {
        let hub = hub_with_grace(0);
        let (mut first, _first_rx) = hub.open_socket();
        let (mut second, _second_rx) = hub.open_socket();
        connect(&hub, &mut first, "12", "student");
        connect(&hub, &mut second, "12", "student");

        hub.close_socket(first);

        assert!(hub.pool().contains(&Identifier::new("12")));
        assert!(hub.presence().is_logged_in(&Identifier::new("12")));
    }

    #[tokio::test]
    async fn test_dead_admin_removed_on_broadcast() {
        let hub = hub_with_grace(10);
        let (mut admin, admin_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        drop(admin_rx);

        assert_eq!(hub.broadcast_to_admins(&builder::notification("t", "m")), 0);
        assert!(!hub.pool().contains(&Identifier::new("1")));
    }

    #[tokio::test]
    async fn test_zero_channel_buffer_still_serves() {
        let hub = Arc::new(RealtimeHub::new(RealtimeConfig {
            channel_buffer_size: 0,
            ..RealtimeConfig::default()
        }));
        let (mut admin, mut admin_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");

        assert!(hub.pool().contains(&Identifier::new("1")));
        assert_eq!(titles(&drain(&mut admin_rx)), vec!["User logged in"]);
    }

    #[tokio::test]
    async fn test_null_score_still_completes_exam() {
        let hub = hub_with_grace(10);
        let (mut admin, mut admin_rx) = hub.open_socket();
        let (mut student, mut student_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        connect(&hub, &mut student, "12", "student");
        hub.handle_frame(&mut student, r#"{"type":"join_exam","exam_id":3,"student_id":12}"#);
        drain(&mut admin_rx);

        hub.handle_frame(
            &mut student,
            r#"{"type":"submit_exam","exam_id":3,"student_id":12,"score":null}"#,
        );

        let stats = last_stats(&drain(&mut admin_rx));
        assert_eq!((stats.active_sessions, stats.completed_today), (0, 1));
        assert!(drain(&mut student_rx).is_empty());
    }

    #[tokio::test]
    async fn test_metrics_track_sockets_and_frames() {
        let hub = hub_with_grace(0);
        let (mut admin, mut admin_rx) = hub.open_socket();
        let (mut student, _student_rx) = hub.open_socket();
        connect(&hub, &mut admin, "1", "admin");
        connect(&hub, &mut student, "12", "student");
        hub.handle_frame(&mut student, "{not json");
        hub.close_socket(student);

        let sent = drain(&mut admin_rx).len() as u64;
        let snapshot = hub.metrics().snapshot();
        assert_eq!(snapshot.sockets_opened, 2);
        assert_eq!(snapshot.sockets_closed, 1);
        assert_eq!(snapshot.frames_received, 2);
        assert_eq!(snapshot.frames_rejected, 1);
        assert_eq!(snapshot.frames_sent, sent + 1);
    }
}
