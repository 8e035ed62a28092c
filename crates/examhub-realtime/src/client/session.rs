//! The real-time client session.
//!
//! A [`RealtimeClient`] is built once by page bootstrap code and cloned into
//! whatever handlers need it. It owns at most one link at a time.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use examhub_core::config::ClientConfig;
use examhub_core::error::AppError;
use examhub_core::types::{Identifier, Participant, ParticipantKind};

use crate::message::serializer;
use crate::message::types::ClientEvent;
use crate::transport::{Connector, Link, WsConnector};

use super::panel::AdminPanel;
use super::state::ConnectionState;

/// Handle to the page's real-time session. Cheap to clone.
#[derive(Clone)]
pub struct RealtimeClient {
    shared: Arc<Shared>,
}

struct Shared {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    panel: AdminPanel,
    session: Mutex<Session>,
}

#[derive(Default)]
struct Session {
    participant: Option<Participant>,
    state: ConnectionState,
    outbound: Option<mpsc::Sender<String>>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
    /// Bumped whenever the current link is replaced or torn down, so that
    /// stale connect attempts and readers leave the session alone.
    generation: u64,
}

impl Session {
    fn teardown(&mut self) {
        self.outbound = None;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.writer = None;
        self.participant = None;
        self.state = ConnectionState::Disconnected;
        self.generation += 1;
    }
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.lock();
        f.debug_struct("RealtimeClient")
            .field("endpoint", &self.shared.config.endpoint)
            .field("state", &session.state)
            .field("participant", &session.participant)
            .finish()
    }
}

impl RealtimeClient {
    /// Create a disconnected client using the given transport.
    pub fn new(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let panel = AdminPanel::new(config.notification_capacity);
        Self {
            shared: Arc::new(Shared {
                config,
                connector,
                panel,
                session: Mutex::new(Session::default()),
            }),
        }
    }

    /// Create a disconnected client that talks WebSocket.
    pub fn websocket(config: ClientConfig) -> Self {
        Self::new(config, Arc::new(WsConnector))
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Whether `send` currently delivers.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Participant of the current (or last attempted) session.
    pub fn participant(&self) -> Option<Participant> {
        self.lock().participant.clone()
    }

    /// The display panel fed by inbound events.
    pub fn panel(&self) -> &AdminPanel {
        &self.shared.panel
    }

    /// Endpoint this client connects to.
    pub fn endpoint(&self) -> &str {
        &self.shared.config.endpoint
    }

    /// Connect as `participant_id` of the given kind.
    ///
    /// No-op when a session for the same id is already open or opening.
    /// A session for a different id is closed first. Once the link is open
    /// a `connect` event is sent, followed by `request_stats` for admins.
    ///
    /// Connection failures are logged, leave the client `Disconnected`, and
    /// are returned; nothing retries.
    pub async fn connect(
        &self,
        participant_id: impl Into<Identifier>,
        kind: ParticipantKind,
    ) -> Result<(), AppError> {
        let participant = Participant::new(participant_id, kind)?;
        self.connect_as(participant).await
    }

    /// Connect as an already validated participant. See [`Self::connect`].
    pub async fn connect_as(&self, participant: Participant) -> Result<(), AppError> {
        let generation = {
            let mut session = self.lock();
            let same_id = session
                .participant
                .as_ref()
                .is_some_and(|p| p.id == participant.id);

            if same_id && session.state != ConnectionState::Disconnected {
                debug!(
                    client_id = %participant.client_id(),
                    state = %session.state,
                    "Already connected, ignoring connect"
                );
                return Ok(());
            }

            if session.state != ConnectionState::Disconnected {
                info!(
                    previous = ?session.participant.as_ref().map(Participant::client_id),
                    next = %participant.client_id(),
                    "Replacing real-time session"
                );
            }

            session.teardown();
            session.participant = Some(participant.clone());
            session.state = ConnectionState::Connecting;
            session.generation
        };

        let endpoint = self.shared.config.endpoint.clone();
        let link = match self
            .shared
            .connector
            .open(&endpoint, self.shared.config.outbound_buffer_size.max(1))
            .await
        {
            Ok(link) => link,
            Err(e) => {
                error!(
                    endpoint = %endpoint,
                    client_id = %participant.client_id(),
                    error = %e,
                    "Real-time connection failed"
                );
                let mut session = self.lock();
                if session.generation == generation {
                    session.state = ConnectionState::Disconnected;
                }
                return Err(e);
            }
        };

        let Link {
            outbound,
            inbound,
            writer,
        } = link;

        {
            let mut session = self.lock();
            if session.generation != generation {
                debug!(
                    client_id = %participant.client_id(),
                    "Connect attempt superseded, dropping link"
                );
                return Ok(());
            }

            session.state = ConnectionState::Connected;
            session.outbound = Some(outbound);
            session.writer = writer;
            session.reader = Some(tokio::spawn(read_loop(
                Arc::downgrade(&self.shared),
                inbound,
                generation,
            )));
        }

        info!(
            endpoint = %endpoint,
            client_id = %participant.client_id(),
            "Real-time connection established"
        );

        self.send(&ClientEvent::Connect {
            client_id: participant.client_id(),
            user_id: Some(participant.id.clone()),
            user_type: Some(participant.kind.as_str().to_string()),
        });

        if participant.is_admin() {
            self.send(&ClientEvent::RequestStats);
        }

        Ok(())
    }

    /// Best-effort send.
    ///
    /// Delivers only while `Connected`; otherwise, or when the outbound
    /// queue is full, the event is dropped. Returns whether the event was
    /// queued on the link. Nothing confirms delivery to the service.
    pub fn send(&self, event: &ClientEvent) -> bool {
        let session = self.lock();
        if session.state != ConnectionState::Connected {
            trace!(event = event.kind(), "Not connected, dropping event");
            return false;
        }
        let Some(outbound) = session.outbound.as_ref() else {
            return false;
        };

        let frame = match serializer::encode(event) {
            Ok(frame) => frame,
            Err(e) => {
                error!(event = event.kind(), error = %e, "Failed to encode event");
                return false;
            }
        };

        match outbound.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(event = event.kind(), "Outbound queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(event = event.kind(), "Link closed, dropping event");
                false
            }
        }
    }

    /// Announce that a student opened an exam.
    pub fn join_exam(&self, exam_id: impl Into<Identifier>, student_id: impl Into<Identifier>) -> bool {
        self.send(&ClientEvent::JoinExam {
            exam_id: exam_id.into(),
            student_id: student_id.into(),
        })
    }

    /// Announce the question a student is on.
    pub fn update_exam_progress(
        &self,
        exam_id: impl Into<Identifier>,
        student_id: impl Into<Identifier>,
        current_question: u32,
    ) -> bool {
        self.send(&ClientEvent::ExamProgress {
            exam_id: exam_id.into(),
            student_id: student_id.into(),
            current_question,
        })
    }

    /// Announce a submitted exam. A non-finite score is sent as 0, since
    /// JSON cannot carry it.
    pub fn submit_exam(
        &self,
        exam_id: impl Into<Identifier>,
        student_id: impl Into<Identifier>,
        score: f64,
    ) -> bool {
        let score = if score.is_finite() {
            score
        } else {
            warn!(score, "Non-finite exam score, sending 0");
            0.0
        };
        self.send(&ClientEvent::SubmitExam {
            exam_id: exam_id.into(),
            student_id: student_id.into(),
            score,
        })
    }

    /// Announce an explicit sign-out.
    pub fn logout(&self, user_id: impl Into<Identifier>) -> bool {
        self.send(&ClientEvent::UserLogout {
            user_id: user_id.into(),
        })
    }

    /// Close the link, if any, and reset to `Disconnected`. Idempotent.
    pub fn disconnect(&self) {
        let mut session = self.lock();
        if session.state != ConnectionState::Disconnected {
            info!(
                client_id = ?session.participant.as_ref().map(Participant::client_id),
                "Disconnecting real-time session"
            );
        }
        session.teardown();
    }

    /// Disconnect and wait, bounded by `flush_timeout_ms`, for frames that
    /// were already queued to reach the transport.
    pub async fn shutdown(&self) {
        let writer = {
            let mut session = self.lock();
            let writer = session.writer.take();
            session.teardown();
            writer
        };

        if let Some(writer) = writer {
            let timeout = Duration::from_millis(self.shared.config.flush_timeout_ms);
            if tokio::time::timeout(timeout, writer).await.is_err() {
                warn!("Timed out flushing real-time link");
            }
        }
    }

    /// Decode and apply one inbound frame. Malformed frames are logged and
    /// discarded.
    pub fn handle_frame(&self, raw: &str) {
        dispatch_frame(&self.shared.panel, raw);
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.shared.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn dispatch_frame(panel: &AdminPanel, raw: &str) {
    match serializer::decode_server(raw) {
        Ok(event) => panel.apply(event),
        Err(e) => warn!(error = %e, "Discarding malformed real-time frame"),
    }
}

async fn read_loop(shared: Weak<Shared>, mut inbound: mpsc::Receiver<String>, generation: u64) {
    while let Some(frame) = inbound.recv().await {
        let Some(shared) = shared.upgrade() else {
            return;
        };
        dispatch_frame(&shared.panel, &frame);
    }

    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut session = shared.session.lock().unwrap_or_else(|e| e.into_inner());
    if session.generation == generation && session.state == ConnectionState::Connected {
        info!("Real-time link closed by peer");
        session.state = ConnectionState::Disconnected;
        session.outbound = None;
        session.reader = None;
        session.writer = None;
    }
}
