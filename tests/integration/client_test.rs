//! Integration tests driving the status service with the real client.

mod helpers;

use examhub_core::error::ErrorKind;
use examhub_core::types::{Identifier, ParticipantKind};
use examhub_realtime::RealtimeClient;
use examhub_realtime::client::panel::DisplayTarget;
use examhub_realtime::client::state::ConnectionState;

use helpers::{TestServer, eventually};

fn text(client: &RealtimeClient, target: DisplayTarget) -> Option<String> {
    client.panel().text(target)
}

fn has_notification(client: &RealtimeClient, title: &str, message: &str) -> bool {
    client
        .panel()
        .notifications()
        .iter()
        .any(|n| n.title == title && n.message == message)
}

#[tokio::test]
async fn test_admin_dashboard_follows_student_activity() {
    let server = TestServer::start(10).await;
    let admin = RealtimeClient::websocket(server.client_config());
    let student = RealtimeClient::websocket(server.client_config());

    admin.connect("1", ParticipantKind::Admin).await.expect("admin connect");
    eventually("admin sees itself online", || {
        text(&admin, DisplayTarget::OnlineUsers).as_deref() == Some("1")
    })
    .await;
    assert!(!admin.panel().is_waiting());

    student.connect("12", ParticipantKind::Student).await.expect("student connect");
    eventually("student login reaches admin", || {
        text(&admin, DisplayTarget::OnlineUsers).as_deref() == Some("2")
    })
    .await;

    assert!(student.join_exam("3", "12"));
    eventually("active session counted", || {
        text(&admin, DisplayTarget::ActiveSessions).as_deref() == Some("1")
    })
    .await;

    assert!(student.update_exam_progress("3", "12", 4));
    eventually("progress notification", || {
        has_notification(&admin, "Exam progress", "Student 12 is on question 4")
    })
    .await;

    assert!(student.submit_exam("3", "12", 7.5));
    eventually("completion counted", || {
        text(&admin, DisplayTarget::CompletedToday).as_deref() == Some("1")
            && text(&admin, DisplayTarget::ActiveSessions).as_deref() == Some("0")
    })
    .await;
    assert_eq!(
        admin.panel().notifications()[0].title,
        "Exam completed",
        "newest entry first"
    );

    // Students receive no dashboard traffic.
    assert!(student.panel().stats().is_none());
    assert!(student.panel().notifications().is_empty());

    admin.shutdown().await;
    student.shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_switching_identity_closes_previous_session() {
    let server = TestServer::start(0).await;
    let admin = RealtimeClient::websocket(server.client_config());
    admin.connect("1", ParticipantKind::Admin).await.expect("admin connect");

    let page = RealtimeClient::websocket(server.client_config());
    page.connect("5", ParticipantKind::Student).await.expect("connect as 5");
    eventually("student 5 online", || {
        server.hub.presence().is_logged_in(&Identifier::new("5"))
    })
    .await;

    page.connect("6", ParticipantKind::Student).await.expect("connect as 6");
    assert_eq!(page.participant().map(|p| p.client_id()).as_deref(), Some("student_6"));

    eventually("student 5 logged out, 6 logged in", || {
        !server.hub.presence().is_logged_in(&Identifier::new("5"))
            && server.hub.presence().is_logged_in(&Identifier::new("6"))
    })
    .await;
    eventually("admin told about the switch", || {
        has_notification(&admin, "User logged out", "Student ID 5 logged out")
    })
    .await;

    admin.shutdown().await;
    page.shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_explicit_logout_is_announced() {
    let server = TestServer::start(10).await;
    let admin = RealtimeClient::websocket(server.client_config());
    let student = RealtimeClient::websocket(server.client_config());
    admin.connect("1", ParticipantKind::Admin).await.expect("admin connect");
    student.connect("12", ParticipantKind::Student).await.expect("student connect");
    eventually("both online", || {
        text(&admin, DisplayTarget::OnlineUsers).as_deref() == Some("2")
    })
    .await;

    assert!(student.logout("12"));
    student.shutdown().await;

    eventually("logout announced without waiting for grace", || {
        has_notification(&admin, "User logged out", "Student ID 12 logged out")
            && text(&admin, DisplayTarget::OnlineUsers).as_deref() == Some("1")
    })
    .await;

    admin.shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_leaves_client_disconnected() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = RealtimeClient::websocket(examhub_core::config::ClientConfig {
        endpoint: format!("ws://{addr}/ws"),
        ..Default::default()
    });

    let err = client
        .connect("1", ParticipantKind::Admin)
        .await
        .expect_err("nothing is listening");
    assert_eq!(err.kind, ErrorKind::Connection);
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(!client.join_exam("3", "1"));
}

#[tokio::test]
async fn test_server_shutdown_disconnects_client() {
    let server = TestServer::start(10).await;
    let client = RealtimeClient::websocket(server.client_config());
    client.connect("1", ParticipantKind::Admin).await.expect("connect");
    eventually("connected and stats received", || {
        client.is_connected() && client.panel().stats().is_some()
    })
    .await;

    server.stop().await;

    eventually("client notices the close", || !client.is_connected()).await;
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(client.participant().map(|p| p.client_id()).as_deref(), Some("admin_1"));
}
