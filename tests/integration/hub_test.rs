//! Integration tests for the status service wire protocol.

mod helpers;

use std::time::Duration;

use serde_json::json;

use helpers::{
    TestServer, connect_raw, next_json, next_json_within, next_of_type, send_json,
    send_text,
};

fn connect_frame(id: &str, kind: &str) -> serde_json::Value {
    json!({
        "type": "connect",
        "client_id": format!("{kind}_{id}"),
        "user_id": id,
        "user_type": kind,
    })
}

#[tokio::test]
async fn test_malformed_frame_gets_error_and_socket_stays_open() {
    let server = TestServer::start(10).await;
    let mut socket = connect_raw(&server.endpoint()).await;

    send_text(&mut socket, "{this is not json").await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["code"], "INVALID_MESSAGE");

    send_json(&mut socket, json!({"type": "request_stats"})).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "stats_update");

    server.stop().await;
}

#[tokio::test]
async fn test_request_stats_goes_to_requester_only() {
    let server = TestServer::start(10).await;
    let mut admin = connect_raw(&server.endpoint()).await;
    send_json(&mut admin, connect_frame("1", "admin")).await;
    next_of_type(&mut admin, "stats_update").await;

    let mut student = connect_raw(&server.endpoint()).await;
    send_json(&mut student, connect_frame("12", "student")).await;
    let login = next_of_type(&mut admin, "stats_update").await;
    assert_eq!(login["online_users"], 2);

    send_json(&mut student, json!({"type": "request_stats"})).await;
    let reply = next_json(&mut student).await;
    assert_eq!(reply["type"], "stats_update");
    assert_eq!(reply["online_users"], 2);
    assert!(reply["timestamp"].is_string());

    assert!(
        next_json_within(&mut admin, Duration::from_millis(300))
            .await
            .is_none()
    );

    server.stop().await;
}

#[tokio::test]
async fn test_exam_events_reach_admins() {
    let server = TestServer::start(10).await;
    let mut admin = connect_raw(&server.endpoint()).await;
    send_json(&mut admin, connect_frame("1", "admin")).await;
    next_of_type(&mut admin, "stats_update").await;

    let mut student = connect_raw(&server.endpoint()).await;
    send_json(&mut student, connect_frame("12", "student")).await;
    next_of_type(&mut admin, "stats_update").await;

    send_json(
        &mut student,
        json!({"type": "join_exam", "exam_id": 3, "student_id": 12}),
    )
    .await;
    let note = next_of_type(&mut admin, "admin_notification").await;
    assert_eq!(note["title"], "Exam started");
    assert_eq!(note["message"], "Student 12 started exam 3");
    let stats = next_of_type(&mut admin, "stats_update").await;
    assert_eq!(stats["active_sessions"], 1);

    send_json(
        &mut student,
        json!({"type": "submit_exam", "exam_id": 3, "student_id": 12, "score": 9}),
    )
    .await;
    let note = next_of_type(&mut admin, "admin_notification").await;
    assert_eq!(note["title"], "Exam completed");
    let stats = next_of_type(&mut admin, "stats_update").await;
    assert_eq!(stats["active_sessions"], 0);
    assert_eq!(stats["completed_today"], 1);

    server.stop().await;
}

#[tokio::test]
async fn test_logout_announced_after_grace_period() {
    let server = TestServer::start(1).await;
    let mut admin = connect_raw(&server.endpoint()).await;
    send_json(&mut admin, connect_frame("1", "admin")).await;
    next_of_type(&mut admin, "stats_update").await;

    let mut student = connect_raw(&server.endpoint()).await;
    send_json(&mut student, connect_frame("12", "student")).await;
    next_of_type(&mut admin, "stats_update").await;

    student.close(None).await.expect("close student");
    drop(student);

    let note = next_of_type(&mut admin, "admin_notification").await;
    assert_eq!(note["title"], "User logged out");
    assert_eq!(note["message"], "Student ID 12 logged out");
    let stats = next_of_type(&mut admin, "stats_update").await;
    assert_eq!(stats["online_users"], 1);

    server.stop().await;
}

#[tokio::test]
async fn test_root_path_also_upgrades() {
    let server = TestServer::start(10).await;
    let mut socket = connect_raw(&format!("ws://{}/", server.addr)).await;

    send_json(&mut socket, json!({"type": "request_stats"})).await;
    assert_eq!(next_json(&mut socket).await["type"], "stats_update");

    server.stop().await;
}
