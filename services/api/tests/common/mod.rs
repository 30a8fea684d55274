//! Common test utilities for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use api_lib::adapters::LoggingPushNotifier;
use api_lib::config::Config;
use api_lib::web::{create_router, state::AppState};
use axum_test::TestServer;
use pocket_tutor_core::InMemoryDatabase;
use serde_json::{json, Value};

/// A signed-up account: its id and bearer token.
pub struct Account {
    pub id: String,
    pub token: String,
}

/// Create a test server over a fresh in-memory store with no assistant provider
pub fn create_test_server() -> TestServer {
    let config = Config::from_lookup(|_| None).expect("default config");
    let state = Arc::new(AppState::new(
        Arc::new(config),
        Arc::new(InMemoryDatabase::new()),
        Arc::new(LoggingPushNotifier),
        None,
    ));

    TestServer::new(create_router(state)).expect("Failed to create test server")
}

fn account_from(body: Value) -> Account {
    Account {
        id: body["user"]["id"].as_str().expect("user id").to_string(),
        token: body["accessToken"].as_str().expect("access token").to_string(),
    }
}

/// Helper to sign up a student and return its credentials
pub async fn signup_student(server: &TestServer, name: &str, email: &str, number: &str) -> Account {
    let response = server
        .post("/api/students/signup")
        .json(&json!({
            "name": name,
            "phone": "0500000000",
            "email": email,
            "universityName": "King Saud University",
            "studentNumber": number,
            "password": "secret123",
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    account_from(response.json())
}

/// Helper to sign up a teacher and return its credentials
pub async fn signup_teacher(server: &TestServer, name: &str, email: &str) -> Account {
    let response = server
        .post("/api/teachers/signup")
        .json(&json!({
            "name": name,
            "phone": "0511111111",
            "email": email,
            "universityName": "King Saud University",
            "yearsExperience": 5,
            "gpa": 3.8,
            "password": "secret123",
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    account_from(response.json())
}

/// Books a Math session with `teacher` as `student` and returns the session id
pub async fn book_math_session(server: &TestServer, student: &Account, teacher: &Account) -> String {
    let response = server
        .post("/api/sessions")
        .authorization_bearer(&student.token)
        .json(&json!({
            "teacherId": teacher.id,
            "subject": "Math",
            "sessionType": "individual",
            "date": "2024-05-01",
            "time": "14:30",
            "price": 50.0,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    body["id"].as_str().expect("session id").to_string()
}

/// Sets a session's status as `caller` and returns the HTTP status code
pub async fn set_session_status(
    server: &TestServer,
    caller: &Account,
    session_id: &str,
    status: &str,
) -> u16 {
    server
        .put(&format!("/api/sessions/{}/status", session_id))
        .authorization_bearer(&caller.token)
        .json(&json!({ "status": status }))
        .await
        .status_code()
        .as_u16()
}
