//! Tests that unparsable bodies, paths and query strings answer 400 with a detail

mod common;

use axum_test::TestServer;
use common::{book_math_session, create_test_server, signup_student, signup_teacher};
use serde_json::{json, Value};

fn assert_bad_request(response: axum_test::TestResponse) {
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(
        body["detail"].as_str().is_some_and(|d| !d.is_empty()),
        "unexpected body: {}",
        body
    );
}

async fn booked_session(server: &TestServer) -> (common::Account, common::Account, String) {
    let student = signup_student(server, "Sara", "sara@uni.edu", "S-1").await;
    let teacher = signup_teacher(server, "Omar", "omar@uni.edu").await;
    let session_id = book_math_session(server, &student, &teacher).await;
    (student, teacher, session_id)
}

#[tokio::test]
async fn test_malformed_json_bodies_are_bad_requests() {
    let server = create_test_server();
    let (student, teacher, session_id) = booked_session(&server).await;

    // Missing a required field.
    assert_bad_request(
        server
            .post("/api/sessions")
            .authorization_bearer(&student.token)
            .json(&json!({
                "teacherId": teacher.id,
                "sessionType": "individual",
                "date": "2024-05-01",
                "time": "14:30",
                "price": 50.0,
            }))
            .await,
    );

    // Wrong value types.
    assert_bad_request(
        server
            .post("/api/ratings")
            .authorization_bearer(&student.token)
            .json(&json!({ "teacherId": "not-a-uuid", "sessionId": session_id, "rating": 5 }))
            .await,
    );
    assert_bad_request(
        server
            .post("/api/ratings")
            .authorization_bearer(&student.token)
            .json(&json!({ "teacherId": teacher.id, "sessionId": session_id, "rating": "five" }))
            .await,
    );

    // Not JSON at all.
    assert_bad_request(
        server
            .post("/api/students/login")
            .content_type("application/json")
            .text("{not json")
            .await,
    );
}

#[tokio::test]
async fn test_malformed_path_and_query_are_bad_requests() {
    let server = create_test_server();
    let (student, _, _) = booked_session(&server).await;

    assert_bad_request(
        server
            .put("/api/sessions/not-a-uuid/status")
            .authorization_bearer(&student.token)
            .json(&json!({ "status": "confirmed" }))
            .await,
    );
    assert_bad_request(server.get("/api/teachers/not-a-uuid/rating-stats").await);
    assert_bad_request(
        server
            .get("/api/notifications?limit=many")
            .authorization_bearer(&student.token)
            .await,
    );
    assert_bad_request(server.get("/api/teachers/search?minRating=high").await);
}
