// tests/api_tests.rs

use std::collections::HashMap;
use std::sync::Arc;

use quiz_server::{backend::memory::MemoryBackend, config::Config, routes, state::AppState};
use serde_json::{Value, json};

const ADMIN_SECRET: &str = "test_admin_secret";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. Create test configuration and state
    let config = Config {
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        admin_secret: Some(ADMIN_SECRET.to_string()),
        rust_log: "error".to_string(),
        port: 0,
        seed_file: None,
        quiz_duration_secs: 1800,
        question_count: 3,
        tick_millis: 1000,
    };

    let store = Arc::new(MemoryBackend::new());
    let state = AppState::new(config, store).expect("Failed to build app state");

    // 2. Create the router with the app state
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn admin_token(client: &reqwest::Client, address: &str) -> String {
    let response = client
        .post(format!("{}/api/admin/login", address))
        .json(&json!({ "secret": ADMIN_SECRET }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn whitelist(client: &reqwest::Client, address: &str, token: &str, email: &str) {
    let response = client
        .post(format!("{}/api/admin/whitelist", address))
        .bearer_auth(token)
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
}

async fn register(
    client: &reqwest::Client,
    address: &str,
    reg: &str,
    email: &str,
) -> reqwest::Response {
    let mut map = HashMap::new();
    map.insert("name", format!("Student {}", reg));
    map.insert("registration_number", reg.to_string());
    map.insert("email", email.to_string());
    map.insert("college", "Test College".to_string());

    client
        .post(format!("{}/api/participants", address))
        .json(&map)
        .send()
        .await
        .expect("Failed to execute request")
}

/// Adds a question and returns its ID.
async fn add_question(client: &reqwest::Client, address: &str, token: &str, body: Value) -> u64 {
    let response = client
        .post(format!("{}/api/admin/questions", address))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let question: Value = response.json().await.unwrap();
    question["id"].as_u64().unwrap()
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn admin_routes_require_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/admin/questions", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(format!("{}/api/admin/login", address))
        .json(&json!({ "secret": "wrong" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn registration_requires_whitelisted_email() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address).await;

    let response = register(&client, &address, "REG-1", "someone@uni.edu").await;
    assert_eq!(response.status().as_u16(), 403);

    whitelist(&client, &address, &token, "Someone@Uni.edu").await;

    let lookup: Value = client
        .get(format!("{}/api/participants/whitelisted", address))
        .query(&[("email", "someone@uni.edu")])
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(lookup["whitelisted"], true);

    let response = register(&client, &address, "REG-1", "someone@uni.edu").await;
    assert_eq!(response.status().as_u16(), 201);

    let response = register(&client, &address, "REG-1", "someone@uni.edu").await;
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn rejects_mcq_without_options() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address).await;

    let response = client
        .post(format!("{}/api/admin/questions", address))
        .bearer_auth(&token)
        .json(&json!({
            "subject": "Maths",
            "text": "Pick one",
            "question_type": "mcq",
            "correct_answer": "A",
            "options": ["A", "  "],
            "round": 1
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn start_without_questions_is_unavailable() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address).await;

    whitelist(&client, &address, &token, "empty@uni.edu").await;
    register(&client, &address, "REG-EMPTY", "empty@uni.edu").await;

    let response = client
        .post(format!("{}/api/quiz/sessions", address))
        .json(&json!({ "registration_number": "REG-EMPTY" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn full_quiz_flow() {
    // Arrange: a bank of three questions and one registered participant
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address).await;

    let capital = add_question(
        &client,
        &address,
        &token,
        json!({
            "subject": "Geography",
            "text": "Capital of France?",
            "question_type": "shortAnswer",
            "correct_answer": "Paris",
            "round": 1
        }),
    )
    .await;
    let planet = add_question(
        &client,
        &address,
        &token,
        json!({
            "subject": "Science",
            "text": "The red planet?",
            "question_type": "mcq",
            "correct_answer": "Mars",
            "options": ["Venus", "Mars", "Jupiter"],
            "round": 1
        }),
    )
    .await;
    let water = add_question(
        &client,
        &address,
        &token,
        json!({
            "subject": "Science",
            "text": "Chemical formula of water?",
            "question_type": "shortAnswer",
            "correct_answer": "H2O",
            "round": 2
        }),
    )
    .await;

    whitelist(&client, &address, &token, "ada@uni.edu").await;
    let response = register(&client, &address, "REG-ADA", "ada@uni.edu").await;
    assert_eq!(response.status().as_u16(), 201);

    // Act: start a session
    let response = client
        .post(format!("{}/api/quiz/sessions", address))
        .json(&json!({ "registration_number": "REG-ADA" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let started: Value = response.json().await.unwrap();
    let session_id = started["session_id"].as_str().unwrap().to_string();
    let questions = started["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions.iter().all(|q| q.get("correct_answer").is_none()));
    assert_eq!(started["duration_seconds"], 1800);

    // A second session for the same participant is refused
    let response = client
        .post(format!("{}/api/quiz/sessions", address))
        .json(&json!({ "registration_number": "REG-ADA" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 409);

    // Answer two of three correctly, with sloppy casing and spacing
    for (question_id, answer) in [(capital, "  paris "), (planet, "MARS"), (water, "HO2")] {
        let response = client
            .put(format!("{}/api/quiz/sessions/{}/answers", address, session_id))
            .json(&json!({ "question_id": question_id, "answer": answer }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 204);
    }

    let response = client
        .put(format!("{}/api/quiz/sessions/{}/answers", address, session_id))
        .json(&json!({ "question_id": 9999, "answer": "x" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    let view: Value = client
        .get(format!("{}/api/quiz/sessions/{}", address, session_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(view["phase"], "running");
    assert_eq!(view["attempted"], 3);
    assert_eq!(view["unattempted"], 0);

    // Submit
    let outcome: Value = client
        .post(format!("{}/api/quiz/sessions/{}/submit", address, session_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["status"], "submitted");
    assert_eq!(outcome["score"], 2);
    assert_eq!(outcome["total_questions"], 3);

    // A repeated click is ignored
    let outcome: Value = client
        .post(format!("{}/api/quiz/sessions/{}/submit", address, session_id))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["status"], "ignored");

    // Answers are frozen once the submission is confirmed
    let response = client
        .put(format!("{}/api/quiz/sessions/{}/answers", address, session_id))
        .json(&json!({ "question_id": water, "answer": "H2O" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 409);

    // Assert: results, leaderboard and export reflect the submission
    let results: Value = client
        .get(format!("{}/api/quiz/results/REG-ADA", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(results["score"], 2);
    assert_eq!(results["answers"].as_array().unwrap().len(), 3);

    let board: Value = client
        .get(format!("{}/api/quiz/leaderboard", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["registration_number"], "REG-ADA");

    let response = client
        .get(format!("{}/api/admin/export", address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);
    let csv = response.text().await.unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("Name,"));
    assert!(lines.next().unwrap().contains("REG-ADA"));

    let response = client
        .post(format!("{}/api/quiz/sessions", address))
        .json(&json!({ "registration_number": "REG-ADA" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 409);

    let purged: Value = client
        .post(format!("{}/api/admin/sessions/purge", address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(purged["purged"], 1);
}
