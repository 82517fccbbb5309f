//! End-to-end tests for the guessing game

mod common;

use common::{TestClient, TestServer, TRACK_1_NAME, TRACK_2_NAME, TRACK_3_NAME};
use reqwest::StatusCode;
use serde_json::Value;

async fn guess(client: &TestClient, user_guess: &str, answer: &str) -> bool {
    let response = client.post_guess(user_guess, answer).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    body["correct"].as_bool().unwrap()
}

#[tokio::test]
async fn test_guess_ignores_case_and_whitespace() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone(), &server.user_token);

    assert!(guess(&client, "  yellow ", "Yellow").await);
    assert!(guess(&client, "CLOCKS", "Clocks").await);
    assert!(!guess(&client, "Yello", "Yellow").await);
    assert!(!guess(&client, "", "Yellow").await);
}

#[tokio::test]
async fn test_guess_requires_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(
        client.post_guess("Yellow", "Yellow").await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_game_slide_answer_comes_from_candidate_pool() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone(), &server.user_token);
    let id = client.create_default_wrap().await;

    let body: Value = client.get_wrap(id).await.json().await.unwrap();
    let game = body["slides"]
        .as_array()
        .unwrap()
        .iter()
        .find(|slide| slide["kind"] == "game")
        .expect("wrap should contain a game slide");
    let challenge = &game["payload"];
    let answer = challenge["answer"].as_str().unwrap();
    let scrambled = challenge["scrambled_name"].as_str().unwrap();

    assert!([TRACK_1_NAME, TRACK_2_NAME, TRACK_3_NAME].contains(&answer));
    assert_eq!(scrambled.len(), answer.len());

    assert!(guess(&client, answer, answer).await);
}
