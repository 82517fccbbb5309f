//! End-to-end tests for Duo Wrapped invitations

mod common;

use common::{
    TestClient, TestServer, OTHER_USER, OTHER_USER_FIRST_NAME, TEST_USER,
    TEST_USER_FIRST_NAME,
};
use reqwest::StatusCode;
use serde_json::Value;
use wrapped_server::store::{AuthToken, AuthTokenStore, UserStore};

async fn invite_ok(client: &TestClient, invitee: &str) -> usize {
    let response = client.invite(invitee).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["id"].as_u64().unwrap() as usize
}

async fn error_message(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

// =============================================================================
// Invitations
// =============================================================================

#[tokio::test]
async fn test_invitation_shows_up_for_invitee() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);
    let bob = TestClient::authenticated(server.base_url.clone(), &server.other_user_token);

    let id = invite_ok(&alice, OTHER_USER).await;

    let pending: Vec<Value> = bob.get_invitations().await.json().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"].as_u64().unwrap() as usize, id);
    assert_eq!(pending[0]["inviter"], TEST_USER);

    let pending: Vec<Value> = alice.get_invitations().await.json().await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_cannot_invite_self() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);

    let response = alice.invite(TEST_USER).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(error_message(response).await, "You cannot invite yourself");
}

#[tokio::test]
async fn test_invite_unknown_user_is_not_found() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);

    let response = alice.invite("nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(response).await, "User not found");
}

#[tokio::test]
async fn test_duplicate_pending_invitation_is_rejected() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);

    invite_ok(&alice, OTHER_USER).await;
    let response = alice.invite(OTHER_USER).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(error_message(response).await.contains(OTHER_USER));
}

// =============================================================================
// Acceptance
// =============================================================================

#[tokio::test]
async fn test_accept_requires_a_wrap_to_share() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);
    let bob = TestClient::authenticated(server.base_url.clone(), &server.other_user_token);

    let id = invite_ok(&alice, OTHER_USER).await;
    let response = bob.accept_invitation(id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(response).await,
        "No wrap data found to share in Duo Wrapped"
    );
}

#[tokio::test]
async fn test_only_invitee_can_accept() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);

    let id = invite_ok(&alice, OTHER_USER).await;
    alice.create_default_wrap().await;
    assert_eq!(
        alice.accept_invitation(id).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_duo_flow() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);
    let bob = TestClient::authenticated(server.base_url.clone(), &server.other_user_token);

    let id = invite_ok(&alice, OTHER_USER).await;

    // Not viewable before acceptance
    let response = alice.get_duo(id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    bob.create_default_wrap().await;
    assert_eq!(bob.accept_invitation(id).await.status(), StatusCode::OK);

    let response = bob.accept_invitation(id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(response).await,
        "This invitation was already accepted"
    );

    let pending: Vec<Value> = bob.get_invitations().await.json().await.unwrap();
    assert!(pending.is_empty());

    // The inviter has no wrap yet
    let response = alice.get_duo(id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(response).await,
        "Wrap data is missing for one or both users"
    );

    alice.create_default_wrap().await;
    for client in [&alice, &bob] {
        let response = client.get_duo(id).await;
        assert_eq!(response.status(), StatusCode::OK);
        let duo: Value = response.json().await.unwrap();
        let inviter_intro = duo["inviter_slides"][0]["title"].as_str().unwrap();
        let invitee_intro = duo["invitee_slides"][0]["title"].as_str().unwrap();
        assert!(inviter_intro.contains(TEST_USER_FIRST_NAME));
        assert!(invitee_intro.contains(OTHER_USER_FIRST_NAME));
    }
}

#[tokio::test]
async fn test_duo_is_private_to_participants() {
    let server = TestServer::spawn().await;
    let alice = TestClient::authenticated(server.base_url.clone(), &server.user_token);

    let carol_id = server.store.create_user("carol", "Carol").unwrap();
    let carol_token = AuthToken::new(carol_id);
    server.store.add_auth_token(&carol_token).unwrap();
    let carol = TestClient::authenticated(server.base_url.clone(), &carol_token.value.0);

    let id = invite_ok(&alice, OTHER_USER).await;
    assert_eq!(carol.get_duo(id).await.status(), StatusCode::NOT_FOUND);
}
