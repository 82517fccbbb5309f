//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{RequestBuilder, Response};
use serde_json::json;
use std::time::Duration;

/// HTTP test client carrying an optional session token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    token: Option<String>,
}

impl TestClient {
    /// Creates a client without a session, for access control tests.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client sending `token` as bearer token on every request.
    pub fn authenticated(base_url: String, token: &str) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token.to_string());
        client
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Response {
        builder.send().await.expect("Request failed")
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/")).await
    }

    pub async fn get_authorize_url(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/v1/catalog/authorize-url")).await
    }

    // ========================================================================
    // Wraps
    // ========================================================================

    /// POST /v1/wraps with the given catalog access token
    pub async fn create_wrap(&self, time_range: &str, access_token: &str) -> Response {
        let body = json!({ "time_range": time_range, "access_token": access_token });
        Self::send(self.request(reqwest::Method::POST, "/v1/wraps").json(&body)).await
    }

    /// Creates a wrap from the full fake catalog data and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if the server does not answer 200.
    pub async fn create_default_wrap(&self) -> usize {
        let response = self.create_wrap("medium", CATALOG_ACCESS_TOKEN).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("Invalid wrap json");
        body["id"].as_u64().expect("Missing wrap id") as usize
    }

    pub async fn get_wraps(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/v1/wraps")).await
    }

    pub async fn get_wrap(&self, id: usize) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/v1/wraps/{}", id))).await
    }

    pub async fn delete_wrap(&self, id: usize) -> Response {
        Self::send(self.request(reqwest::Method::DELETE, &format!("/v1/wraps/{}", id))).await
    }

    pub async fn get_wrap_card(&self, id: usize) -> Response {
        let path = format!("/v1/wraps/{}/card.png", id);
        Self::send(self.request(reqwest::Method::GET, &path)).await
    }

    // ========================================================================
    // Game
    // ========================================================================

    pub async fn post_guess(&self, user_guess: &str, answer: &str) -> Response {
        let body = json!({ "user_guess": user_guess, "answer": answer });
        Self::send(self.request(reqwest::Method::POST, "/v1/game/guess").json(&body)).await
    }

    // ========================================================================
    // Duo Wrapped
    // ========================================================================

    pub async fn invite(&self, invitee: &str) -> Response {
        let body = json!({ "invitee": invitee });
        Self::send(self.request(reqwest::Method::POST, "/v1/duo/invitations").json(&body)).await
    }

    pub async fn get_invitations(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/v1/duo/invitations")).await
    }

    pub async fn accept_invitation(&self, id: usize) -> Response {
        let path = format!("/v1/duo/invitations/{}/accept", id);
        Self::send(self.request(reqwest::Method::POST, &path)).await
    }

    pub async fn get_duo(&self, id: usize) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/v1/duo/{}", id))).await
    }

    // ========================================================================
    // User
    // ========================================================================

    pub async fn get_profile(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/v1/user/profile")).await
    }

    pub async fn delete_account(&self) -> Response {
        Self::send(self.request(reqwest::Method::DELETE, "/v1/user")).await
    }
}
