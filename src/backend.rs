//! HTTP backend client
//!
//! Implements [`ConversationBackend`] against the Storyhaven REST API.
//! Timeout policy lives here; the state machine never waits on the
//! network directly.

use crate::conversation::ConversationMessage;
use crate::runtime::ConversationBackend;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Backend error with classification.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::NotFound, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidRequest, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ServerError, message)
    }
}

/// Error classification for UI display decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Network issues, timeouts
    Network,
    /// Authentication failed (401, 403)
    Auth,
    /// Unknown conversation id (404)
    NotFound,
    /// Bad request (4xx)
    InvalidRequest,
    /// Server error (5xx)
    ServerError,
}

/// REST client for conversation lifecycle calls.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct StartRequest<'a> {
    user_id: &'a str,
}

impl HttpBackend {
    /// # Panics
    /// Panics if the TLS backend cannot be initialized.
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), BackendError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }
}

fn classify_error(status: reqwest::StatusCode, body: &str) -> BackendError {
    let message = if body.is_empty() {
        format!("backend returned {status}")
    } else {
        format!("backend returned {status}: {body}")
    };
    match status.as_u16() {
        401 | 403 => BackendError::auth(message),
        404 => BackendError::not_found(message),
        400..=499 => BackendError::invalid_request(message),
        _ => BackendError::server_error(message),
    }
}

#[async_trait]
impl ConversationBackend for HttpBackend {
    async fn start(&self, user_id: &str) -> Result<(), BackendError> {
        tracing::info!(user_id, "starting conversation");
        self.post("/api/conversations", &StartRequest { user_id })
            .await
    }

    async fn pause(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.post(&format!("/api/conversations/{conversation_id}/pause"), &())
            .await
    }

    async fn resume(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.post(&format!("/api/conversations/{conversation_id}/resume"), &())
            .await
    }

    async fn abandon(&self, conversation_id: &str) -> Result<(), BackendError> {
        self.post(&format!("/api/conversations/{conversation_id}/abandon"), &())
            .await
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &ConversationMessage,
    ) -> Result<(), BackendError> {
        self.post(
            &format!("/api/conversations/{conversation_id}/messages"),
            message,
        )
        .await
    }
}
