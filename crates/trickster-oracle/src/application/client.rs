//! Chat-completions HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};
use trickster_core::error::CollaboratorError;

use crate::domain::wire::{ChatCompletionResponse, ChatMessage, ChatRequest, ResponseFormat};

/// Longest slice of an error body carried into a `Status` error.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Where and how to reach the language model.
#[derive(Clone)]
pub struct OracleConfig {
    /// Full chat-completions URL.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One-shot prompt completion over an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    config: OracleConfig,
}

impl ChatClient {
    /// Builds a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::Transport` if the TLS backend cannot be
    /// initialised.
    pub fn new(config: OracleConfig) -> Result<Self, CollaboratorError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Sends `prompt` as a single user message and returns the reply text.
    ///
    /// With `json_mode` the model is asked for a single JSON object. The
    /// reply may be empty; only a response without any choice is an error.
    ///
    /// # Errors
    ///
    /// Returns `CollaboratorError::Transport` on connection, timeout or
    /// decoding failures, `CollaboratorError::Status` on a non-success status,
    /// and `CollaboratorError::EmptyResponse` if no choice came back.
    pub async fn complete(
        &self,
        prompt: &str,
        json_mode: bool,
    ) -> Result<String, CollaboratorError> {
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            response_format: json_mode.then_some(ResponseFormat::JSON_OBJECT),
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), %message, "chat completion rejected");
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| CollaboratorError::Transport(format!("undecodable response: {e}")))?;
        let content = parsed
            .into_first_content()
            .ok_or(CollaboratorError::EmptyResponse)?;

        debug!(model = %self.config.model, chars = content.chars().count(), "chat completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured {
        bodies: Arc<Mutex<Vec<Value>>>,
        auth: Arc<Mutex<Vec<String>>>,
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn client(endpoint: String) -> ChatClient {
        ChatClient::new(OracleConfig {
            endpoint,
            model: "test-model".to_owned(),
            api_key: "sk-test".to_owned(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn answer(
        State(captured): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        captured.bodies.lock().unwrap().push(body);
        if let Some(auth) = headers.get("authorization") {
            captured
                .auth
                .lock()
                .unwrap()
                .push(auth.to_str().unwrap().to_owned());
        }
        Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "力士……是你吗？" } }]
        }))
    }

    #[tokio::test]
    async fn test_complete_posts_prompt_and_returns_first_choice() {
        // Arrange
        let captured = Captured::default();
        let router = Router::new()
            .route("/v1/chat/completions", post(answer))
            .with_state(captured.clone());
        let client = client(serve(router).await);

        // Act
        let reply = client.complete("你是杨玉环", true).await.unwrap();

        // Assert
        assert_eq!(reply, "力士……是你吗？");
        let bodies = captured.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["model"], "test-model");
        assert_eq!(bodies[0]["messages"][0]["content"], "你是杨玉环");
        assert_eq!(bodies[0]["response_format"]["type"], "json_object");
        assert_eq!(captured.auth.lock().unwrap()[0], "Bearer sk-test");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_status_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        );
        let client = client(serve(router).await);

        let error = client.complete("hi", false).await.unwrap_err();

        match error {
            CollaboratorError::Status { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_response() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let client = client(serve(router).await);

        let error = client.complete("hi", false).await.unwrap_err();

        assert!(matches!(error, CollaboratorError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client(format!("http://{addr}/v1/chat/completions"));

        let error = client.complete("hi", false).await.unwrap_err();

        assert!(matches!(error, CollaboratorError::Transport(_)));
    }
}
