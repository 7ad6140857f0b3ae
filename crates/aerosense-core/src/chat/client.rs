//! HTTP client for the streaming chat endpoint.

use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER,
};
use serde::Serialize;

use super::error::{ChatError, ChatResult};
use super::message::Message;
use super::stream::{AssistantStream, UpdateStream};

/// Path of the chat function under the backend base URL.
pub const CHAT_PATH: &str = "/functions/v1/chat";

/// User-Agent header sent with every chat request.
pub const USER_AGENT: &str = concat!("aerosense/", env!("CARGO_PKG_VERSION"));

/// Chat endpoint configuration.
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub api_key: String,
    pub base_url: String,
}

impl ChatClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Full URL of the chat endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_PATH)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
}

/// Streaming chat client.
pub struct ChatClient {
    config: ChatClientConfig,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ChatClientConfig {
        &self.config
    }

    /// Posts the transcript and returns the stream of reply updates.
    ///
    /// # Errors
    /// Returns a request-level `ChatError` when the request cannot be sent or
    /// the response status is not 2xx.
    pub async fn send_stream(&self, messages: &[Message]) -> ChatResult<UpdateStream> {
        let url = self.config.endpoint();
        let headers = build_headers(&self.config.api_key)?;

        tracing::debug!(%url, messages = messages.len(), "sending chat request");
        let response = self
            .http
            .post(&url)
            .headers(headers)
            .json(&ChatRequest { messages })
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let err = ChatError::http_status(status.as_u16(), &error_body);
            tracing::warn!(status = status.as_u16(), kind = %err.kind, "chat request rejected");
            return Err(err);
        }

        Ok(Box::pin(AssistantStream::new(Box::pin(
            response.bytes_stream(),
        ))))
    }
}

fn build_headers(api_key: &str) -> ChatResult<HeaderMap> {
    let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|err| {
            tracing::debug!(%err, "API key is not a valid header value");
            ChatError::failed("API key contains invalid header characters")
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));
    Ok(headers)
}

/// Backend unreachable or the request never completed; no status to classify.
fn request_failed(err: reqwest::Error) -> ChatError {
    let reason = if err.is_connect() {
        "could not reach chat backend"
    } else if err.is_timeout() {
        "chat request timed out"
    } else {
        "chat request failed"
    };
    ChatError::failed(format!("{reason}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatErrorKind;

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = ChatClientConfig::new("https://abc.supabase.co/", "key");
        assert_eq!(
            config.endpoint(),
            "https://abc.supabase.co/functions/v1/chat"
        );
    }

    #[test]
    fn test_headers_carry_bearer_token() {
        let headers = build_headers("secret").unwrap();
        assert_eq!(headers["authorization"], "Bearer secret");
        assert_eq!(headers["accept"], "text/event-stream");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["user-agent"], USER_AGENT);
    }

    #[test]
    fn test_api_key_with_newline_is_rejected() {
        let err = build_headers("bad\nkey").unwrap_err();
        assert_eq!(err.kind, ChatErrorKind::Failed);
        assert_eq!(err.message, "API key contains invalid header characters");
    }

    #[tokio::test]
    async fn test_send_stream_rejects_invalid_key_before_sending() {
        let client = ChatClient::new(ChatClientConfig::new("http://127.0.0.1:9", "key\r\n"));
        let Err(err) = client.send_stream(&[Message::user("hi")]).await else {
            panic!("invalid key must not produce a stream");
        };
        assert_eq!(err.kind, ChatErrorKind::Failed);
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![Message::assistant("Hello"), Message::user("Any AOG aircraft?")];
        let body = serde_json::to_value(ChatRequest {
            messages: &messages,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"messages": [
                {"role": "assistant", "content": "Hello"},
                {"role": "user", "content": "Any AOG aircraft?"}
            ]})
        );
    }
}
