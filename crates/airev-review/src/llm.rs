use std::time::Duration;

use airev_core::{AirevError, LlmConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A remote text-completion capability.
///
/// Implemented by [`LlmClient`] for real runs; tests substitute fakes.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send `instructions` and `input` as a single non-streaming request.
    ///
    /// Returns `Ok(None)` when the service answers without any text.
    async fn complete(&self, instructions: &str, input: &str)
        -> Result<Option<String>, AirevError>;
}

/// Request body for the `/v1/responses` endpoint.
///
/// # Examples
///
/// ```
/// use airev_review::llm::ResponseRequest;
///
/// let req = ResponseRequest {
///     model: "gpt-4o",
///     instructions: "Review this",
///     input: "+added line",
/// };
/// let json = serde_json::to_value(&req).unwrap();
/// assert_eq!(json["model"], "gpt-4o");
/// assert_eq!(json["input"], "+added line");
/// ```
#[derive(Debug, Serialize)]
pub struct ResponseRequest<'a> {
    /// Model identifier.
    pub model: &'a str,
    /// System-level instructions.
    pub instructions: &'a str,
    /// User input.
    pub input: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// OpenAI Responses API client.
///
/// Works with any provider that exposes the `/v1/responses` endpoint.
///
/// # Examples
///
/// ```
/// use airev_core::LlmConfig;
/// use airev_review::llm::{CompletionService, LlmClient};
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gpt-4o");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AirevError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, AirevError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AirevError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
            .trim_end_matches('/');
        format!("{base_url}/v1/responses")
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        instructions: &str,
        input: &str,
    ) -> Result<Option<String>, AirevError> {
        let body = ResponseRequest {
            model: &self.config.model,
            instructions,
            input,
        };

        let mut request = self.client.post(self.endpoint());
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| AirevError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AirevError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AirevError::Llm(format!("failed to read response: {e}")))?;
        parse_output_text(&text)
    }
}

/// Extract the primary text output from a Responses API body.
///
/// Concatenates every `output_text` part of every `message` item, in order.
/// Returns `Ok(None)` if there is no text.
///
/// # Errors
///
/// Returns [`AirevError::Llm`] if `body` is not a valid response object.
///
/// # Examples
///
/// ```
/// use airev_review::llm::parse_output_text;
///
/// let body = r#"{"output":[{"type":"message","content":[{"type":"output_text","text":"LGTM"}]}]}"#;
/// assert_eq!(parse_output_text(body).unwrap().as_deref(), Some("LGTM"));
/// ```
pub fn parse_output_text(body: &str) -> Result<Option<String>, AirevError> {
    let parsed: ResponseBody = serde_json::from_str(body)
        .map_err(|e| AirevError::Llm(format!("failed to parse response: {e}")))?;

    let text: String = parsed
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .flat_map(|item| item.content.iter())
        .filter(|part| part.kind == "output_text")
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    #[test]
    fn client_construction_succeeds() {
        assert!(LlmClient::new(&LlmConfig::default()).is_ok());
    }

    #[test]
    fn model_returns_config_model() {
        let config = LlmConfig {
            model: "gpt-4o-mini".into(),
            ..LlmConfig::default()
        };
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let config = LlmConfig {
            base_url: Some("http://localhost:8080/".into()),
            ..LlmConfig::default()
        };
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/responses");
    }

    #[test]
    fn default_endpoint_is_openai() {
        let client = LlmClient::new(&LlmConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/responses");
    }

    #[test]
    fn output_text_skips_reasoning_and_refusals() {
        let body = r###"{
            "id": "resp_1",
            "object": "response",
            "output": [
                {"type": "reasoning", "id": "rs_1", "summary": []},
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        {"type": "output_text", "text": "## Summary\n", "annotations": []},
                        {"type": "refusal", "refusal": "no"},
                        {"type": "output_text", "text": "Looks good.", "annotations": []}
                    ]
                }
            ]
        }"###;
        assert_eq!(
            parse_output_text(body).unwrap().as_deref(),
            Some("## Summary\nLooks good.")
        );
    }

    #[test]
    fn no_message_output_is_none() {
        let body = r#"{"output":[{"type":"reasoning","summary":[]}]}"#;
        assert_eq!(parse_output_text(body).unwrap(), None);
    }

    #[test]
    fn missing_output_field_is_none() {
        assert_eq!(parse_output_text("{}").unwrap(), None);
    }

    #[test]
    fn malformed_body_is_llm_error() {
        let err = parse_output_text("not json").unwrap_err();
        assert!(matches!(err, AirevError::Llm(_)));
    }

    /// Answer exactly one HTTP request with `status` and `body`.
    ///
    /// Returns the base URL to point the client at and a handle yielding the
    /// raw request that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let content_length = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    fn client_for(base_url: String) -> LlmClient {
        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            base_url: Some(base_url),
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        LlmClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn complete_posts_request_and_returns_text() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"output":[{"type":"message","content":[{"type":"output_text","text":"LGTM"}]}]}"#,
        )
        .await;
        let client = client_for(base_url);

        let text = client.complete("Review this", "+added line").await.unwrap();
        assert_eq!(text.as_deref(), Some("LGTM"));

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let head = head.to_lowercase();
        assert!(head.starts_with("post /v1/responses "));
        assert!(head.contains("authorization: bearer sk-test"));
        assert!(head.contains("content-type: application/json"));

        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["instructions"], "Review this");
        assert_eq!(json["input"], "+added line");
    }

    #[tokio::test]
    async fn complete_without_text_is_none() {
        let (base_url, server) = serve_once("200 OK", r#"{"output":[]}"#).await;
        let client = client_for(base_url);

        assert_eq!(client.complete("i", "d").await.unwrap(), None);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn complete_error_status_is_llm_error() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        )
        .await;
        let client = client_for(base_url);

        let err = client.complete("i", "d").await.unwrap_err();
        match err {
            AirevError::Llm(msg) => {
                assert!(msg.contains("401"), "unexpected message: {msg}");
                assert!(msg.contains("Incorrect API key"), "unexpected message: {msg}");
            }
            other => panic!("expected Llm error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn complete_malformed_body_is_llm_error() {
        let (base_url, server) = serve_once("200 OK", "not json").await;
        let client = client_for(base_url);

        let err = client.complete("i", "d").await.unwrap_err();
        assert!(matches!(err, AirevError::Llm(msg) if msg.contains("failed to parse response")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn complete_connection_refused_is_llm_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(format!("http://{addr}"));

        let err = client.complete("i", "d").await.unwrap_err();
        assert!(matches!(err, AirevError::Llm(msg) if msg.starts_with("request failed")));
    }
}
