//! Hosted text-generation delegate.
//!
//! Posts the composed prompt to an inference endpoint that speaks the
//! `{"inputs", "parameters"}` request shape and answers with
//! `[{"generated_text": "..."}]`. Models echo the prompt back, so the answer
//! is whatever follows the prompt's answer marker.

use async_trait::async_trait;
use folio_core::config::InferenceConfig;
use serde::{Deserialize, Serialize};

use crate::delegate::TextDelegate;
use crate::error::ChatError;
use crate::profile::ANSWER_MARKER;

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f64,
    top_p: f64,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: Option<String>,
}

/// [`TextDelegate`] backed by an HTTP inference endpoint.
pub struct InferenceDelegate {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
    parameters: GenerationParameters,
}

impl InferenceDelegate {
    pub fn new(config: &InferenceConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Use a preconfigured HTTP client, e.g. with custom proxy or TLS settings.
    pub fn with_client(config: &InferenceConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            parameters: GenerationParameters {
                max_new_tokens: config.max_new_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
                do_sample: config.do_sample,
            },
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextDelegate for InferenceDelegate {
    fn name(&self) -> &str {
        "inference"
    }

    async fn generate(&self, prompt: &str) -> Result<Option<String>, ChatError> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: self.parameters.clone(),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ChatError::Http(format!(
                "inference endpoint returned {}",
                status
            )));
        }

        let text = resp.text().await?;
        tracing::debug!(bytes = text.len(), "Inference response received");
        parse_generation(&text)
    }
}

/// Extract the answer from an inference response body.
///
/// Returns `Ok(None)` when the generated text has nothing after the marker.
pub fn parse_generation(body: &str) -> Result<Option<String>, ChatError> {
    let generations: Vec<Generation> = serde_json::from_str(body)
        .map_err(|e| ChatError::Delegate(format!("unexpected response format: {}", e)))?;

    let full = generations
        .into_iter()
        .next()
        .and_then(|g| g.generated_text)
        .ok_or_else(|| ChatError::Delegate("unexpected response format".to_string()))?;

    Ok(extract_answer(&full))
}

/// Text after the last answer marker, or the whole text when the model did
/// not echo the prompt. Blank results are `None`.
pub fn extract_answer(generated: &str) -> Option<String> {
    let answer = match generated.rfind(ANSWER_MARKER) {
        Some(pos) => &generated[pos + ANSWER_MARKER.len()..],
        None => generated,
    };
    let answer = answer.trim();
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection on a local port, answer it with `status` and
    /// `body`, and hand back the raw request.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{}/generate", addr), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&raw[..end]);
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= end + 4 + length
    }

    fn local_delegate(endpoint: String, api_token: Option<&str>) -> InferenceDelegate {
        let config = InferenceConfig {
            endpoint,
            api_token: api_token.map(str::to_string),
            ..InferenceConfig::default()
        };
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        InferenceDelegate::with_client(&config, client)
    }

    #[test]
    fn test_extract_answer_after_marker() {
        let text = format!("Context: ...\nQuestion: hi\n\n{} Hello there!  ", ANSWER_MARKER);
        assert_eq!(extract_answer(&text).as_deref(), Some("Hello there!"));
    }

    #[test]
    fn test_extract_answer_without_marker() {
        assert_eq!(extract_answer(" plain text ").as_deref(), Some("plain text"));
    }

    #[test]
    fn test_extract_answer_blank() {
        assert!(extract_answer(ANSWER_MARKER).is_none());
        assert!(extract_answer("   ").is_none());
    }

    #[test]
    fn test_parse_generation_ok() {
        let body = format!(
            r#"[{{"generated_text": "prompt {} I build backends."}}]"#,
            ANSWER_MARKER
        );
        let answer = parse_generation(&body).unwrap();
        assert_eq!(answer.as_deref(), Some("I build backends."));
    }

    #[test]
    fn test_parse_generation_empty_answer() {
        let body = format!(r#"[{{"generated_text": "{}"}}]"#, ANSWER_MARKER);
        assert!(parse_generation(&body).unwrap().is_none());
    }

    #[test]
    fn test_parse_generation_wrong_shape() {
        let err = parse_generation(r#"{"error": "Model is loading"}"#).unwrap_err();
        assert!(matches!(err, ChatError::Delegate(_)));

        let err = parse_generation("[]").unwrap_err();
        assert!(err.to_string().contains("unexpected response format"));

        let err = parse_generation(r#"[{"score": 0.5}]"#).unwrap_err();
        assert!(matches!(err, ChatError::Delegate(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let delegate = InferenceDelegate::new(&InferenceConfig::default());
        let body = GenerationRequest {
            inputs: "hello",
            parameters: delegate.parameters.clone(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "hello");
        assert_eq!(json["parameters"]["max_new_tokens"], 200);
        assert_eq!(json["parameters"]["do_sample"], true);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let delegate = local_delegate("http://127.0.0.1:9/generate".to_string(), None);
        assert_eq!(delegate.name(), "inference");
        let err = delegate.generate("hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Http(_)));
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (endpoint, server) = serve_once(
            "503 Service Unavailable",
            r#"{"error": "Model is loading"}"#.to_string(),
        )
        .await;
        let delegate = local_delegate(endpoint, None);

        let err = delegate.generate("hello").await.unwrap_err();
        assert!(matches!(err, ChatError::Http(_)));
        assert!(err.to_string().contains("503"));

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /generate "));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_successful_generation_with_bearer_token() {
        let body = format!(
            r#"[{{"generated_text": "Question: stack?\n\n{} Rust and AWS."}}]"#,
            ANSWER_MARKER
        );
        let (endpoint, server) = serve_once("200 OK", body).await;
        let delegate = local_delegate(endpoint, Some("hf_test_token"));

        let answer = delegate.generate("Question: stack?").await.unwrap();
        assert_eq!(answer.as_deref(), Some("Rust and AWS."));

        let request = server.await.unwrap();
        assert!(request
            .to_lowercase()
            .contains("authorization: bearer hf_test_token"));
        assert!(request.contains(r#""inputs":"Question: stack?""#));
        assert!(request.contains(r#""max_new_tokens":200"#));
    }
}
