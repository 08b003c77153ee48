//! 审查服务客户端
//!
//! `ReviewService` 是 gate 与外部 LLM API 之间的接缝；
//! `HttpReviewService` 支持 OpenAI 兼容的 chat completions 和 Anthropic messages 接口。

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::{GateConfig, ReviewProvider};
use crate::review::outcome::ReviewError;
use crate::utils::truncate;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_MAX_TOKENS: u32 = 1024;
const ERROR_BODY_LIMIT: usize = 320;

/// 外部审查服务
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// 发送审查指令，返回模型的原始文本回复
    async fn review(&self, credential: &str, instruction: &str) -> Result<String, ReviewError>;
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

/// 基于 reqwest 的审查服务
#[derive(Debug, Clone)]
pub struct HttpReviewService {
    client: Client,
    provider: ReviewProvider,
    endpoint: String,
    model: String,
}

impl HttpReviewService {
    pub fn new(
        provider: ReviewProvider,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReviewError> {
        let endpoint = endpoint.into();

        let mut builder = Client::builder().timeout(timeout);
        // 本地端点（自托管网关、测试 mock）不走系统代理
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            provider,
            endpoint,
            model: model.into(),
        })
    }

    pub fn from_config(config: &GateConfig) -> Result<Self, ReviewError> {
        Self::new(
            config.provider,
            config.endpoint(),
            config.model(),
            config.timeout(),
        )
    }

    async fn review_openai(&self, credential: &str, instruction: &str) -> Result<String, ReviewError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": instruction,
                }
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(&payload)
            .send()
            .await?;

        let body: ChatResponse = check_status(response).await?.json().await?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ReviewError::EmptyResponse)
    }

    async fn review_anthropic(
        &self,
        credential: &str,
        instruction: &str,
    ) -> Result<String, ReviewError> {
        let payload = json!({
            "model": self.model,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": instruction,
                }
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", credential)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        let body: AnthropicResponse = check_status(response).await?.json().await?;

        let text = body
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }
}

#[async_trait]
impl ReviewService for HttpReviewService {
    async fn review(&self, credential: &str, instruction: &str) -> Result<String, ReviewError> {
        log::debug!(
            "sending review request to {} ({} {}, {} bytes)",
            self.endpoint,
            self.provider,
            self.model,
            instruction.len()
        );

        let text = match self.provider {
            ReviewProvider::OpenAi => self.review_openai(credential, instruction).await?,
            ReviewProvider::Anthropic => self.review_anthropic(credential, instruction).await?,
        };

        if text.trim().is_empty() {
            return Err(ReviewError::EmptyResponse);
        }

        log::debug!("review response: {}", truncate(&text, ERROR_BODY_LIMIT));
        Ok(text)
    }
}

fn is_loopback(endpoint: &str) -> bool {
    Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.to_string()))
        .map(|host| matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]" | "::1"))
        .unwrap_or(false)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ReviewError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ReviewError::Status {
        status: status.as_u16(),
        body: truncate(&body, ERROR_BODY_LIMIT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::outcome::GateOutcome;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer, provider: ReviewProvider, route: &str) -> HttpReviewService {
        HttpReviewService::new(
            provider,
            format!("{}{}", server.uri(), route),
            "test-model",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_openai_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "{\"approved\": true, \"feedback\": \"ok\"}"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let svc = service(&server, ReviewProvider::OpenAi, "/v1/chat/completions");
        let text = svc.review("sk-test", "review this").await.unwrap();
        assert_eq!(text, r#"{"approved": true, "feedback": "ok"}"#);
    }

    #[tokio::test]
    async fn test_anthropic_joins_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "text", "text": "Verdict:"},
                    {"type": "text", "text": "{\"approved\": false, \"feedback\": \"issue X\"}"}
                ]
            })))
            .mount(&server)
            .await;

        let svc = service(&server, ReviewProvider::Anthropic, "/v1/messages");
        let text = svc.review("sk-ant", "review this").await.unwrap();
        assert!(text.starts_with("Verdict:"));
        assert!(text.contains("issue X"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let svc = service(&server, ReviewProvider::OpenAi, "/v1/chat/completions");
        let err = svc.review("bad", "review this").await.unwrap_err();
        match err {
            ReviewError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let svc = service(&server, ReviewProvider::OpenAi, "/v1/chat/completions");
        assert!(matches!(
            svc.review("sk-test", "review this").await,
            Err(ReviewError::EmptyResponse)
        ));
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("http://127.0.0.1:8080/v1/messages"));
        assert!(is_loopback("http://localhost/v1/chat/completions"));
        assert!(!is_loopback("https://api.openai.com/v1/chat/completions"));
        assert!(!is_loopback("not a url"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let svc = HttpReviewService::new(
            ReviewProvider::OpenAi,
            "http://127.0.0.1:9/v1/chat/completions",
            "test-model",
            Duration::from_secs(2),
        )
        .unwrap();

        assert!(matches!(
            svc.review("sk-test", "review this").await,
            Err(ReviewError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "choices": [{"message": {"content": "{\"approved\": false}"}}]
                    }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let svc = HttpReviewService::new(
            ReviewProvider::OpenAi,
            format!("{}/v1/chat/completions", server.uri()),
            "test-model",
            Duration::from_secs(1),
        )
        .unwrap();

        let err = match svc.review("sk-test", "review this").await {
            Err(ReviewError::Http(e)) => {
                assert!(e.is_timeout());
                ReviewError::Http(e)
            }
            other => panic!("expected timeout, got {other:?}"),
        };
        assert!(GateOutcome::FailedOpen(err).is_approved());
    }
}
