use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use serenity::async_trait;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Unable to parse text from JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid API key header: {0}")]
    Header(#[from] header::InvalidHeaderValue),

    #[error("Refused to complete request: {0}")]
    Refusal(String),

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Unknown response from OpenAI API")]
    Unknown,
}

/// One system instruction, one user turn, bounded output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Completion: Send + Sync {
    /// Returns the text of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String, OpenAiError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

/// Picks the reply and the error message out of a response body.
pub struct OpenAiRequest {
    valid: fn(&Value) -> &Value,
    error: fn(&Value) -> &Value,
}

impl OpenAiRequest {
    pub fn new(valid: fn(&Value) -> &Value, error: fn(&Value) -> &Value) -> Self {
        Self { valid, error }
    }

    pub fn chat_completion() -> Self {
        Self::new(
            |v| &v["choices"][0]["message"]["content"],
            |v| &v["error"]["message"],
        )
    }

    fn extract(&self, result: &Value) -> Result<String, OpenAiError> {
        match (self.valid)(result) {
            Value::String(str_val) => Ok(str_val.to_owned()),
            _ => match (self.error)(result) {
                Value::String(err_val) => Err(OpenAiError::Refusal(err_val.to_owned())),
                _ => Err(OpenAiError::Unknown),
            },
        }
    }
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
        }
    }

    fn build_api_auth_header(&self) -> Result<HeaderMap, OpenAiError> {
        let api_key = self.api_key.as_deref().ok_or(OpenAiError::MissingApiKey)?;
        let api_auth = ["Bearer ", api_key].concat();

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&api_auth)?);

        Ok(headers)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, OpenAiError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
        };

        debug!("Sending completion request to {}", self.endpoint());
        let response = self
            .http
            .post(self.endpoint())
            .headers(self.build_api_auth_header()?)
            .json(&body)
            .send()
            .await?;
        let text = response.text().await?;
        let result: Value = serde_json::from_str(&text)?;

        OpenAiRequest::chat_completion().extract(&result)
    }
}
