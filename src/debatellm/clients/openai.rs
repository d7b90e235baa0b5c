//! The `OpenAIClient` struct implements [`ClientWrapper`] for OpenAI's Chat
//! Completions API and any OpenAI-compatible endpoint reachable through a
//! custom base URL.
//!
//! The adapter speaks the wire format directly through the shared pooled
//! HTTP client so that HTTP status codes stay visible and can be translated
//! into structured [`ProviderFault`] values for the gateway's retry
//! classifier.
//!
//! # Example
//!
//! ```rust,no_run
//! use debatellm::client_wrapper::{ClientWrapper, Message, Role};
//! use debatellm::clients::openai::OpenAIClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let secret_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
//!     let client = OpenAIClient::new_with_model_string(&secret_key, "gpt-4o-mini");
//!
//!     let reply = client
//!         .send_message(
//!             &[
//!                 Message { role: Role::System, content: "You are terse.".into() },
//!                 Message { role: Role::User, content: "Say hello.".into() },
//!             ],
//!             0.7,
//!         )
//!         .await
//!         .unwrap();
//!     println!("Assistant: {}", reply.content);
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::debatellm::client_wrapper::{ClientWrapper, Message, ProviderFault, Role};
use crate::debatellm::clients::http_pool::get_shared_http_client;

/// Default base URL for OpenAI's REST API.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Client wrapper for OpenAI's Chat Completions API.
pub struct OpenAIClient {
    /// Shared pooled HTTP client.
    http: reqwest::Client,
    /// Base URL without the `/chat/completions` suffix.
    base_url: String,
    /// Bearer credential injected into each request.
    secret_key: String,
    /// Model name that will be injected into each request.
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: WireMessage,
}

impl OpenAIClient {
    /// Construct a new client using the provided API key and model name.
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, OPENAI_BASE_URL)
    }

    /// Construct a client targeting a custom OpenAI-compatible base URL.
    ///
    /// This is the most general constructor and is reused by adapters for
    /// vendors that expose an OpenAI-compatible surface.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        OpenAIClient {
            http: get_shared_http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
            model: model_name.to_string(),
        }
    }
}

/// Translate a non-success HTTP response into a [`ProviderFault`].
///
/// Kept as a free function so the mapping is testable without a live
/// endpoint.
pub(crate) fn fault_from_status(status: u16, body: &str) -> ProviderFault {
    match status {
        401 | 403 => ProviderFault::InvalidCredential,
        429 => ProviderFault::RateLimited,
        s if s >= 500 => ProviderFault::Server {
            status: s,
            message: truncate(body, 300),
        },
        _ => {
            // OpenAI-compatible endpoints signal moderation refusals inside
            // the 400 error body rather than with a dedicated status.
            if body.contains("content_policy") || body.contains("content_filter") {
                ProviderFault::ContentPolicy(truncate(body, 300))
            } else {
                ProviderFault::MalformedRequest(truncate(body, 300))
            }
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

fn role_to_wire(role: Role) -> String {
    match role {
        Role::System => "system".to_owned(),
        Role::User => "user".to_owned(),
        Role::Assistant => "assistant".to_owned(),
    }
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<Message, ProviderFault> {
        let mut formatted_messages = Vec::with_capacity(messages.len());
        for msg in messages {
            formatted_messages.push(WireMessage {
                role: role_to_wire(msg.role),
                content: msg.content.clone(),
            });
        }

        let request = ChatRequest {
            model: &self.model,
            messages: formatted_messages,
            temperature,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderFault::Timeout
                } else {
                    ProviderFault::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let fault = fault_from_status(status.as_u16(), &body);
            if log::log_enabled!(log::Level::Error) {
                log::error!(
                    "OpenAIClient::send_message(...): API error {}: {}",
                    status,
                    fault
                );
            }
            return Err(fault);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| ProviderFault::Network(format!("response decode error: {}", err)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ProviderFault::EmptyResponse)?;

        Ok(Message {
            role: Role::Assistant,
            content,
        })
    }
}
