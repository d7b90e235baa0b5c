//! DeepSeek client wrapper built on the OpenAI-compatible transport.
//!
//! DeepSeek exposes an OpenAI-compatible chat surface, so the wrapper
//! delegates HTTP concerns to [`OpenAIClient`] and swapping between the two
//! vendors only requires a different constructor.
//!
//! # Example
//!
//! ```rust,no_run
//! use debatellm::client_wrapper::{ClientWrapper, Message, Role};
//! use debatellm::clients::deepseek::DeepSeekClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = std::env::var("DEEPSEEK_API_KEY")?;
//!     let client = DeepSeekClient::new_with_model_string(&key, "deepseek-chat");
//!     let reply = client
//!         .send_message(
//!             &[Message { role: Role::User, content: "One strong opening argument.".into() }],
//!             0.7,
//!         )
//!         .await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

use crate::debatellm::client_wrapper::{ClientWrapper, Message, ProviderFault};
use crate::debatellm::clients::openai::OpenAIClient;

/// Default base URL for DeepSeek's OpenAI-compatible API.
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

/// Client wrapper for DeepSeek routed through the OpenAI-compatible surface.
pub struct DeepSeekClient {
    /// Delegated client that handles the HTTP interactions.
    delegate_client: OpenAIClient,
    /// Exposed model name.
    model: String,
}

impl DeepSeekClient {
    /// Create a client from an API key and explicit model string.
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, DEEPSEEK_BASE_URL)
    }

    /// Create a client pointing at a custom DeepSeek-compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        DeepSeekClient {
            // we reuse the OpenAIClient for DeepSeek and delegate the calls to it
            delegate_client: OpenAIClient::new_with_base_url(secret_key, model_name, base_url),
            model: model_name.to_string(),
        }
    }
}

#[async_trait]
impl ClientWrapper for DeepSeekClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<Message, ProviderFault> {
        self.delegate_client.send_message(messages, temperature).await
    }
}
