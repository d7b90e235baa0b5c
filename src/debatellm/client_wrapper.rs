//! A ClientWrapper is a wrapper around a specific cloud LLM service.
//! It provides a common interface for the rest of the crate: the gateway
//! retries around it, the orchestrator feeds it assembled prompts, and a new
//! vendor is supported by adding one adapter implementation rather than
//! branching existing call sites.
//!
//! Unlike a raw SDK surface, `send_message` reports failures as a structured
//! [`ProviderFault`] so the gateway's retry classifier can tell transient
//! faults from permanent ones without string-matching error text.

use async_trait::async_trait;
use std::error::Error;
use std::fmt;

/// Represents the possible roles for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Set by the orchestrator to steer the model's behavior for a phase.
    System,
    /// The assembled prompt text for the current call.
    User,
    /// Content the model produced in an earlier exchange.
    Assistant,
}

/// Represents a generic message to be sent to an LLM.
#[derive(Clone, Debug)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
}

/// A structured provider failure, as observed by one network attempt.
///
/// The gateway's classifier maps each variant to transient or permanent;
/// adapters are responsible for translating vendor-specific errors into the
/// closest variant rather than leaking SDK error types upward.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderFault {
    /// The attempt did not complete within the per-attempt deadline.
    Timeout,
    /// The provider answered with a rate-limit response (HTTP 429).
    RateLimited,
    /// A 5xx-class provider error.
    Server { status: u16, message: String },
    /// The request never produced an HTTP response (DNS, TLS, connection).
    Network(String),
    /// The provider rejected the credential (HTTP 401/403).
    InvalidCredential,
    /// The provider rejected the request shape (HTTP 4xx other than auth
    /// and rate-limit).
    MalformedRequest(String),
    /// The provider refused to generate for policy reasons.
    ContentPolicy(String),
    /// The provider returned 200 but no usable completion text.
    EmptyResponse,
}

impl fmt::Display for ProviderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFault::Timeout => write!(f, "attempt timed out"),
            ProviderFault::RateLimited => write!(f, "rate limited by provider"),
            ProviderFault::Server { status, message } => {
                write!(f, "provider server error {}: {}", status, message)
            }
            ProviderFault::Network(msg) => write!(f, "network error: {}", msg),
            ProviderFault::InvalidCredential => write!(f, "invalid credential"),
            ProviderFault::MalformedRequest(msg) => write!(f, "malformed request: {}", msg),
            ProviderFault::ContentPolicy(msg) => write!(f, "content policy rejection: {}", msg),
            ProviderFault::EmptyResponse => write!(f, "provider returned no completion"),
        }
    }
}

impl Error for ProviderFault {}

/// Trait defining the interface to interact with various LLM services.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// The model identifier this client targets.
    fn model_name(&self) -> &str;

    /// Send one request to the provider and return the assistant's reply.
    /// - `messages`: the messages to send in the request.
    /// - `temperature`: sampling temperature for this call.
    async fn send_message(
        &self,
        messages: &[Message],
        temperature: f32,
    ) -> Result<Message, ProviderFault>;
}
