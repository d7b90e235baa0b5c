//! Model call gateway: one logical request to a provider, with bounded
//! retries, exponential backoff with jitter, and a hard per-attempt timeout.
//!
//! The gateway is stateless between invocations and never lets a provider
//! fault escape as anything other than a [`DebateError`]. The decision of
//! *whether* a fault is worth retrying lives in [`classify`], a pure
//! function kept separate from the retry loop so it can be tested on its
//! own.

use std::time::Duration;

use rand::Rng;

use crate::debatellm::client_wrapper::{ClientWrapper, Message, ProviderFault};
use crate::debatellm::error::DebateError;

/// Whether a provider fault is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Retrying may succeed: timeouts, rate limits, 5xx, network flakes.
    Transient,
    /// Retrying cannot help: bad credential, malformed request, policy
    /// rejection.
    Permanent,
}

/// Map a provider fault to its retry class.
pub fn classify(fault: &ProviderFault) -> FaultClass {
    match fault {
        ProviderFault::Timeout
        | ProviderFault::RateLimited
        | ProviderFault::Server { .. }
        | ProviderFault::Network(_)
        | ProviderFault::EmptyResponse => FaultClass::Transient,
        ProviderFault::InvalidCredential
        | ProviderFault::MalformedRequest(_)
        | ProviderFault::ContentPolicy(_) => FaultClass::Permanent,
    }
}

/// Retry and timeout knobs for the gateway.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts per logical request, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles per retry.
    pub base_delay: Duration,
    /// Upper bound on the computed backoff, before jitter.
    pub max_delay: Duration,
    /// Hard deadline for each individual attempt. Exceeding it counts as a
    /// transient fault.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff to sleep before attempt number `attempt` (1-based; attempt 1
    /// never sleeps). Exponential, capped at `max_delay`, plus up to 50%
    /// random jitter so concurrent callers do not retry in lockstep.
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2).min(16);
        let base = self
            .base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        let jitter_ceiling = (base.as_millis() as u64) / 2;
        let jitter = if jitter_ceiling > 0 {
            rand::thread_rng().gen_range(0..=jitter_ceiling)
        } else {
            0
        };
        base + Duration::from_millis(jitter)
    }
}

/// Issues one logical request to a provider through its [`ClientWrapper`].
pub struct ModelCallGateway {
    policy: RetryPolicy,
}

impl Default for ModelCallGateway {
    fn default() -> Self {
        ModelCallGateway {
            policy: RetryPolicy::default(),
        }
    }
}

impl ModelCallGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        ModelCallGateway { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `messages` to the provider and return the completion text.
    ///
    /// Transient faults are retried up to `max_attempts` total attempts with
    /// exponential backoff; permanent faults fail on first sight. Both
    /// outcomes surface as [`DebateError::ProviderUnavailable`] carrying the
    /// last observed fault.
    pub async fn invoke(
        &self,
        client: &dyn ClientWrapper,
        messages: &[Message],
        temperature: f32,
    ) -> Result<String, DebateError> {
        let mut last_fault: Option<ProviderFault> = None;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.backoff(attempt)).await;
            }

            let outcome =
                tokio::time::timeout(self.policy.attempt_timeout, client.send_message(messages, temperature))
                    .await;

            let fault = match outcome {
                Ok(Ok(reply)) => return Ok(reply.content),
                Ok(Err(fault)) => fault,
                Err(_elapsed) => ProviderFault::Timeout,
            };

            match classify(&fault) {
                FaultClass::Permanent => {
                    if log::log_enabled!(log::Level::Error) {
                        log::error!(
                            "ModelCallGateway::invoke(...): permanent fault from {}: {}",
                            client.model_name(),
                            fault
                        );
                    }
                    return Err(DebateError::ProviderUnavailable(fault.to_string()));
                }
                FaultClass::Transient => {
                    log::warn!(
                        "ModelCallGateway::invoke(...): attempt {}/{} against {} failed: {}",
                        attempt,
                        self.policy.max_attempts,
                        client.model_name(),
                        fault
                    );
                    last_fault = Some(fault);
                }
            }
        }

        let detail = last_fault
            .map(|f| f.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(DebateError::ProviderUnavailable(format!(
            "retries exhausted after {} attempts: {}",
            self.policy.max_attempts, detail
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debatellm::client_wrapper::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Client that fails transiently a fixed number of times, then succeeds.
    struct FlakyClient {
        failures_before_success: usize,
        attempts: AtomicUsize,
    }

    impl FlakyClient {
        fn new(failures_before_success: usize) -> Self {
            FlakyClient {
                failures_before_success,
                attempts: AtomicUsize::new(0),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClientWrapper for FlakyClient {
        fn model_name(&self) -> &str {
            "flaky-mock"
        }

        async fn send_message(
            &self,
            _messages: &[Message],
            _temperature: f32,
        ) -> Result<Message, ProviderFault> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures_before_success {
                Err(ProviderFault::Server {
                    status: 503,
                    message: "overloaded".to_string(),
                })
            } else {
                Ok(Message {
                    role: Role::Assistant,
                    content: "recovered".to_string(),
                })
            }
        }
    }

    struct CredentialRejectingClient {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl ClientWrapper for CredentialRejectingClient {
        fn model_name(&self) -> &str {
            "auth-mock"
        }

        async fn send_message(
            &self,
            _messages: &[Message],
            _temperature: f32,
        ) -> Result<Message, ProviderFault> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(ProviderFault::InvalidCredential)
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            attempt_timeout: Duration::from_secs(5),
        }
    }

    fn prompt() -> Vec<Message> {
        vec![Message {
            role: Role::User,
            content: "argue".to_string(),
        }]
    }

    #[test]
    fn classifier_splits_faults() {
        assert_eq!(classify(&ProviderFault::Timeout), FaultClass::Transient);
        assert_eq!(classify(&ProviderFault::RateLimited), FaultClass::Transient);
        assert_eq!(
            classify(&ProviderFault::Server {
                status: 500,
                message: String::new()
            }),
            FaultClass::Transient
        );
        assert_eq!(
            classify(&ProviderFault::Network("reset".into())),
            FaultClass::Transient
        );
        assert_eq!(classify(&ProviderFault::EmptyResponse), FaultClass::Transient);
        assert_eq!(
            classify(&ProviderFault::InvalidCredential),
            FaultClass::Permanent
        );
        assert_eq!(
            classify(&ProviderFault::MalformedRequest("bad".into())),
            FaultClass::Permanent
        );
        assert_eq!(
            classify(&ProviderFault::ContentPolicy("refused".into())),
            FaultClass::Permanent
        );
    }

    #[tokio::test]
    async fn succeeds_after_two_transient_failures() {
        let gateway = ModelCallGateway::with_policy(fast_policy());
        let client = FlakyClient::new(2);

        let text = gateway.invoke(&client, &prompt(), 0.7).await.unwrap();

        assert_eq!(text, "recovered");
        assert_eq!(client.attempts(), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_after_exactly_max_attempts() {
        let gateway = ModelCallGateway::with_policy(fast_policy());
        let client = FlakyClient::new(usize::MAX);

        let err = gateway.invoke(&client, &prompt(), 0.7).await.unwrap_err();

        assert_eq!(err.kind(), "provider_unavailable");
        assert_eq!(client.attempts(), 3);
    }

    #[tokio::test]
    async fn permanent_fault_fails_without_retry() {
        let gateway = ModelCallGateway::with_policy(fast_policy());
        let client = CredentialRejectingClient {
            attempts: AtomicUsize::new(0),
        };

        let err = gateway.invoke(&client, &prompt(), 0.7).await.unwrap_err();

        assert_eq!(err.kind(), "provider_unavailable");
        assert_eq!(client.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempt_timeout_counts_as_transient() {
        struct StallingClient;

        #[async_trait]
        impl ClientWrapper for StallingClient {
            fn model_name(&self) -> &str {
                "stalling-mock"
            }

            async fn send_message(
                &self,
                _messages: &[Message],
                _temperature: f32,
            ) -> Result<Message, ProviderFault> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(ProviderFault::EmptyResponse)
            }
        }

        let mut policy = fast_policy();
        policy.attempt_timeout = Duration::from_millis(5);
        let gateway = ModelCallGateway::with_policy(policy);

        let err = gateway.invoke(&StallingClient, &prompt(), 0.7).await.unwrap_err();
        assert_eq!(err.kind(), "provider_unavailable");
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
            attempt_timeout: Duration::from_secs(1),
        };
        // Even at a high attempt number the pre-jitter delay stays capped;
        // jitter adds at most half the cap on top.
        let delay = policy.backoff(9);
        assert!(delay <= Duration::from_millis(600));
    }
}
