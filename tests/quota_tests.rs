use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use debatellm::client_wrapper::{ClientWrapper, Message, ProviderFault, Role};
use debatellm::quota::QuotaGuard;
use debatellm::registry::{ClientFactory, ProviderConfig, ProviderRegistry, ProviderSelector};
use debatellm::{DebateConfig, DebateError, DebateOrchestrator, Phase, Team};

/// Responds after a short delay so concurrent calls overlap.
struct SlowClient;

#[async_trait]
impl ClientWrapper for SlowClient {
    fn model_name(&self) -> &str {
        "slow"
    }

    async fn send_message(
        &self,
        _messages: &[Message],
        _temperature: f32,
    ) -> Result<Message, ProviderFault> {
        tokio::time::sleep(Duration::from_millis(25)).await;
        Ok(Message {
            role: Role::Assistant,
            content: "slow response".to_string(),
        })
    }
}

struct SlowFactory;

impl ClientFactory for SlowFactory {
    fn connect(
        &self,
        _config: &ProviderConfig,
    ) -> Result<Arc<dyn ClientWrapper>, DebateError> {
        Ok(Arc::new(SlowClient))
    }
}

fn slow_orchestrator(quota: Arc<QuotaGuard>) -> Arc<DebateOrchestrator> {
    let registry = Arc::new(ProviderRegistry::new(vec![ProviderConfig {
        id: "primary".to_string(),
        provider: "openai".to_string(),
        model: "test-model".to_string(),
        credential: "sk-test".to_string(),
        base_url: None,
        temperature: 0.7,
    }]));
    Arc::new(
        DebateOrchestrator::new(registry, quota)
            .with_client_factory(Arc::new(SlowFactory))
            .with_config(DebateConfig {
                num_rounds: 1,
                ..DebateConfig::default()
            }),
    )
}

#[tokio::test]
async fn one_remaining_unit_admits_exactly_one_of_two_concurrent_calls() {
    let quota = Arc::new(QuotaGuard::new());
    quota.register("caller", 1);
    let orchestrator = slow_orchestrator(quota.clone());
    let session = orchestrator.new_session("topic");

    let a = {
        let orchestrator = orchestrator.clone();
        let session = session.clone();
        tokio::spawn(async move {
            orchestrator
                .advance(
                    &session,
                    Phase::TeamOptions(Team::Affirmative),
                    &ProviderSelector::Default,
                    "caller",
                )
                .await
        })
    };
    let b = {
        let orchestrator = orchestrator.clone();
        let session = session.clone();
        tokio::spawn(async move {
            orchestrator
                .advance(
                    &session,
                    Phase::TeamOptions(Team::Negative),
                    &ProviderSelector::Default,
                    "caller",
                )
                .await
        })
    };

    let results = vec![a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let exhausted = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == "quota_exhausted"))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(exhausted, 1);
    assert_eq!(quota.status("caller").unwrap().remaining, 0);
}

#[tokio::test]
async fn exhausted_token_is_refused_until_re_registered() {
    let quota = Arc::new(QuotaGuard::new());
    quota.register("caller", 1);
    let orchestrator = slow_orchestrator(quota.clone());
    let session = orchestrator.new_session("topic");
    let selector = ProviderSelector::Default;

    orchestrator
        .advance(&session, Phase::TeamOptions(Team::Affirmative), &selector, "caller")
        .await
        .unwrap();

    let err = orchestrator
        .advance(&session, Phase::TeamOptions(Team::Negative), &selector, "caller")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "quota_exhausted");

    // Re-registration resets the allotment.
    quota.register("caller", 2);
    orchestrator
        .advance(&session, Phase::TeamOptions(Team::Negative), &selector, "caller")
        .await
        .unwrap();
    assert_eq!(quota.status("caller").unwrap().remaining, 1);
}

#[tokio::test]
async fn tokens_are_metered_independently() {
    let quota = Arc::new(QuotaGuard::new());
    quota.register("alpha", 1);
    quota.register("beta", 3);
    let orchestrator = slow_orchestrator(quota.clone());
    let session = orchestrator.new_session("topic");
    let selector = ProviderSelector::Default;

    orchestrator
        .advance(&session, Phase::TeamOptions(Team::Affirmative), &selector, "alpha")
        .await
        .unwrap();
    orchestrator
        .advance(&session, Phase::TeamOptions(Team::Negative), &selector, "beta")
        .await
        .unwrap();

    assert_eq!(quota.status("alpha").unwrap().remaining, 0);
    assert_eq!(quota.status("beta").unwrap().remaining, 2);
}
