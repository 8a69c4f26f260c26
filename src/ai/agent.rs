//! Fact-checking analysis agent.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::config::{AgentConfig, ProviderKind, ProvidersConfig};
use crate::display;
use crate::knowledge::KnowledgeSource;
use crate::session::{ProviderAttempt, Session};

use super::client::{AiError, AiProvider, Provider};
use super::prompts::{format_fact_check_request, FACT_CHECK_SYSTEM_PROMPT};

/// Errors from running an analysis.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Subject must not be empty")]
    EmptySubject,
    #[error("Primary provider {provider} unavailable: {source}")]
    PrimaryUnavailable {
        provider: ProviderKind,
        #[source]
        source: AiError,
    },
    #[error("No AI providers configured")]
    NoProviders,
    #[error("All providers failed: {}", format_attempts(.0))]
    AllProvidersFailed(Vec<ProviderAttempt>),
}

fn format_attempts(attempts: &[ProviderAttempt]) -> String {
    attempts
        .iter()
        .map(|a| {
            format!(
                "{} ({}): {}",
                a.provider,
                a.model,
                a.error.as_deref().unwrap_or("ok")
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Capability the session runner depends on.
#[async_trait]
pub trait AnalysisAgent: Send + Sync {
    /// Analyze a subject and return the completed session.
    async fn start_analysis(
        &self,
        subject: &str,
        context: Option<&str>,
    ) -> Result<Session, AgentError>;
}

/// A provider in the agent's fallback chain.
pub struct ProviderSlot {
    pub kind: ProviderKind,
    pub model: String,
    provider: Box<dyn AiProvider>,
}

impl ProviderSlot {
    #[must_use]
    pub fn new(kind: ProviderKind, model: impl Into<String>, provider: Box<dyn AiProvider>) -> Self {
        Self {
            kind,
            model: model.into(),
            provider,
        }
    }
}

/// LLM-backed fact checker trying providers in order.
pub struct FactChecker {
    slots: Vec<ProviderSlot>,
    knowledge: Option<&'static dyn KnowledgeSource>,
    interactive: bool,
}

impl FactChecker {
    #[must_use]
    pub fn new(slots: Vec<ProviderSlot>, interactive: bool) -> Self {
        Self {
            slots,
            knowledge: None,
            interactive,
        }
    }

    /// Build the provider chain from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::PrimaryUnavailable` if the primary provider's API
    /// key is missing. Fallbacks without a key are skipped.
    pub fn from_config(
        agent: &AgentConfig,
        providers: &ProvidersConfig,
    ) -> Result<Self, AgentError> {
        let mut slots = Vec::new();

        for kind in agent.provider_order() {
            let endpoint = providers.resolve(kind);
            match Provider::from_env(&endpoint) {
                Ok(provider) => {
                    slots.push(ProviderSlot::new(kind, endpoint.model, Box::new(provider)));
                }
                Err(e) if kind == agent.primary => {
                    return Err(AgentError::PrimaryUnavailable {
                        provider: kind,
                        source: e,
                    });
                }
                Err(e) => {
                    tracing::warn!(provider = %kind, error = %e, "Skipping fallback provider");
                }
            }
        }

        let checker = Self::new(slots, agent.interactive);
        tracing::debug!(
            providers = ?checker.provider_order(),
            interactive = agent.interactive,
            "Fact checker configured"
        );
        Ok(checker)
    }

    /// Attach curated knowledge used to enrich requests.
    #[must_use]
    pub fn with_knowledge(mut self, source: &'static dyn KnowledgeSource) -> Self {
        self.knowledge = Some(source);
        self
    }

    /// Providers in the order they are tried.
    #[must_use]
    pub fn provider_order(&self) -> Vec<ProviderKind> {
        self.slots.iter().map(|s| s.kind).collect()
    }
}

#[async_trait]
impl AnalysisAgent for FactChecker {
    async fn start_analysis(
        &self,
        subject: &str,
        context: Option<&str>,
    ) -> Result<Session, AgentError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(AgentError::EmptySubject);
        }
        if self.slots.is_empty() {
            return Err(AgentError::NoProviders);
        }

        let started_at = Utc::now();
        let fact = self.knowledge.and_then(|k| k.query(subject));
        if let Some(fact) = &fact {
            tracing::debug!(source = %fact.source, "Including curated knowledge");
        }
        let request = format_fact_check_request(subject, context, fact.as_ref());

        let mut attempts = Vec::new();
        for slot in &self.slots {
            tracing::info!(provider = %slot.kind, model = %slot.model, "Requesting fact check");
            if self.interactive {
                display::print_provider_attempt(slot.kind.as_str(), &slot.model);
            }

            match slot.provider.generate(FACT_CHECK_SYSTEM_PROMPT, &request).await {
                Ok(text) => {
                    if self.interactive {
                        display::print_provider_result(slot.kind.as_str(), &slot.model, None);
                    }
                    attempts.push(ProviderAttempt {
                        provider: slot.kind,
                        model: slot.model.clone(),
                        error: None,
                    });

                    let mut session = Session::new(
                        subject,
                        context.map(String::from),
                        started_at,
                        slot.kind,
                        slot.model.clone(),
                        text,
                    );
                    session.attempts = attempts;
                    return Ok(session);
                }
                Err(e) => {
                    tracing::warn!(provider = %slot.kind, error = %e, "Provider failed");
                    let message = e.to_string();
                    if self.interactive {
                        display::print_provider_result(
                            slot.kind.as_str(),
                            &slot.model,
                            Some(&message),
                        );
                    }
                    attempts.push(ProviderAttempt {
                        provider: slot.kind,
                        model: slot.model.clone(),
                        error: Some(message),
                    });
                }
            }
        }

        Err(AgentError::AllProvidersFailed(attempts))
    }
}
