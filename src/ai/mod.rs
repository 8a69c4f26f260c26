//! AI fact-checking agent and its LLM providers.

mod agent;
mod client;
mod prompts;

pub use agent::{AgentError, AnalysisAgent, FactChecker, ProviderSlot};
pub use client::*;
pub use prompts::{format_fact_check_request, FACT_CHECK_SYSTEM_PROMPT};
