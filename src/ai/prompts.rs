//! Prompts for the fact-checking agent.

use crate::knowledge::{format_fact, KnowledgeFact};

/// System prompt for the fact checker.
pub const FACT_CHECK_SYSTEM_PROMPT: &str = r"You are a careful medical fact checker.

You receive a health-related subject (a claim, product, practice or question)
and must assess it against current scientific and clinical evidence.

For the subject:
1. Restate the claim being evaluated in one sentence.
2. Give a verdict: SUPPORTED, PARTIALLY SUPPORTED, MISLEADING, UNSUPPORTED or INSUFFICIENT EVIDENCE.
3. Summarize the strongest evidence for and against, naming authorities or study types.
4. Explain any potential harm of acting on the claim.
5. List safer, evidence-based alternatives when relevant.

Curated knowledge may be supplied below the subject. Prefer it where it applies
and say so when your verdict matches a listed debunked claim.

Do not give individual medical advice. End with a one-line reminder to consult
a qualified clinician.
";

/// Format the user message for a fact-check request.
#[must_use]
pub fn format_fact_check_request(
    subject: &str,
    context: Option<&str>,
    knowledge: Option<&KnowledgeFact>,
) -> String {
    let mut request = format!("Subject: {subject}");

    if let Some(context) = context {
        request.push_str("\n\nAdditional context from the user:\n");
        request.push_str(context);
    }

    if let Some(fact) = knowledge {
        request.push_str("\n\n# Curated knowledge\n\n");
        request.push_str(&format_fact(fact));
    }

    request
}
