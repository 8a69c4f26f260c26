//! Recommendation record types.

use serde::{Deserialize, Serialize};

/// Timing used when a recommendation does not specify one.
pub const DEFAULT_TIMING: &str = "as clinically indicated";

fn default_timing() -> String {
    DEFAULT_TIMING.to_string()
}

/// A single recommended intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationItem {
    /// Name of the action.
    pub intervention: String,
    /// Free-text justification.
    pub rationale: String,
    /// Strength or category of the supporting evidence.
    pub evidence_level: String,
    /// When to apply it; defaults to [`DEFAULT_TIMING`].
    #[serde(default = "default_timing")]
    pub timing: String,
    /// Amount or schedule, empty when not applicable.
    #[serde(default)]
    pub dosing: String,
    /// Caveats and contraindications, empty when none.
    #[serde(default)]
    pub limitations: String,
}

impl RecommendationItem {
    /// Create an item with default timing and no dosing or limitations.
    #[must_use]
    pub fn new(
        intervention: impl Into<String>,
        rationale: impl Into<String>,
        evidence_level: impl Into<String>,
    ) -> Self {
        Self {
            intervention: intervention.into(),
            rationale: rationale.into(),
            evidence_level: evidence_level.into(),
            timing: default_timing(),
            dosing: String::new(),
            limitations: String::new(),
        }
    }
}

/// A popular claim refuted by cited evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebunkedClaim {
    /// The claim as it circulates.
    pub claim: String,
    /// Why the claim does not hold.
    pub reason_debunked: String,
    /// Source or authority that refuted the claim.
    pub debunked_by: String,
    /// Studies or reviews behind the refutation.
    pub evidence: String,
    /// Harm caused by acting on the claim.
    pub why_harmful: String,
}

/// Everything known about one organ system.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrganRecommendations {
    /// Interventions backed by strong or standard-of-care evidence.
    #[serde(default)]
    pub known_recommendations: Vec<RecommendationItem>,
    /// Interventions with mixed, limited or precautionary evidence.
    #[serde(default)]
    pub potential_recommendations: Vec<RecommendationItem>,
    /// Popular claims about the organ that evidence refutes.
    #[serde(default)]
    pub debunked_claims: Vec<DebunkedClaim>,
}

impl OrganRecommendations {
    /// Record returned for organs with no authored data.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            known_recommendations: vec![RecommendationItem::new(
                "Consult a qualified healthcare provider",
                "No organ-specific recommendations are available; a clinician can give guidance for your situation.",
                "General medical guidance",
            )],
            potential_recommendations: Vec::new(),
            debunked_claims: Vec::new(),
        }
    }
}
