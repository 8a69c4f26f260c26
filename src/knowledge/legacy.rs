//! Reduced-field shape kept for older consumers.
//!
//! Known recommendations expose `timing` but not `dosing`/`limitations`;
//! potential recommendations expose `dosing`/`limitations` but not `timing`.
//! Downstream readers depend on this exact shape.

use serde::Serialize;

use super::types::{DebunkedClaim, OrganRecommendations, RecommendationItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyKnownRecommendation {
    /// Name of the action.
    pub intervention: String,
    /// Free-text justification.
    pub rationale: String,
    /// Strength of the supporting evidence.
    pub evidence_level: String,
    /// When to apply it.
    pub timing: String,
}

impl From<&RecommendationItem> for LegacyKnownRecommendation {
    fn from(item: &RecommendationItem) -> Self {
        Self {
            intervention: item.intervention.clone(),
            rationale: item.rationale.clone(),
            evidence_level: item.evidence_level.clone(),
            timing: item.timing.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyPotentialRecommendation {
    /// Name of the action.
    pub intervention: String,
    /// Free-text justification.
    pub rationale: String,
    /// Strength of the supporting evidence.
    pub evidence_level: String,
    /// Amount or schedule.
    pub dosing: String,
    /// Caveats and contraindications.
    pub limitations: String,
}

impl From<&RecommendationItem> for LegacyPotentialRecommendation {
    fn from(item: &RecommendationItem) -> Self {
        Self {
            intervention: item.intervention.clone(),
            rationale: item.rationale.clone(),
            evidence_level: item.evidence_level.clone(),
            dosing: item.dosing.clone(),
            limitations: item.limitations.clone(),
        }
    }
}

/// Legacy serialization of an organ record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyOrganRecommendations {
    /// Known items, keeping `timing` only.
    pub known_recommendations: Vec<LegacyKnownRecommendation>,
    /// Potential items, keeping `dosing` and `limitations` only.
    pub potential_recommendations: Vec<LegacyPotentialRecommendation>,
    /// Claims copied unchanged.
    pub debunked_claims: Vec<DebunkedClaim>,
}

impl From<&OrganRecommendations> for LegacyOrganRecommendations {
    fn from(record: &OrganRecommendations) -> Self {
        Self {
            known_recommendations: record
                .known_recommendations
                .iter()
                .map(LegacyKnownRecommendation::from)
                .collect(),
            potential_recommendations: record
                .potential_recommendations
                .iter()
                .map(LegacyPotentialRecommendation::from)
                .collect(),
            debunked_claims: record.debunked_claims.clone(),
        }
    }
}
