//! Read-only organ recommendations repository.
//!
//! Data is authored in `data/organ_recommendations.json`, embedded into the
//! binary and parsed once into a process-wide instance. Lookups never fail:
//! an unknown organ yields a generic fallback record.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

use super::legacy::LegacyOrganRecommendations;
use super::source::{KnowledgeFact, KnowledgeSource};
use super::types::OrganRecommendations;

const EMBEDDED_DATA: &str = include_str!("../../data/organ_recommendations.json");

static REPOSITORY: OnceLock<OrganRepository> = OnceLock::new();

/// Errors from loading repository data.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to read recommendations file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse recommendations data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate organ key: {0}")]
    DuplicateOrgan(String),
    #[error("Organ key must not be empty")]
    EmptyOrganKey,
}

/// On-disk entry: the organ key plus its flattened record.
#[derive(Debug, Deserialize)]
struct OrganEntry {
    organ: String,
    #[serde(flatten)]
    record: OrganRecommendations,
}

/// Immutable mapping from organ name to recommendations.
#[derive(Debug)]
pub struct OrganRepository {
    /// Records in authored order.
    organs: Vec<(String, OrganRecommendations)>,
    /// Organ key -> position in `organs`.
    index: HashMap<String, usize>,
    fallback: OrganRecommendations,
}

impl OrganRepository {
    /// Repository with no authored organs. Every lookup returns the fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            organs: Vec::new(),
            index: HashMap::new(),
            fallback: OrganRecommendations::fallback(),
        }
    }

    /// Parse repository data from a JSON array of organ entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Parse` for malformed data, and
    /// `DuplicateOrgan`/`EmptyOrganKey` for invalid keys.
    pub fn from_json(json: &str) -> Result<Self, RepositoryError> {
        let entries: Vec<OrganEntry> = serde_json::from_str(json)?;

        let mut repo = Self::empty();
        for entry in entries {
            if entry.organ.is_empty() {
                return Err(RepositoryError::EmptyOrganKey);
            }
            if repo.index.contains_key(&entry.organ) {
                return Err(RepositoryError::DuplicateOrgan(entry.organ));
            }
            repo.index.insert(entry.organ.clone(), repo.organs.len());
            repo.organs.push((entry.organ, entry.record));
        }

        tracing::debug!(organs = repo.organs.len(), "Loaded organ recommendations");
        Ok(repo)
    }

    /// Load repository data from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Read` if the file cannot be read, or any
    /// error from [`OrganRepository::from_json`].
    pub fn from_path(path: &Path) -> Result<Self, RepositoryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RepositoryError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// The process-wide repository.
    ///
    /// Built from the embedded data on first use unless [`OrganRepository::init_from_path`]
    /// installed another data file first.
    pub fn builtin() -> &'static Self {
        REPOSITORY.get_or_init(|| match Self::from_json(EMBEDDED_DATA) {
            Ok(repo) => repo,
            Err(e) => {
                tracing::error!(error = %e, "Embedded recommendations data is invalid");
                Self::empty()
            }
        })
    }

    /// Install the process-wide repository from a data file.
    ///
    /// Must run at start-up, before the first [`OrganRepository::builtin`] call;
    /// later calls keep the already-installed repository.
    ///
    /// # Errors
    ///
    /// Returns any error from [`OrganRepository::from_path`].
    pub fn init_from_path(path: &Path) -> Result<&'static Self, RepositoryError> {
        let repo = Self::from_path(path)?;
        if REPOSITORY.set(repo).is_err() {
            tracing::warn!(path = %path.display(), "Repository already initialized, ignoring data file");
        }
        Ok(Self::builtin())
    }

    /// Recommendations for an organ, or the fallback record if it is unknown.
    ///
    /// Keys are matched exactly and case-sensitively.
    #[must_use]
    pub fn get_organ_recommendations(&self, organ: &str) -> &OrganRecommendations {
        match self.index.get(organ) {
            Some(&i) => &self.organs[i].1,
            None => {
                tracing::trace!(organ, "Unknown organ, using fallback record");
                &self.fallback
            }
        }
    }

    /// Supported organ keys in authored order.
    #[must_use]
    pub fn get_all_supported_organs(&self) -> Vec<&str> {
        self.organs.iter().map(|(organ, _)| organ.as_str()).collect()
    }

    /// Check whether an organ has authored data.
    #[must_use]
    pub fn contains(&self, organ: &str) -> bool {
        self.index.contains_key(organ)
    }

    /// Reduced-field projection of an organ's record for older consumers.
    #[must_use]
    pub fn convert_to_legacy_format(&self, organ: &str) -> LegacyOrganRecommendations {
        LegacyOrganRecommendations::from(self.get_organ_recommendations(organ))
    }

    /// Organ keys mentioned in free text, in authored order.
    fn organs_mentioned(&self, text: &str) -> Vec<&str> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        self.organs
            .iter()
            .map(|(organ, _)| organ.as_str())
            .filter(|organ| {
                let organ = organ.to_lowercase();
                words
                    .iter()
                    .any(|w| *w == organ || format!("{w}s") == organ)
            })
            .collect()
    }
}

/// Render an organ's record as prompt-ready text.
fn render_organ(organ: &str, record: &OrganRecommendations) -> String {
    let mut out = format!("### {organ}\n");

    if !record.known_recommendations.is_empty() {
        out.push_str("Known recommendations:\n");
        for item in &record.known_recommendations {
            let _ = writeln!(
                out,
                "- {} [{}]: {}",
                item.intervention, item.evidence_level, item.rationale
            );
        }
    }
    if !record.potential_recommendations.is_empty() {
        out.push_str("Potential recommendations:\n");
        for item in &record.potential_recommendations {
            let _ = writeln!(
                out,
                "- {} [{}]: {}",
                item.intervention, item.evidence_level, item.rationale
            );
        }
    }
    if !record.debunked_claims.is_empty() {
        out.push_str("Debunked claims:\n");
        for claim in &record.debunked_claims {
            let _ = writeln!(
                out,
                "- \"{}\": {} (debunked by {})",
                claim.claim, claim.reason_debunked, claim.debunked_by
            );
        }
    }

    out
}

impl KnowledgeSource for OrganRepository {
    fn source_name(&self) -> &'static str {
        "Organ recommendations"
    }

    fn query(&self, question: &str) -> Option<KnowledgeFact> {
        let mentioned = self.organs_mentioned(question);
        if mentioned.is_empty() {
            return None;
        }

        let content = mentioned
            .iter()
            .map(|organ| render_organ(organ, self.get_organ_recommendations(organ)))
            .collect::<Vec<_>>()
            .join("\n");

        Some(KnowledgeFact {
            source: self.source_name().to_string(),
            content,
        })
    }

    fn context_summary(&self) -> Option<String> {
        if self.organs.is_empty() {
            return None;
        }
        Some(format!(
            "Curated recommendations available for: {}",
            self.get_all_supported_organs().join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> OrganRepository {
        OrganRepository::from_json(EMBEDDED_DATA).unwrap()
    }

    #[test]
    fn test_embedded_data_parses() {
        assert!(OrganRepository::from_json(EMBEDDED_DATA).is_ok());
    }

    #[test]
    fn test_supported_organs_in_authored_order() {
        let repo = repo();
        assert_eq!(
            repo.get_all_supported_organs(),
            vec!["kidneys", "brain", "liver"]
        );
    }

    #[test]
    fn test_known_organ_returns_authored_record() {
        let repo = repo();
        let kidneys = repo.get_organ_recommendations("kidneys");
        assert_eq!(
            kidneys.known_recommendations[0].intervention,
            "Blood pressure control"
        );
        assert!(!kidneys.potential_recommendations.is_empty());
        assert!(!kidneys.debunked_claims.is_empty());
    }

    #[test]
    fn test_missing_timing_gets_default() {
        let repo = repo();
        let nsaid = &repo.get_organ_recommendations("kidneys").known_recommendations[2];
        assert_eq!(nsaid.timing, "as clinically indicated");
    }

    #[test]
    fn test_unknown_organs_return_fallback() {
        let repo = repo();
        for organ in ["pancreas", "", "KIDNEYS", "Liver", " brain"] {
            let record = repo.get_organ_recommendations(organ);
            assert_eq!(record.known_recommendations.len(), 1, "organ {organ:?}");
            assert!(record.potential_recommendations.is_empty());
            assert!(record.debunked_claims.is_empty());
        }
    }

    #[test]
    fn test_lookups_are_repeatable() {
        let repo = repo();
        let first = repo.get_organ_recommendations("liver").clone();
        let second = repo.get_organ_recommendations("liver");
        assert_eq!(&first, second);
        assert_eq!(
            repo.convert_to_legacy_format("brain"),
            repo.convert_to_legacy_format("brain")
        );
        assert_eq!(
            repo.get_all_supported_organs(),
            repo.get_all_supported_organs()
        );
    }

    #[test]
    fn test_duplicate_organ_rejected() {
        let json = r#"[{"organ": "brain"}, {"organ": "brain"}]"#;
        let err = OrganRepository::from_json(json).unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateOrgan(ref o) if o == "brain"));
    }

    #[test]
    fn test_empty_organ_key_rejected() {
        let json = r#"[{"organ": ""}]"#;
        let err = OrganRepository::from_json(json).unwrap_err();
        assert!(matches!(err, RepositoryError::EmptyOrganKey));
    }

    #[test]
    fn test_malformed_data_rejected() {
        let err = OrganRepository::from_json("{not json").unwrap_err();
        assert!(matches!(err, RepositoryError::Parse(_)));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = OrganRepository::from_path(Path::new("/nonexistent/organs.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/organs.json"));
    }

    #[test]
    fn test_empty_repository_falls_back() {
        let repo = OrganRepository::empty();
        assert!(repo.get_all_supported_organs().is_empty());
        assert_eq!(
            repo.get_organ_recommendations("kidneys"),
            &OrganRecommendations::fallback()
        );
        assert!(repo.context_summary().is_none());
    }

    #[test]
    fn test_query_matches_singular_and_case() {
        let repo = repo();
        let fact = repo.query("Does cranberry juice cure a KIDNEY infection?").unwrap();
        assert!(fact.content.contains("### kidneys"));
        assert!(fact.content.contains("cranberry juice"));
        assert!(!fact.content.contains("### liver"));
    }

    #[test]
    fn test_query_multiple_organs() {
        let repo = repo();
        let fact = repo.query("alcohol effects on liver and brain").unwrap();
        assert!(fact.content.contains("### brain"));
        assert!(fact.content.contains("### liver"));
    }

    #[test]
    fn test_query_no_match() {
        assert!(repo().query("vitamin C and colds").is_none());
    }

    #[test]
    fn test_context_summary_lists_organs() {
        let summary = repo().context_summary().unwrap();
        assert!(summary.contains("kidneys, brain, liver"));
    }
}
