//! Knowledge source trait used to enrich fact-check requests.

/// A fact retrieved from a knowledge source.
#[derive(Debug, Clone)]
pub struct KnowledgeFact {
    /// Which source provided this fact
    pub source: String,
    /// The fact content
    pub content: String,
}

/// A source of curated knowledge for the fact checker.
pub trait KnowledgeSource: Send + Sync {
    /// Unique name for this source.
    fn source_name(&self) -> &'static str;

    /// Query for facts relevant to a subject.
    fn query(&self, question: &str) -> Option<KnowledgeFact>;

    /// Short summary of what this source covers.
    fn context_summary(&self) -> Option<String>;
}

/// Render a fact and its source as a prompt section.
#[must_use]
pub fn format_fact(fact: &KnowledgeFact) -> String {
    format!("## {}\n\n{}", fact.source, fact.content.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fact_includes_source_heading() {
        let fact = KnowledgeFact {
            source: "rules".to_string(),
            content: "Use Rust\n\n".to_string(),
        };
        assert_eq!(format_fact(&fact), "## rules\n\nUse Rust");
    }
}
