//! Typed result of one question-answer cycle

use serde::Serialize;

use crate::retrieval::ScoredChunk;

/// Source passage that fed an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub source: String,
    pub page: u32,
    pub similarity: f32,
}

impl From<&ScoredChunk> for SourceRef {
    fn from(result: &ScoredChunk) -> Self {
        Self {
            source: result.chunk.metadata.source.clone(),
            page: result.chunk.metadata.page,
            similarity: result.similarity,
        }
    }
}

/// Outcome of answering a question
///
/// Every variant carries the text to show the user, so callers that only
/// need a string can use [`AnswerOutcome::text`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The model produced an answer grounded in retrieved passages
    Answered {
        answer: String,
        sources: Vec<SourceRef>,
    },
    /// Nothing relevant was found in the knowledge index
    NoMatch { message: String },
    /// Embedding, retrieval or generation failed; retrying may help
    TransientFailure { message: String, reason: String },
    /// The deployment is misconfigured; retrying will not help
    ConfigurationError { message: String, reason: String },
}

impl AnswerOutcome {
    /// Text shown to the user
    pub fn text(&self) -> &str {
        match self {
            Self::Answered { answer, .. } => answer,
            Self::NoMatch { message }
            | Self::TransientFailure { message, .. }
            | Self::ConfigurationError { message, .. } => message,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Answered { answer, .. } => answer,
            Self::NoMatch { message }
            | Self::TransientFailure { message, .. }
            | Self::ConfigurationError { message, .. } => message,
        }
    }

    /// Stable name of the variant, used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Answered { .. } => "answered",
            Self::NoMatch { .. } => "no_match",
            Self::TransientFailure { .. } => "transient_failure",
            Self::ConfigurationError { .. } => "configuration_error",
        }
    }

    /// Sources behind the answer (empty unless answered)
    pub fn sources(&self) -> &[SourceRef] {
        match self {
            Self::Answered { sources, .. } => sources,
            _ => &[],
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::TransientFailure { .. } | Self::ConfigurationError { .. })
    }

    pub fn should_retry(&self) -> bool {
        matches!(self, Self::TransientFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_kind() {
        let outcome = AnswerOutcome::NoMatch {
            message: "No encontré información".to_string(),
        };
        assert_eq!(outcome.text(), "No encontré información");
        assert_eq!(outcome.kind(), "no_match");
        assert!(!outcome.is_failure());
        assert!(outcome.sources().is_empty());

        let failure = AnswerOutcome::TransientFailure {
            message: "Lo siento".to_string(),
            reason: "timeout".to_string(),
        };
        assert!(failure.is_failure());
        assert!(failure.should_retry());
        assert_eq!(failure.into_text(), "Lo siento");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let outcome = AnswerOutcome::ConfigurationError {
            message: "Lo siento".to_string(),
            reason: "HTTP 401".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["kind"], "configuration_error");
        assert_eq!(value["reason"], "HTTP 401");
    }
}
