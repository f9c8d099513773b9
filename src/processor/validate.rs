use log::{debug, warn};

use super::truncate_chars;
use crate::providers::traits::CompletionProvider;

/// Vocabulary of terms a resume is expected to contain. The lexical
/// pre-filter counts how many distinct terms appear.
pub const RESUME_INDICATORS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "employment",
    "work history",
    "career",
    "objective",
    "summary",
    "certification",
    "university",
    "degree",
    "professional",
    "references",
    "achievements",
];

/// Indicator count below this rejects without any classification call.
const HEURISTIC_REJECT_BELOW: usize = 2;
/// On classification failure, accept anyway at this indicator count.
const HEURISTIC_ACCEPT_AT: usize = 3;

const CLASSIFICATION_PREFIX_CHARS: usize = 2500;

const CLASSIFIER_SYSTEM_PROMPT: &str =
    "You classify documents. Answer strictly in the requested two-line format.";

/// Outcome of validation. A rejected document is a normal negative
/// classification, not an error.
#[derive(Debug, Clone)]
pub struct Validation {
    pub is_valid: bool,
    pub reason: String,
}

impl Validation {
    fn accept(reason: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            reason: reason.into(),
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
        }
    }
}

/// Count distinct indicator terms present in the text.
pub fn indicator_count(text: &str) -> usize {
    let lower = text.to_lowercase();
    RESUME_INDICATORS
        .iter()
        .filter(|term| lower.contains(*term))
        .count()
}

/// Two-stage gate: a cheap lexical pre-filter rejects obvious non-resumes
/// without spending a classification call; otherwise a bounded prefix of
/// the text goes to the classifier with a strict two-line answer contract.
pub async fn validate_resume(provider: &dyn CompletionProvider, text: &str) -> Validation {
    let indicators = indicator_count(text);
    if indicators < HEURISTIC_REJECT_BELOW {
        debug!("validator fast-path reject: {} indicator terms", indicators);
        return Validation::reject(format!(
            "Document does not look like a resume ({} resume indicator terms found)",
            indicators
        ));
    }

    let prefix = truncate_chars(text, CLASSIFICATION_PREFIX_CHARS);
    let prompt = format!(
        "Is the following document a resume/CV? Answer in exactly two lines:\n\
         ANSWER: YES or NO\n\
         REASON: <one short sentence>\n\n\
         Document:\n{}",
        prefix
    );

    match provider.complete(CLASSIFIER_SYSTEM_PROMPT, &prompt).await {
        Ok(response) => parse_classification(&response),
        Err(e) => {
            // Classifier unavailable: the heuristic is the safety net.
            warn!("resume classification call failed: {}", e);
            if indicators >= HEURISTIC_ACCEPT_AT {
                Validation::accept(format!(
                    "Classification unavailable; accepted on {} resume indicator terms",
                    indicators
                ))
            } else {
                Validation::reject(format!("Classification failed: {}", e))
            }
        }
    }
}

fn parse_classification(response: &str) -> Validation {
    let mut answer: Option<bool> = None;
    let mut reason: Option<String> = None;

    for line in response.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("ANSWER:") {
            match value.trim().to_uppercase().as_str() {
                "YES" => answer = Some(true),
                "NO" => answer = Some(false),
                _ => {}
            }
        } else if let Some(value) = line.strip_prefix("REASON:") {
            let value = value.trim();
            if !value.is_empty() {
                reason = Some(value.to_string());
            }
        }
    }

    match answer {
        Some(is_valid) => Validation {
            is_valid,
            reason: reason.unwrap_or_else(|| "No reason given".to_string()),
        },
        None => Validation::reject("Could not parse classification response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    const RECIPE: &str = "Mix the flour and sugar in a bowl.\n\n\
        Fold in three eggs and a cup of milk, then bake for thirty minutes.";

    const RESUME: &str = "Jane Doe\n\nExperience: 6 years as a backend engineer.\n\n\
        Education: BSc Computer Science, State University.\n\nSkills: Rust, Postgres, AWS.";

    #[test]
    fn test_indicator_count_counts_distinct_terms() {
        assert!(indicator_count(RECIPE) < 2);
        assert!(indicator_count(RESUME) >= 3);
    }

    #[tokio::test]
    async fn test_non_resume_rejected_without_classification_call() {
        let provider = MockProvider::new();
        let validation = validate_resume(&provider, RECIPE).await;
        assert!(!validation.is_valid);
        assert_eq!(provider.completion_calls(), 0);
    }

    #[tokio::test]
    async fn test_classifier_accept() {
        let provider = MockProvider::new();
        provider.push_response("ANSWER: YES\nREASON: Contains work history and education.");
        let validation = validate_resume(&provider, RESUME).await;
        assert!(validation.is_valid);
        assert_eq!(validation.reason, "Contains work history and education.");
        assert_eq!(provider.completion_calls(), 1);
    }

    #[tokio::test]
    async fn test_classifier_reject() {
        let provider = MockProvider::new();
        provider.push_response("ANSWER: NO\nREASON: This is a product brochure.");
        let validation = validate_resume(&provider, RESUME).await;
        assert!(!validation.is_valid);
    }

    #[tokio::test]
    async fn test_unparseable_classification_rejects() {
        let provider = MockProvider::with_default("Sure! This looks like a resume to me.");
        let validation = validate_resume(&provider, RESUME).await;
        assert!(!validation.is_valid);
        assert!(validation.reason.contains("parse"));
    }

    #[tokio::test]
    async fn test_call_failure_falls_back_to_heuristic() {
        let provider = MockProvider::failing();
        let validation = validate_resume(&provider, RESUME).await;
        // RESUME carries >= 3 indicator terms, so it is accepted anyway
        assert!(validation.is_valid);

        // two indicator terms: past the pre-filter, but not enough to
        // accept once the classifier is down
        let weak = "Professional experience as a volunteer.\n\nAvailable weekends.";
        assert_eq!(indicator_count(weak), 2);
        let validation = validate_resume(&provider, weak).await;
        assert!(!validation.is_valid);
        assert!(validation.reason.contains("Classification failed"));
    }
}
