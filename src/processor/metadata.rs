use log::warn;
use serde::{Deserialize, Serialize};

use super::truncate_chars;
use crate::providers::traits::CompletionProvider;

const METADATA_PREFIX_CHARS: usize = 8000;

const EXTRACTOR_SYSTEM_PROMPT: &str =
    "You are an expert HR assistant that analyzes resumes and extracts key information accurately.";

/// Structured attributes of one resume. Every field has a defined default,
/// so the record is always well-formed and safe to render even when the
/// extraction call fails outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeMetadata {
    pub candidate_name: String,
    pub email: String,
    pub phone: String,
    pub summary: String,
    pub key_skills: Vec<String>,
    pub experience_years: u32,
    pub current_role: String,
    pub education: String,
    pub industries: Vec<String>,
    pub filename: String,
    /// Diagnostic from a failed extraction call, if any.
    pub error: Option<String>,
}

impl ResumeMetadata {
    pub fn defaults(filename: &str) -> Self {
        Self {
            candidate_name: "Unknown".to_string(),
            email: "Not provided".to_string(),
            phone: "Not provided".to_string(),
            summary: String::new(),
            key_skills: Vec::new(),
            experience_years: 0,
            current_role: "Unknown".to_string(),
            education: "Unknown".to_string(),
            industries: Vec::new(),
            filename: filename.to_string(),
            error: None,
        }
    }
}

/// Extract structured metadata from resume text via the completion
/// provider. Never fails: on call failure the defaulted record comes back
/// with the error embedded.
pub async fn generate_metadata(
    provider: &dyn CompletionProvider,
    text: &str,
    filename: &str,
) -> ResumeMetadata {
    let prefix = truncate_chars(text, METADATA_PREFIX_CHARS);
    let prompt = format!(
        "Analyze this resume and extract the following information in a structured format.\n\
         Be concise but thorough.\n\n\
         Resume text:\n{}\n\n\
         Please provide:\n\
         1. CANDIDATE_NAME: The full name of the candidate (if not found, use \"Unknown\")\n\
         2. EMAIL: Email address if present (if not found, use \"Not provided\")\n\
         3. PHONE: Phone number if present (if not found, use \"Not provided\")\n\
         4. SUMMARY: A 2-3 sentence professional summary of this candidate\n\
         5. KEY_SKILLS: A comma-separated list of technical skills, tools, and technologies mentioned\n\
         6. EXPERIENCE_YEARS: Estimated years of professional experience (number only)\n\
         7. CURRENT_ROLE: Current or most recent job title\n\
         8. EDUCATION: Highest degree and institution\n\
         9. INDUSTRIES: Industries or domains they have experience in (comma-separated)\n\n\
         Format your response exactly like this:\n\
         CANDIDATE_NAME: [name]\n\
         EMAIL: [email]\n\
         PHONE: [phone]\n\
         SUMMARY: [summary]\n\
         KEY_SKILLS: [skills]\n\
         EXPERIENCE_YEARS: [years]\n\
         CURRENT_ROLE: [role]\n\
         EDUCATION: [education]\n\
         INDUSTRIES: [industries]",
        prefix
    );

    match provider.complete(EXTRACTOR_SYSTEM_PROMPT, &prompt).await {
        Ok(response) => parse_metadata_response(&response, filename),
        Err(e) => {
            warn!("metadata extraction failed for {}: {}", filename, e);
            let mut metadata = ResumeMetadata::defaults(filename);
            metadata.summary = "Resume uploaded but metadata extraction failed.".to_string();
            metadata.error = Some(e.to_string());
            metadata
        }
    }
}

/// Strict parse of the KEY: value contract. Unknown keys are ignored,
/// malformed numbers fall back to 0, list fields are comma-split with
/// empty entries dropped.
pub fn parse_metadata_response(response: &str, filename: &str) -> ResumeMetadata {
    let mut metadata = ResumeMetadata::defaults(filename);

    for line in response.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_uppercase();
        let value = value.trim();

        match key.as_str() {
            "CANDIDATE_NAME" => {
                if !value.is_empty() {
                    metadata.candidate_name = value.to_string();
                }
            }
            "EMAIL" => {
                if !value.is_empty() {
                    metadata.email = value.to_string();
                }
            }
            "PHONE" => {
                if !value.is_empty() {
                    metadata.phone = value.to_string();
                }
            }
            "SUMMARY" => metadata.summary = value.to_string(),
            "KEY_SKILLS" => metadata.key_skills = split_list(value),
            "EXPERIENCE_YEARS" => metadata.experience_years = first_number(value),
            "CURRENT_ROLE" => {
                if !value.is_empty() {
                    metadata.current_role = value.to_string();
                }
            }
            "EDUCATION" => {
                if !value.is_empty() {
                    metadata.education = value.to_string();
                }
            }
            "INDUSTRIES" => metadata.industries = split_list(value),
            _ => {}
        }
    }

    metadata
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// First run of digits in the value, e.g. "about 7 years" -> 7.
fn first_number(value: &str) -> u32 {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    #[test]
    fn test_parse_full_response() {
        let response = "CANDIDATE_NAME: Jane Doe\n\
            EMAIL: jane@example.com\n\
            PHONE: +1 555 0100\n\
            SUMMARY: Backend engineer with cloud focus.\n\
            KEY_SKILLS: Rust, Postgres, AWS\n\
            EXPERIENCE_YEARS: 6 years\n\
            CURRENT_ROLE: Senior Engineer\n\
            EDUCATION: BSc, State University\n\
            INDUSTRIES: Fintech, Logistics";
        let metadata = parse_metadata_response(response, "jane.pdf");

        assert_eq!(metadata.candidate_name, "Jane Doe");
        assert_eq!(metadata.email, "jane@example.com");
        assert_eq!(metadata.key_skills, vec!["Rust", "Postgres", "AWS"]);
        assert_eq!(metadata.experience_years, 6);
        assert_eq!(metadata.industries, vec!["Fintech", "Logistics"]);
        assert_eq!(metadata.filename, "jane.pdf");
        assert!(metadata.error.is_none());
    }

    #[test]
    fn test_parse_ignores_unknown_keys_and_chatter() {
        let response = "Here is the breakdown:\n\
            CANDIDATE_NAME: Bob\n\
            FAVOURITE_COLOR: blue\n\
            EXPERIENCE_YEARS: about a decade";
        let metadata = parse_metadata_response(response, "bob.txt");
        assert_eq!(metadata.candidate_name, "Bob");
        // no digit run present
        assert_eq!(metadata.experience_years, 0);
        assert_eq!(metadata.email, "Not provided");
    }

    #[test]
    fn test_parse_list_drops_empty_entries() {
        let metadata = parse_metadata_response("KEY_SKILLS: Rust, , ,Python ", "x.txt");
        assert_eq!(metadata.key_skills, vec!["Rust", "Python"]);
    }

    #[test]
    fn test_defaults_are_well_formed() {
        let metadata = ResumeMetadata::defaults("empty.pdf");
        assert_eq!(metadata.candidate_name, "Unknown");
        assert_eq!(metadata.phone, "Not provided");
        assert!(metadata.key_skills.is_empty());
        assert_eq!(metadata.experience_years, 0);
    }

    #[tokio::test]
    async fn test_call_failure_yields_defaults_with_error() {
        let provider = MockProvider::failing();
        let metadata = generate_metadata(&provider, "some resume text", "cv.pdf").await;
        assert_eq!(metadata.candidate_name, "Unknown");
        assert_eq!(metadata.filename, "cv.pdf");
        assert!(metadata.error.is_some());
        assert!(metadata.summary.contains("metadata extraction failed"));
    }
}
