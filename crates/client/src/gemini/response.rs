//! Gemini `generateContent` response body.

use serde::Deserialize;

use super::GeminiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
}

/// Finish reasons that mean the model stopped on its own.
const NORMAL_FINISH: &[&str] = &["STOP", "MAX_TOKENS"];

impl GenerateContentResponse {
    /// The first candidate's text.
    ///
    /// A prompt block, or a candidate without text that stopped for a
    /// non-normal reason (e.g. `SAFETY`), is reported as [`GeminiError::Blocked`].
    pub fn into_text(self) -> Result<String, GeminiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::Blocked(format!("prompt blocked: {reason}")));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(GeminiError::EmptyResponse);
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if !text.trim().is_empty() {
            return Ok(text);
        }

        match candidate.finish_reason {
            Some(reason) if !NORMAL_FINISH.contains(&reason.as_str()) => {
                Err(GeminiError::Blocked(format!("finish reason {reason}")))
            }
            _ => Err(GeminiError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_joined_from_parts() {
        let resp = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Bún bò "},{"text":"Huế."}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(resp.into_text().unwrap(), "Bún bò Huế.");
    }

    #[test]
    fn test_prompt_blocked() {
        let resp = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert!(matches!(resp.into_text(), Err(GeminiError::Blocked(r)) if r.contains("SAFETY")));
    }

    #[test]
    fn test_candidate_safety_stop() {
        let resp = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(resp.into_text(), Err(GeminiError::Blocked(r)) if r.contains("SAFETY")));
    }

    #[test]
    fn test_empty_candidates() {
        assert!(matches!(parse("{}").into_text(), Err(GeminiError::EmptyResponse)));

        let resp = parse(r#"{"candidates":[{"content":{"parts":[]},"finishReason":"MAX_TOKENS"}]}"#);
        assert!(matches!(resp.into_text(), Err(GeminiError::EmptyResponse)));
    }

    #[test]
    fn test_error_envelope() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#)
                .unwrap();
        assert_eq!(body.error.message, "API key not valid");
    }
}
