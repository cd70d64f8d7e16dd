use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 80;

/// Minimal Gemini `generateContent` client built on reqwest.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    code: Option<u16>,
    message: Option<String>,
    status: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() { None } else { Some(text) }
    }
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Gemini HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (gemini_code, gemini_status, gemini_message) =
            match serde_json::from_str::<GeminiErrorEnvelope>(&body) {
                Ok(envelope) => (
                    envelope.error.code,
                    envelope.error.status,
                    envelope.error.message,
                ),
                Err(_) => (None, None, None),
            };

        error!(
            status = %status,
            gemini_code = ?gemini_code,
            gemini_status = ?gemini_status,
            gemini_message = ?gemini_message,
            response_body = %body,
            "gemini api request failed"
        );

        anyhow::bail!(
            "Gemini API request failed with status {}: {}",
            status,
            gemini_message.unwrap_or(body)
        );
    }

    /// Sends one prompt and returns the model's text completion.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        // See https://ai.google.dev/api/generate-content
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "gemini: sending generateContent request"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Gemini API request could not be sent")?;

        let resp = Self::ensure_success(resp).await?;

        let body: GenerateContentResponse = resp
            .json()
            .await
            .context("Gemini API returned an unreadable response")?;

        let block_reason = body
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone());
        let finish_reason = body
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.clone());

        body.into_text().with_context(|| {
            format!(
                "Gemini API returned no text (block_reason={:?}, finish_reason={:?})",
                block_reason, finish_reason
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [{ "text": "{\"a\":" }, { "text": " 1}" }] }, "finishReason": "STOP" },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }"#;

        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let raw = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;

        let response: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()),
            Some("SAFETY")
        );
        assert!(response.into_text().is_none());
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = GeminiClient::new(
            "key".to_string(),
            DEFAULT_GEMINI_MODEL.to_string(),
            format!("{DEFAULT_GEMINI_BASE_URL}/"),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
        .unwrap();

        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
