use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::{
    domain::value_objects::{
        ai::{InsightsCompletion, ParsedInvoiceDto},
        dashboard::DashboardStats,
        enums::locales::Locale,
    },
    infra::ai::gemini_client::GeminiClient,
};
use mockall::automock;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::prompts::{
    ReminderContext, dashboard_insights_prompt, invoice_extraction_prompt, reminder_prompt,
};

/// Text-completion service behind the AI features.
#[async_trait]
#[automock]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: String) -> AnyResult<String>;
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, prompt: String) -> AnyResult<String> {
        self.generate_content(&prompt).await
    }
}

#[derive(Debug, Error)]
pub enum AiGatewayError {
    #[error("{0}")]
    BadRequest(String),
    #[error("AI service request failed: {0}")]
    Upstream(#[source] anyhow::Error),
    #[error("AI response was not in the expected format: {0}")]
    MalformedResponse(String),
}

pub type GatewayResult<T> = std::result::Result<T, AiGatewayError>;

/// Removes Markdown code-fence markers and surrounding whitespace.
/// Already-clean JSON passes through unchanged.
pub fn clean_completion(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Cleans a completion and parses it into the expected response shape.
pub fn parse_completion<T: DeserializeOwned>(raw: &str) -> GatewayResult<T> {
    let cleaned = clean_completion(raw);
    serde_json::from_str(&cleaned).map_err(|err| AiGatewayError::MalformedResponse(err.to_string()))
}

/// Prompt construction and response cleanup around an injected
/// [`LanguageModel`]. One outbound call per operation, never retried.
pub struct AiExtractionGateway<M>
where
    M: LanguageModel + 'static,
{
    model: Arc<M>,
    default_locale: Locale,
}

impl<M> AiExtractionGateway<M>
where
    M: LanguageModel + 'static,
{
    pub fn new(model: Arc<M>, default_locale: Locale) -> Self {
        Self {
            model,
            default_locale,
        }
    }

    async fn call(&self, template: &'static str, prompt: String) -> GatewayResult<String> {
        debug!(template, prompt_len = prompt.len(), "ai_gateway: calling model");

        self.model.complete(prompt).await.map_err(|err| {
            error!(template, error = ?err, "ai_gateway: model call failed");
            AiGatewayError::Upstream(err)
        })
    }

    pub async fn extract_invoice(
        &self,
        text: &str,
        locale: Option<Locale>,
    ) -> GatewayResult<ParsedInvoiceDto> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AiGatewayError::BadRequest("Text is required".to_string()));
        }

        let locale = locale.unwrap_or(self.default_locale);
        let completion = self
            .call("invoice_extraction", invoice_extraction_prompt(locale, text))
            .await?;

        let parsed: ParsedInvoiceDto = parse_completion(&completion).map_err(|err| {
            warn!(error = %err, "ai_gateway: extraction response rejected");
            err
        })?;

        info!(
            items = parsed.items.len(),
            "ai_gateway: invoice extracted from text"
        );
        Ok(parsed)
    }

    pub async fn draft_reminder(
        &self,
        context: &ReminderContext,
        locale: Option<Locale>,
    ) -> GatewayResult<String> {
        let locale = locale.unwrap_or(self.default_locale);
        let completion = self
            .call("reminder_email", reminder_prompt(locale, context))
            .await?;

        let reminder = completion.trim().to_string();
        if reminder.is_empty() {
            warn!("ai_gateway: reminder completion was empty");
            return Err(AiGatewayError::MalformedResponse(
                "empty reminder text".to_string(),
            ));
        }

        Ok(reminder)
    }

    pub async fn summarize_dashboard(
        &self,
        stats: &DashboardStats,
        locale: Option<Locale>,
    ) -> GatewayResult<Vec<String>> {
        let locale = locale.unwrap_or(self.default_locale);
        let completion = self
            .call(
                "dashboard_insights",
                dashboard_insights_prompt(locale, &stats.digest()),
            )
            .await?;

        let parsed: InsightsCompletion = parse_completion(&completion).map_err(|err| {
            warn!(error = %err, "ai_gateway: insights response rejected");
            err
        })?;

        Ok(parsed.insights)
    }
}
