use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    repositories::invoices::InvoiceRepository,
    value_objects::{
        ai::{DashboardInsightsDto, ParsedInvoiceDto, ReminderDto},
        dashboard::DashboardStats,
        enums::locales::Locale,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    ai_gateway::{AiExtractionGateway, AiGatewayError, LanguageModel},
    prompts::ReminderContext,
};

pub const NO_INVOICES_INSIGHT: &str = "No invoices available to summarize.";

#[derive(Debug, Error)]
pub enum AiAssistantError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invoice not found")]
    InvoiceNotFound,
    #[error("{message}")]
    Gateway {
        message: &'static str,
        #[source]
        source: AiGatewayError,
    },
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AiAssistantError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AiAssistantError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AiAssistantError::InvoiceNotFound => StatusCode::NOT_FOUND,
            AiAssistantError::Gateway { .. } | AiAssistantError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn gateway(message: &'static str, source: AiGatewayError) -> Self {
        match source {
            AiGatewayError::BadRequest(reason) => AiAssistantError::BadRequest(reason),
            source => AiAssistantError::Gateway { message, source },
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AiAssistantError>;

/// AI endpoints composed from the invoice store and the extraction gateway.
pub struct AiAssistantUseCase<R, M>
where
    R: InvoiceRepository + Send + Sync + 'static,
    M: LanguageModel + 'static,
{
    invoice_repository: Arc<R>,
    gateway: AiExtractionGateway<M>,
}

impl<R, M> AiAssistantUseCase<R, M>
where
    R: InvoiceRepository + Send + Sync + 'static,
    M: LanguageModel + 'static,
{
    pub fn new(invoice_repository: Arc<R>, gateway: AiExtractionGateway<M>) -> Self {
        Self {
            invoice_repository,
            gateway,
        }
    }

    pub async fn parse_invoice_text(
        &self,
        owner_id: Uuid,
        text: Option<String>,
        locale: Option<Locale>,
    ) -> UseCaseResult<ParsedInvoiceDto> {
        let text = text.unwrap_or_default();
        info!(%owner_id, text_len = text.len(), "ai: parse invoice text requested");

        self.gateway
            .extract_invoice(&text, locale)
            .await
            .map_err(|err| {
                warn!(%owner_id, error = %err, "ai: invoice extraction failed");
                AiAssistantError::gateway("Failed to parse invoice data from text", err)
            })
    }

    pub async fn generate_reminder(
        &self,
        owner_id: Uuid,
        invoice_id: Option<String>,
        locale: Option<Locale>,
    ) -> UseCaseResult<ReminderDto> {
        let raw_id = invoice_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AiAssistantError::BadRequest("Invoice ID is required".to_string()))?;

        // An id that cannot exist is reported the same as one that does not.
        let invoice_id = Uuid::parse_str(raw_id).map_err(|_| AiAssistantError::InvoiceNotFound)?;

        let invoice = self
            .invoice_repository
            .find_by_id_and_owner(invoice_id, owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, %invoice_id, db_error = ?err, "ai: failed to load invoice for reminder");
                AiAssistantError::Storage {
                    message: "Error generating reminder email with AI",
                    source: err,
                }
            })?
            .ok_or(AiAssistantError::InvoiceNotFound)?;

        let context = ReminderContext {
            client_name: invoice.bill_to.client_name,
            invoice_number: invoice.invoice_number,
            amount_due: invoice.total,
            due_date: invoice.due_date,
        };

        let reminder_text = self
            .gateway
            .draft_reminder(&context, locale)
            .await
            .map_err(|err| {
                warn!(%owner_id, %invoice_id, error = %err, "ai: reminder drafting failed");
                AiAssistantError::gateway("Error generating reminder email with AI", err)
            })?;

        info!(%owner_id, %invoice_id, "ai: reminder drafted");
        Ok(ReminderDto { reminder_text })
    }

    pub async fn dashboard_summary(
        &self,
        owner_id: Uuid,
        locale: Option<Locale>,
    ) -> UseCaseResult<DashboardInsightsDto> {
        let invoices = self
            .invoice_repository
            .list_by_owner(owner_id, None)
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "ai: failed to load invoices for summary");
                AiAssistantError::Storage {
                    message: "Error generating dashboard summary",
                    source: err,
                }
            })?;

        if invoices.is_empty() {
            info!(%owner_id, "ai: no invoices, skipping dashboard summary");
            return Ok(DashboardInsightsDto {
                insights: vec![NO_INVOICES_INSIGHT.to_string()],
            });
        }

        let stats = DashboardStats::from_invoices(&invoices);
        let insights = self
            .gateway
            .summarize_dashboard(&stats, locale)
            .await
            .map_err(|err| {
                warn!(%owner_id, error = %err, "ai: dashboard summary failed");
                AiAssistantError::gateway("Error generating dashboard summary", err)
            })?;

        info!(%owner_id, insights = insights.len(), "ai: dashboard summarized");
        Ok(DashboardInsightsDto { insights })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::ai_gateway::MockLanguageModel;
    use chrono::{NaiveDate, Utc};
    use crates::domain::{
        entities::invoices::InvoiceEntity,
        repositories::invoices::MockInvoiceRepository,
        value_objects::{
            enums::invoice_statuses::InvoiceStatus,
            invoices::{BillFrom, BillTo, LineItem},
        },
    };
    use mockall::predicate::{eq, function};

    fn invoice(owner_id: Uuid, status: InvoiceStatus, total: f64) -> InvoiceEntity {
        let now = Utc::now();
        InvoiceEntity {
            id: Uuid::new_v4(),
            owner_id,
            invoice_number: "INV-042".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 14),
            bill_from: BillFrom::default(),
            bill_to: BillTo {
                client_name: "Acme Corp".to_string(),
                ..BillTo::default()
            },
            items: vec![LineItem {
                name: "Work".to_string(),
                quantity: 1.0,
                unit_price: total,
                tax_percent: 0.0,
                total,
            }],
            notes: None,
            payment_terms: "Net 15".to_string(),
            status,
            sub_total: total,
            tax_total: 0.0,
            total,
            created_at: now,
            updated_at: now,
        }
    }

    fn usecase(
        repo: MockInvoiceRepository,
        model: MockLanguageModel,
    ) -> AiAssistantUseCase<MockInvoiceRepository, MockLanguageModel> {
        AiAssistantUseCase::new(
            Arc::new(repo),
            AiExtractionGateway::new(Arc::new(model), Locale::En),
        )
    }

    #[tokio::test]
    async fn empty_text_never_reaches_the_model() {
        let mut model = MockLanguageModel::new();
        model.expect_complete().never();

        let err = usecase(MockInvoiceRepository::new(), model)
            .parse_invoice_text(Uuid::new_v4(), Some("  ".to_string()), None)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Text is required");
    }

    #[tokio::test]
    async fn missing_text_is_bad_request() {
        let mut model = MockLanguageModel::new();
        model.expect_complete().never();

        let err = usecase(MockInvoiceRepository::new(), model)
            .parse_invoice_text(Uuid::new_v4(), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AiAssistantError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unparseable_model_output_is_internal() {
        let mut model = MockLanguageModel::new();
        model
            .expect_complete()
            .times(1)
            .returning(|_| Box::pin(async { Ok("not json at all".to_string()) }));

        let err = usecase(MockInvoiceRepository::new(), model)
            .parse_invoice_text(Uuid::new_v4(), Some("bill acme".to_string()), None)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(
            err,
            AiAssistantError::Gateway {
                source: AiGatewayError::MalformedResponse(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reminder_requires_an_invoice_id() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id_and_owner().never();
        let mut model = MockLanguageModel::new();
        model.expect_complete().never();

        let usecase = usecase(repo, model);
        let missing = usecase
            .generate_reminder(Uuid::new_v4(), None, None)
            .await
            .unwrap_err();
        let blank = usecase
            .generate_reminder(Uuid::new_v4(), Some(" ".to_string()), None)
            .await
            .unwrap_err();

        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_invoice_id_is_not_found() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id_and_owner().never();
        let mut model = MockLanguageModel::new();
        model.expect_complete().never();

        let err = usecase(repo, model)
            .generate_reminder(Uuid::new_v4(), Some("not-a-uuid".to_string()), None)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reminder_for_foreign_invoice_is_not_found() {
        let caller = Uuid::new_v4();
        let invoice_id = Uuid::new_v4();

        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id_and_owner()
            .with(eq(invoice_id), eq(caller))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(None) }));
        let mut model = MockLanguageModel::new();
        model.expect_complete().never();

        let err = usecase(repo, model)
            .generate_reminder(caller, Some(invoice_id.to_string()), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AiAssistantError::InvoiceNotFound));
    }

    #[tokio::test]
    async fn reminder_interpolates_invoice_fields() {
        let owner_id = Uuid::new_v4();
        let stored = invoice(owner_id, InvoiceStatus::Unpaid, 330.0);
        let invoice_id = stored.id;

        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id_and_owner()
            .with(eq(invoice_id), eq(owner_id))
            .returning(move |_, _| {
                let invoice = stored.clone();
                Box::pin(async move { Ok(Some(invoice)) })
            });
        let mut model = MockLanguageModel::new();
        model
            .expect_complete()
            .with(function(|prompt: &String| {
                prompt.contains("Acme Corp")
                    && prompt.contains("INV-042")
                    && prompt.contains("330.00")
                    && prompt.contains("14 Feb 2025")
            }))
            .times(1)
            .returning(|_| Box::pin(async { Ok("Subject: Invoice INV-042".to_string()) }));

        let reminder = usecase(repo, model)
            .generate_reminder(owner_id, Some(invoice_id.to_string()), None)
            .await
            .unwrap();

        assert_eq!(reminder.reminder_text, "Subject: Invoice INV-042");
    }

    #[tokio::test]
    async fn zero_invoices_short_circuits_summary() {
        let owner_id = Uuid::new_v4();
        let mut repo = MockInvoiceRepository::new();
        repo.expect_list_by_owner()
            .with(eq(owner_id), eq(None))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(Vec::new()) }));
        let mut model = MockLanguageModel::new();
        model.expect_complete().never();

        let summary = usecase(repo, model)
            .dashboard_summary(owner_id, None)
            .await
            .unwrap();

        assert_eq!(summary.insights, vec![NO_INVOICES_INSIGHT.to_string()]);
    }

    #[tokio::test]
    async fn summary_sends_aggregates_to_the_model() {
        let owner_id = Uuid::new_v4();
        let invoices = vec![
            invoice(owner_id, InvoiceStatus::Paid, 100.0),
            invoice(owner_id, InvoiceStatus::Unpaid, 50.0),
        ];

        let mut repo = MockInvoiceRepository::new();
        repo.expect_list_by_owner().returning(move |_, _| {
            let invoices = invoices.clone();
            Box::pin(async move { Ok(invoices) })
        });
        let mut model = MockLanguageModel::new();
        model
            .expect_complete()
            .with(function(|prompt: &String| {
                prompt.contains("- Total Number of Invoices: 2")
            }))
            .times(1)
            .returning(|_| {
                Box::pin(async { Ok("```json\n{\"insights\":[\"Send a reminder.\",\"Nice revenue.\"]}\n```".to_string()) })
            });

        let summary = usecase(repo, model)
            .dashboard_summary(owner_id, None)
            .await
            .unwrap();

        assert_eq!(summary.insights.len(), 2);
    }

    #[tokio::test]
    async fn summary_storage_failure_is_internal() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_list_by_owner()
            .returning(|_, _| Box::pin(async { Err(anyhow::anyhow!("db down")) }));
        let mut model = MockLanguageModel::new();
        model.expect_complete().never();

        let err = usecase(repo, model)
            .dashboard_summary(Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
