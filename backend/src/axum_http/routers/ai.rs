use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::invoices::InvoiceRepository,
        value_objects::{
            ai::{GenerateReminderModel, LocaleQuery, ParseInvoiceTextModel},
            enums::locales::Locale,
        },
    },
    infra::{
        ai::gemini_client::GeminiClient,
        db::{
            postgres::postgres_connection::PgPoolSquad, repositories::invoices::InvoicePostgres,
        },
    },
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{
        ai_assistant::AiAssistantUseCase,
        ai_gateway::{AiExtractionGateway, LanguageModel},
    },
};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    gemini_client: Arc<GeminiClient>,
    default_locale: Locale,
) -> Router {
    let invoice_repository = InvoicePostgres::new(Arc::clone(&db_pool));
    let gateway = AiExtractionGateway::new(gemini_client, default_locale);
    let usecase = AiAssistantUseCase::new(Arc::new(invoice_repository), gateway);

    router(Arc::new(usecase))
}

pub fn router<R, M>(usecase: Arc<AiAssistantUseCase<R, M>>) -> Router
where
    R: InvoiceRepository + Send + Sync + 'static,
    M: LanguageModel + 'static,
{
    Router::new()
        .route("/parse-invoice-text", post(parse_invoice_text::<R, M>))
        .route("/generate-reminder", post(generate_reminder::<R, M>))
        .route("/dashboard-summary", get(dashboard_summary::<R, M>))
        .with_state(usecase)
}

pub async fn parse_invoice_text<R, M>(
    State(usecase): State<Arc<AiAssistantUseCase<R, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<ParseInvoiceTextModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
    M: LanguageModel + 'static,
{
    let Json(model) = payload?;
    let parsed = usecase
        .parse_invoice_text(user_id, model.text, model.locale)
        .await?;

    Ok(Json(parsed))
}

pub async fn generate_reminder<R, M>(
    State(usecase): State<Arc<AiAssistantUseCase<R, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<GenerateReminderModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
    M: LanguageModel + 'static,
{
    let Json(model) = payload?;
    let reminder = usecase
        .generate_reminder(user_id, model.invoice_id, model.locale)
        .await?;

    Ok(Json(reminder))
}

pub async fn dashboard_summary<R, M>(
    State(usecase): State<Arc<AiAssistantUseCase<R, M>>>,
    AuthUser { user_id, .. }: AuthUser,
    query: Result<Query<LocaleQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
    M: LanguageModel + 'static,
{
    let Query(query) = query?;
    info!(%user_id, "ai: dashboard summary request received");
    let summary = usecase.dashboard_summary(user_id, query.locale).await?;

    Ok(Json(summary))
}
