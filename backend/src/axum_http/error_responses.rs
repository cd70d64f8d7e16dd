use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::usecases::{ai_assistant::AiAssistantError, invoices::InvoiceError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(message: impl Into<String>, source: anyhow::Error) -> Self {
        AppError::Internal {
            message: message.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected malformed JSON body");
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection.body_text(), "rejected malformed query string");
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::Validation(message) => AppError::BadRequest(message),
            InvoiceError::NotFound => AppError::NotFound(err.to_string()),
            InvoiceError::DuplicateNumber(_) => AppError::Conflict(err.to_string()),
            InvoiceError::Internal(source) => AppError::internal(source.to_string(), source),
        }
    }
}

impl From<AiAssistantError> for AppError {
    fn from(err: AiAssistantError) -> Self {
        match err {
            AiAssistantError::BadRequest(message) => AppError::BadRequest(message),
            AiAssistantError::InvoiceNotFound => AppError::NotFound(err.to_string()),
            AiAssistantError::Gateway { message, source } => {
                AppError::internal(message, anyhow::Error::new(source))
            }
            AiAssistantError::Storage { message, source } => AppError::internal(message, source),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Internal { message, source } => ErrorResponse {
                code: status.as_u16(),
                message,
                error: Some(source.root_cause().to_string()),
            },
            other => ErrorResponse {
                code: status.as_u16(),
                message: other.to_string(),
                error: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
