use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use crates::{
    domain::{
        repositories::invoices::InvoiceRepository,
        value_objects::invoices::{
            DeleteInvoiceDto, InsertInvoiceModel, ListInvoicesFilter, NextInvoiceNumberDto,
            UpdateInvoiceModel, UpdateInvoiceStatusModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::invoices::InvoicePostgres,
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, usecases::invoices::InvoiceUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let invoice_repository = InvoicePostgres::new(Arc::clone(&db_pool));
    let usecase = InvoiceUseCase::new(Arc::new(invoice_repository));

    router(Arc::new(usecase))
}

pub fn router<R>(usecase: Arc<InvoiceUseCase<R>>) -> Router
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_invoices::<R>).post(create_invoice::<R>))
        .route("/next-number", get(next_invoice_number::<R>))
        .route(
            "/:id",
            get(get_invoice::<R>)
                .put(update_invoice::<R>)
                .delete(delete_invoice::<R>),
        )
        .route("/:id/status", patch(update_invoice_status::<R>))
        .with_state(usecase)
}

/// Ids that do not parse cannot belong to the caller.
fn parse_invoice_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Invoice not found".to_string()))
}

pub async fn create_invoice<R>(
    State(usecase): State<Arc<InvoiceUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<InsertInvoiceModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    let Json(model) = payload?;
    let invoice = usecase.create(user_id, model).await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn list_invoices<R>(
    State(usecase): State<Arc<InvoiceUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    query: Result<Query<ListInvoicesFilter>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    let Query(filter) = query?;
    info!(%user_id, status = ?filter.status, "invoices: list request received");

    let invoices = usecase.list(user_id, filter).await?;

    Ok(Json(invoices))
}

pub async fn next_invoice_number<R>(
    State(usecase): State<Arc<InvoiceUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    let invoice_number = usecase.next_invoice_number(user_id).await?;

    Ok(Json(NextInvoiceNumberDto { invoice_number }))
}

pub async fn get_invoice<R>(
    State(usecase): State<Arc<InvoiceUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    let invoice_id = parse_invoice_id(&id)?;
    let invoice = usecase.get(user_id, invoice_id).await?;

    Ok(Json(invoice))
}

pub async fn update_invoice<R>(
    State(usecase): State<Arc<InvoiceUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateInvoiceModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    let invoice_id = parse_invoice_id(&id)?;
    let Json(model) = payload?;
    let invoice = usecase.update(user_id, invoice_id, model).await?;

    Ok(Json(invoice))
}

pub async fn update_invoice_status<R>(
    State(usecase): State<Arc<InvoiceUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateInvoiceStatusModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    let invoice_id = parse_invoice_id(&id)?;
    let Json(UpdateInvoiceStatusModel { status }) = payload?;
    let invoice = usecase.update_status(user_id, invoice_id, status).await?;

    Ok(Json(invoice))
}

pub async fn delete_invoice<R>(
    State(usecase): State<Arc<InvoiceUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    let invoice_id = parse_invoice_id(&id)?;
    usecase.delete(user_id, invoice_id).await?;

    Ok(Json(DeleteInvoiceDto {
        message: "Invoice deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtVerifier, issue_test_token};
    use axum::{
        Extension,
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use crates::domain::{
        entities::invoices::InvoiceEntity, repositories::invoices::MockInvoiceRepository,
        value_objects::enums::invoice_statuses::InvoiceStatus,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    fn app(repo: MockInvoiceRepository) -> Router {
        router(Arc::new(InvoiceUseCase::new(Arc::new(repo))))
            .layer(Extension(Arc::new(JwtVerifier::new(SECRET))))
    }

    fn request(method: &str, uri: &str, user_id: Option<Uuid>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", issue_test_token(SECRET, &user_id.to_string())),
            );
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn entity_from(insert: crates::domain::entities::invoices::InsertInvoiceEntity) -> InvoiceEntity {
        InvoiceEntity {
            id: Uuid::new_v4(),
            owner_id: insert.owner_id,
            invoice_number: insert.invoice_number,
            invoice_date: insert.invoice_date,
            due_date: insert.due_date,
            bill_from: serde_json::from_value(insert.bill_from).unwrap(),
            bill_to: serde_json::from_value(insert.bill_to).unwrap(),
            items: serde_json::from_value(insert.items).unwrap(),
            notes: insert.notes,
            payment_terms: insert.payment_terms,
            status: InvoiceStatus::try_from(insert.status.as_str()).unwrap(),
            sub_total: insert.sub_total,
            tax_total: insert.tax_total,
            total: insert.total,
            created_at: insert.created_at,
            updated_at: insert.updated_at,
        }
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_list_by_owner().never();

        let response = app(repo)
            .oneshot(request("GET", "/", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_returns_created_invoice_with_server_totals() {
        let user_id = Uuid::new_v4();
        let mut repo = MockInvoiceRepository::new();
        repo.expect_invoice_number_taken()
            .returning(|_, _, _| Box::pin(async { Ok(false) }));
        repo.expect_create().times(1).returning(|insert| {
            let entity = entity_from(insert);
            Box::pin(async move { Ok(entity) })
        });

        let body = json!({
            "invoiceNumber": "INV-001",
            "invoiceDate": "2025-01-10",
            "dueDate": "2025-01-25",
            "billTo": { "clientName": "Acme Corp" },
            "items": [{ "name": "Design", "quantity": 2, "unitPrice": 150, "taxPercent": 10 }],
            "total": 1
        });

        let response = app(repo)
            .oneshot(request("POST", "/", Some(user_id), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let invoice = json_body(response).await;
        assert_eq!(invoice["owner"], json!(user_id.to_string()));
        assert_eq!(invoice["subTotal"], json!(300.0));
        assert_eq!(invoice["taxTotal"], json!(30.0));
        assert_eq!(invoice["total"], json!(330.0));
        assert_eq!(invoice["status"], json!("Unpaid"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_create().never();

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", issue_test_token(SECRET, &Uuid::new_v4().to_string())),
                    )
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{ not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn foreign_invoice_is_not_found() {
        let caller = Uuid::new_v4();
        let invoice_id = Uuid::new_v4();
        let mut repo = MockInvoiceRepository::new();
        repo.expect_find_by_id_and_owner()
            .withf(move |id, owner| *id == invoice_id && *owner == caller)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let response = app(repo)
            .oneshot(request("GET", &format!("/{invoice_id}"), Some(caller), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["message"], json!("Invoice not found"));
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_delete_by_id_and_owner().never();

        let response = app(repo)
            .oneshot(request("DELETE", "/not-a-uuid", Some(Uuid::new_v4()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_confirms_with_message() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_delete_by_id_and_owner()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let response = app(repo)
            .oneshot(request(
                "DELETE",
                &format!("/{}", Uuid::new_v4()),
                Some(Uuid::new_v4()),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Invoice deleted successfully" })
        );
    }

    #[tokio::test]
    async fn unknown_status_filter_is_bad_request() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_list_by_owner().never();

        let response = app(repo)
            .oneshot(request("GET", "/?status=Refunded", Some(Uuid::new_v4()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn next_number_route_is_not_treated_as_an_id() {
        let mut repo = MockInvoiceRepository::new();
        repo.expect_list_invoice_numbers()
            .times(1)
            .returning(|_| Box::pin(async { Ok(vec!["INV-004".to_string()]) }));

        let response = app(repo)
            .oneshot(request("GET", "/next-number", Some(Uuid::new_v4()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "invoiceNumber": "INV-005" })
        );
    }
}
