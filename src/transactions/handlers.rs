use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    transactions::{
        dto::{CreateTransactionRequest, Transaction, UpdateTransactionRequest},
        repo_types::TransactionDocument,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> ApiResult<Json<Vec<Transaction>>> {
    let txs = state.transactions.list().await?;
    Ok(Json(txs.into_iter().map(Transaction::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_transaction(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let tx = state
        .transactions
        .find_by_id(&id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(tx.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let tx = TransactionDocument {
        id: Uuid::new_v4().to_string(),
        kind: payload.kind,
        date: payload.date.unwrap_or_else(OffsetDateTime::now_utc),
        amount: payload.amount,
    };
    state.transactions.insert(&tx).await?;
    info!(transaction_id = %tx.id, user_id = %caller.id, "transaction created");

    let location = format!("/transactions/{}", tx.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Transaction::from(tx)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    let tx = state
        .transactions
        .update(&id, payload.into())
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(transaction_id = %tx.id, user_id = %caller.id, "transaction updated");
    Ok(Json(tx.into()))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .transactions
        .delete(&id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(transaction_id = %id, user_id = %caller.id, "transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}
