use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::domain::entities::{HistoryEntry, TransferRequest, TransferResult, WalletBalance};
use crate::domain::types::AccountId;
use crate::use_cases::get_balances::GetBalancesUseCase;
use crate::use_cases::get_history::GetHistoryUseCase;
use crate::use_cases::process_transfer::ProcessTransferUseCase;

// Estado compartido de la aplicación: los casos de uso ya construidos.
pub struct AppState {
    pub process_transfer_use_case: ProcessTransferUseCase,
    pub get_balances_use_case: GetBalancesUseCase,
    pub get_history_use_case: GetHistoryUseCase,
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/wallets/top-up", post(top_up))
        .route("/wallets/bonus", post(issue_bonus))
        .route("/wallets/purchase", post(purchase))
        .route("/wallets/{user_id}/balances", get(get_balances))
        .route("/wallets/{user_id}/transactions", get(get_transaction_history))
        .with_state(state)
}

// DTO de entrada para las tres operaciones mutadoras.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequestBody {
    pub user_id: Uuid,
    pub asset_code: String,
    pub amount: i64,
    pub idempotency_key: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl TransferRequestBody {
    fn into_request(self) -> TransferRequest {
        TransferRequest {
            account_id: AccountId(self.user_id),
            asset_code: self.asset_code,
            amount: self.amount,
            idempotency_key: self.idempotency_key,
            description: self.description,
            metadata: self.metadata.unwrap_or_else(|| serde_json::json!({})),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub asset_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub asset_code: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// Un replay idempotente responde 200 con el payload original; una
// transferencia recién comprometida responde 201.
fn transfer_response(
    result: TransferResult,
) -> (StatusCode, Json<ApiResponse<TransferResult>>) {
    let status = if result.idempotent {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(ApiResponse::success(result)))
}

// Handler: Acreditar saldo comprado por el usuario
// POST /wallets/top-up
#[utoipa::path(
    post,
    path = "/wallets/top-up",
    request_body = TransferRequestBody,
    responses(
        (status = 201, description = "Transfer committed"),
        (status = 200, description = "Idempotent replay of a previous commit"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Wallet or asset not found")
    )
)]
pub async fn top_up(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TransferRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<TransferResult>>), ApiError> {
    let result = state
        .process_transfer_use_case
        .top_up(payload.into_request())
        .await?;

    Ok(transfer_response(result))
}

// Handler: Acreditar un bono promocional
// POST /wallets/bonus
#[utoipa::path(
    post,
    path = "/wallets/bonus",
    request_body = TransferRequestBody,
    responses(
        (status = 201, description = "Transfer committed"),
        (status = 200, description = "Idempotent replay of a previous commit"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Wallet or asset not found")
    )
)]
pub async fn issue_bonus(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TransferRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<TransferResult>>), ApiError> {
    let result = state
        .process_transfer_use_case
        .issue_bonus(payload.into_request())
        .await?;

    Ok(transfer_response(result))
}

// Handler: Debitar una compra contra el saldo del usuario
// POST /wallets/purchase
#[utoipa::path(
    post,
    path = "/wallets/purchase",
    request_body = TransferRequestBody,
    responses(
        (status = 201, description = "Transfer committed"),
        (status = 200, description = "Idempotent replay of a previous commit"),
        (status = 422, description = "Insufficient balance"),
        (status = 404, description = "Wallet or asset not found")
    )
)]
pub async fn purchase(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TransferRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<TransferResult>>), ApiError> {
    let result = state
        .process_transfer_use_case
        .purchase(payload.into_request())
        .await?;

    Ok(transfer_response(result))
}

// Handler: Balances de las billeteras del usuario
// GET /wallets/{user_id}/balances
#[utoipa::path(
    get,
    path = "/wallets/{user_id}/balances",
    params(
        ("user_id" = Uuid, Path, description = "Account id of the user"),
        ("asset_code" = Option<String>, Query, description = "Restrict to one asset code")
    ),
    responses(
        (status = 200, description = "Balances for the account"),
        (status = 404, description = "The account has no wallets")
    )
)]
pub async fn get_balances(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<ApiResponse<Vec<WalletBalance>>>, ApiError> {
    let balances = state
        .get_balances_use_case
        .execute(AccountId(user_id), query.asset_code)
        .await?;

    Ok(Json(ApiResponse::success(balances)))
}

// Handler: Historial de movimientos del usuario (paginado, mas reciente primero)
// GET /wallets/{user_id}/transactions
#[utoipa::path(
    get,
    path = "/wallets/{user_id}/transactions",
    params(
        ("user_id" = Uuid, Path, description = "Account id of the user"),
        ("asset_code" = Option<String>, Query, description = "Restrict to one asset code"),
        ("limit" = Option<i64>, Query, description = "Page size, clamped to the configured bounds"),
        ("offset" = Option<i64>, Query, description = "Rows to skip, floored at zero")
    ),
    responses(
        (status = 200, description = "Ledger-joined transaction history")
    )
)]
pub async fn get_transaction_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryEntry>>>, ApiError> {
    let history = state
        .get_history_use_case
        .execute(
            AccountId(user_id),
            query.asset_code,
            query.limit,
            query.offset,
        )
        .await?;

    Ok(Json(ApiResponse::success(history)))
}
