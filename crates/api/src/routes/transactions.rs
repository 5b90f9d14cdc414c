//! Income, expense and transfer routes.
//!
//! Every write goes through the ledger service, so a transaction and its
//! balance effects are committed together.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_core::auth::Identity;
use tally_core::ledger::{EntryInput, Transaction, TransactionDetail, TransactionKind};
use tally_shared::types::{AccountId, Money, TransactionId};

use crate::{AppState, ApiError, middleware::AuthUser};

/// Creates the transaction routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/incomes", get(list_incomes).post(create_income))
        .route(
            "/transactions/incomes/{id}",
            get(get_income).delete(delete_income),
        )
        .route(
            "/transactions/expenses",
            get(list_expenses).post(create_expense),
        )
        .route(
            "/transactions/expenses/{id}",
            get(get_expense).delete(delete_expense),
        )
        .route(
            "/transactions/transfers",
            get(list_transfers).post(create_transfer),
        )
        .route(
            "/transactions/transfers/{id}",
            get(get_transfer).delete(delete_transfer),
        )
}

/// Fields shared by every kind of transaction request.
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    /// Free-text description.
    pub description: String,
    /// Positive amount with at most two decimals.
    pub amount: Money,
    /// Booking date (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Whether the transaction already happened.
    #[serde(default)]
    pub completed: bool,
}

impl From<EntryRequest> for EntryInput {
    fn from(req: EntryRequest) -> Self {
        Self {
            description: req.description,
            amount: req.amount,
            date: req.date,
            completed: req.completed,
        }
    }
}

/// Request body for an income or an expense.
#[derive(Debug, Deserialize)]
pub struct SingleAccountRequest {
    /// Credited (income) or debited (expense) account.
    pub account_id: AccountId,
    /// Shared fields.
    #[serde(flatten)]
    pub entry: EntryRequest,
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Debited account.
    pub source_account_id: AccountId,
    /// Credited account.
    pub destination_account_id: AccountId,
    /// Shared fields.
    #[serde(flatten)]
    pub entry: EntryRequest,
}

/// Response for a transaction of any kind.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: TransactionId,
    /// `income`, `expense` or `transfer`.
    pub kind: TransactionKind,
    /// Free-text description.
    pub description: String,
    /// Amount, always positive.
    pub amount: Money,
    /// Booking date.
    pub date: NaiveDate,
    /// Completed flag.
    pub completed: bool,
    /// Account of an income or expense.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    /// Source of a transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_account_id: Option<AccountId>,
    /// Destination of a transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_account_id: Option<AccountId>,
    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        let (account_id, source_account_id, destination_account_id) = match tx.detail {
            TransactionDetail::Income { account } | TransactionDetail::Expense { account } => {
                (Some(account), None, None)
            }
            TransactionDetail::Transfer {
                source,
                destination,
            } => (None, Some(source), Some(destination)),
        };
        Self {
            id: tx.id,
            kind: tx.detail.kind(),
            description: tx.description,
            amount: tx.amount,
            date: tx.date,
            completed: tx.completed,
            account_id,
            source_account_id,
            destination_account_id,
            created_at: tx.created_at,
        }
    }
}

fn many(transactions: Vec<Transaction>) -> Json<Vec<TransactionResponse>> {
    Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    )
}

fn created(tx: Transaction) -> (StatusCode, Json<TransactionResponse>) {
    (StatusCode::CREATED, Json(TransactionResponse::from(tx)))
}

// ========== Any kind ==========

/// GET /transactions - List every transaction, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    Ok(many(state.ledger.retrieve_all_transactions(owner).await?))
}

/// GET /transactions/{id} - Fetch a transaction of any kind.
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let tx = state.ledger.retrieve_transaction(owner, id).await?;
    Ok(Json(TransactionResponse::from(tx)))
}

// ========== Incomes ==========

async fn list_incomes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    Ok(many(state.ledger.retrieve_all_incomes(owner).await?))
}

async fn create_income(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SingleAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let tx = state
        .ledger
        .create_income(owner, payload.account_id, payload.entry.into())
        .await?;
    Ok(created(tx))
}

async fn get_income(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let tx = state.ledger.retrieve_income(owner, id).await?;
    Ok(Json(TransactionResponse::from(tx)))
}

async fn delete_income(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    state.ledger.delete_income(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== Expenses ==========

async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    Ok(many(state.ledger.retrieve_all_expenses(owner).await?))
}

async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SingleAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let tx = state
        .ledger
        .create_expense(owner, payload.account_id, payload.entry.into())
        .await?;
    Ok(created(tx))
}

async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let tx = state.ledger.retrieve_expense(owner, id).await?;
    Ok(Json(TransactionResponse::from(tx)))
}

async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    state.ledger.delete_expense(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ========== Transfers ==========

async fn list_transfers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    Ok(many(state.ledger.retrieve_all_transfers(owner).await?))
}

async fn create_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let tx = state
        .ledger
        .create_transfer(
            owner,
            payload.source_account_id,
            payload.destination_account_id,
            payload.entry.into(),
        )
        .await?;
    Ok(created(tx))
}

async fn get_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let tx = state.ledger.retrieve_transfer(owner, id).await?;
    Ok(Json(TransactionResponse::from(tx)))
}

async fn delete_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TransactionId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    state.ledger.delete_transfer(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
