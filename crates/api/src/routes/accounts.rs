//! Account management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::auth::Identity;
use tally_core::ledger::Account;
use tally_db::AccountRepository;
use tally_shared::types::{AccountId, Money};
use tracing::info;

use crate::{AppState, ApiError, middleware::AuthUser};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{account_id}",
            get(get_account).patch(update_account).delete(delete_account),
        )
}

/// Request body for opening an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name.
    pub name: String,
    /// Opening balance, zero when omitted.
    #[serde(default)]
    pub balance: Option<Money>,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New display name.
    pub name: Option<String>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Current balance.
    pub balance: Money,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            balance: account.balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

fn repository(state: &AppState) -> AccountRepository {
    AccountRepository::new((*state.db).clone())
}

/// GET /accounts - List the caller's accounts.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let accounts = repository(&state).list(owner).await?;

    Ok(Json(
        accounts
            .into_iter()
            .map(AccountResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /accounts - Open an account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let account = repository(&state)
        .create(owner, &payload.name, payload.balance.unwrap_or(Money::ZERO))
        .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// GET /accounts/{account_id} - Fetch one account.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let account = repository(&state).get(account_id, owner).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// PATCH /accounts/{account_id} - Rename an account.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let repo = repository(&state);

    let account = match payload.name {
        Some(name) => repo.rename(account_id, owner, &name).await?,
        None => repo.get(account_id, owner).await?,
    };
    Ok(Json(AccountResponse::from(account)))
}

/// DELETE /accounts/{account_id} - Delete an account and its transactions.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<AccountId>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = auth.current_owner()?;
    let removed = repository(&state).delete(account_id, owner).await?;

    info!(owner_id = %owner, account_id = %account_id, removed, "Account removed via API");
    Ok(StatusCode::NO_CONTENT)
}
