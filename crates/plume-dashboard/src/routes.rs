//! HTTP routes
//!
//! Each handler performs one borrower action and answers with either data or
//! the notification the user should see.

use alloy_primitives::{Address, U256};
use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use plume_common::error::LoanError;
use plume_common::{
    BalanceSnapshot, ChainConfig, LoanDuration, LoanPreview, Notification, RwaHolding,
};
use plume_lending::{
    find_active_loan, load_loan_book_with, submit_loan_request, submit_repayment, LoanBook,
    LoanRequestForm, WalletAccount,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{DASHBOARD_VERSION, SERVICE_NAME};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the dashboard router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/v1/version", get(version))
        .route("/api/v1/chain", get(chain))
        .route("/api/v1/ltv", get(ltv))
        // Wallet views
        .route("/api/v1/wallets/:address/holdings", get(holdings))
        .route("/api/v1/wallets/:address/balance", get(balance))
        .route("/api/v1/wallets/:address/loans", get(loans))
        // Loan flows
        .route("/api/v1/loans/preview", post(preview))
        .route("/api/v1/loans", post(request_loan))
        .route("/api/v1/loans/:loan_id/repay", post(repay_loan))
        // Balance API passthrough
        .route("/api/plume-api/wallet-balance", get(wallet_balance_proxy))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ MODELS ============

/// A holding with its picker label
#[derive(Debug, Serialize)]
pub struct HoldingEntry {
    #[serde(flatten)]
    pub holding: RwaHolding,
    pub label: String,
    pub selectable: bool,
}

impl From<RwaHolding> for HoldingEntry {
    fn from(holding: RwaHolding) -> Self {
        Self {
            label: holding.label(),
            selectable: holding.is_selectable(),
            holding,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub wallet: Address,
    pub token: Address,
    pub quantity: String,
    #[serde(default)]
    pub duration: LoanDuration,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub preview: LoanPreview,
    pub duration_label: String,
}

#[derive(Debug, Deserialize)]
pub struct LoanRequestBody {
    /// Connected wallet, absent when none is connected
    pub wallet: Option<Address>,
    pub token: Option<Address>,
    pub quantity: String,
    #[serde(default)]
    pub loan_amount: Option<String>,
    #[serde(default)]
    pub duration: LoanDuration,
    #[serde(default)]
    pub agreed: bool,
}

#[derive(Debug, Deserialize)]
pub struct RepayBody {
    pub wallet: Option<Address>,
}

#[derive(Debug, Deserialize)]
pub struct WalletBalanceQuery {
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,
}

// ============ HANDLERS ============

async fn health_check() -> Json<Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn version() -> Json<Value> {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "version": DASHBOARD_VERSION,
        "description": "Borrow pUSD against RWA tokens on Plume",
    }))
}

async fn chain(State(state): State<AppState>) -> Json<ChainConfig> {
    Json(state.chain.as_ref().clone())
}

async fn ltv(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({ "ltv": state.contract.ltv_display().await }))
}

async fn holdings(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Vec<HoldingEntry>> {
    let wallet = parse_address(&address)?;
    let holdings = state.refresh_holdings(wallet).await;
    Ok(Json(holdings.into_iter().map(HoldingEntry::from).collect()))
}

async fn balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<BalanceSnapshot> {
    let wallet = parse_address(&address)?;

    state.balance.set_loading(true);
    let expected = state.balance.snapshot().version;

    match state.contract.repayment_token_balance(wallet).await {
        Ok(amount) => {
            // A flow that adjusted the balance meanwhile wins over this read
            if let Err(e) = state.balance.set_if_version(wallet, amount, expected) {
                debug!(%wallet, error = %e, "Skipping stale balance read");
                state.balance.set_loading(false);
            }
            Ok(Json(state.balance.snapshot()))
        }
        Err(e) => {
            warn!(%wallet, error = %e, "Failed to fetch balance");
            state.balance.set_loading(false);
            Err(ApiError::upstream("Error", &e))
        }
    }
}

async fn loans(State(state): State<AppState>, Path(address): Path<String>) -> ApiResult<LoanBook> {
    let wallet = parse_address(&address)?;
    let holdings = state.holdings_for(wallet).await;
    Ok(Json(load_loan_book_with(&state.contract, &holdings, wallet).await))
}

async fn preview(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<PreviewResponse> {
    let holding = state.holding(req.wallet, req.token).await;
    let form = LoanRequestForm {
        holding: Some(holding.ok_or(LoanError::AssetNotSelected)?),
        quantity: req.quantity,
        loan_amount: None,
        duration: req.duration,
        agreed: false,
    };

    let preview = form.preview().ok_or(LoanError::QuantityNotPositive)?;
    Ok(Json(PreviewResponse {
        preview,
        duration_label: req.duration.label(),
    }))
}

async fn request_loan(
    State(state): State<AppState>,
    Json(req): Json<LoanRequestBody>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let account = WalletAccount::connected(req.wallet)?;
    let holding = match req.token {
        Some(token) => state.holding(account.address, token).await,
        None => None,
    };

    let form = LoanRequestForm {
        holding,
        quantity: req.quantity,
        loan_amount: req.loan_amount,
        duration: req.duration,
        agreed: req.agreed,
    };
    let request = form.into_request()?;

    info!(
        wallet = %account.address,
        token = %request.collateral_token,
        "Loan request submitted"
    );
    let notification =
        submit_loan_request(&state.contract, &state.balance, &account, &request).await;
    Ok(settle_flow(&state, account.address, notification))
}

async fn repay_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<String>,
    Json(req): Json<RepayBody>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let account = WalletAccount::connected(req.wallet)?;
    let loan_id = U256::from_str(loan_id.trim())
        .map_err(|_| ApiError::bad_request(format!("Invalid loan id: {}", loan_id)))?;

    let loans = state
        .contract
        .loans_by_user(account.address)
        .await
        .map_err(|e| ApiError::upstream("Repayment failed", &e))?;
    let loan = find_active_loan(&loans, loan_id)?;

    info!(wallet = %account.address, %loan_id, "Repayment submitted");
    let repay_amount = loan.repay_amount;
    let notification =
        submit_repayment(&state.contract, &state.balance, &account, loan_id, repay_amount).await;
    Ok(settle_flow(&state, account.address, notification))
}

async fn wallet_balance_proxy(
    State(state): State<AppState>,
    Query(query): Query<WalletBalanceQuery>,
) -> ApiResult<Value> {
    state
        .api
        .wallet_balance_raw(&query.wallet_address)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream("Error", &e))
}

// ============ HELPERS ============

fn parse_address(value: &str) -> Result<Address, ApiError> {
    Address::from_str(value.trim())
        .map_err(|_| ApiError::bad_request(format!("Invalid address: {}", value)))
}

/// Map a flow notification to a response; a mined flow moves tokens, so cached
/// holdings are dropped
fn settle_flow(
    state: &AppState,
    wallet: Address,
    notification: Notification,
) -> (StatusCode, Json<Notification>) {
    if notification.is_error() {
        return (StatusCode::BAD_GATEWAY, Json(notification));
    }
    state.invalidate_holdings(wallet);
    (StatusCode::OK, Json(notification))
}
