//! Claims handlers

use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use core_kernel::TransactionId;
use domain_claims::{OverrideDecision, RegisterClaim};

use crate::dto::claims::*;
use crate::error::ApiError;
use crate::AppState;

fn parse_transaction_id(raw: &str) -> Result<TransactionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid transaction id: {raw}")))
}

/// Registers a claim with its documents
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterClaimRequest>,
) -> Result<Json<RegisterClaimResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    if request.amount.is_sign_negative() {
        return Err(ApiError::Validation(
            "amount must be non-negative".to_string(),
        ));
    }

    let input = RegisterClaim {
        claim_id: request.claim_id,
        customer_name: request.customer_name,
        policy_number: request.policy_number,
        description: request.description,
        amount: request.amount,
        claim_type: request.claim_type,
        documents: request.documents.into_iter().map(Into::into).collect(),
    };

    let registered = state.service.register(input).await?;
    Ok(Json(registered.into()))
}

/// Customer status check
pub async fn status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let view = state.service.get_status(transaction_id).await?;
    Ok(Json(view.into()))
}

/// Runs the decision pipeline to a terminal state
pub async fn process(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let final_state = state.service.run_pipeline(transaction_id).await?;
    Ok(Json(final_state.into()))
}

/// Manager decision override; bypasses the pipeline entirely
pub async fn decision(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let decision: OverrideDecision = request.decision.parse().map_err(ApiError::from)?;

    let status = state
        .service
        .override_decision(transaction_id, decision, request.comment)
        .await?;

    let message = format!(
        "Claim has been {} successfully.",
        status.as_str().replace('_', " ").to_lowercase()
    );
    Ok(Json(DecisionResponse {
        transaction_id,
        status,
        message,
    }))
}
