use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use giftly_core::{Proposal, ProposalStatus};
use giftly_order::{ProposalDetails, ProposalDraft};
use giftly_shared::models::events::{ProposalCreatedEvent, ProposalStatusChangedEvent};
use giftly_shared::models::StoreEvent;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CustomerId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromCartRequest {
    #[serde(flatten)]
    pub details: ProposalDetails,
    /// Empty the cart once the proposal is saved
    #[serde(default)]
    pub clear_cart: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ProposalStatus,
}

/// Routes here expect `customer_middleware` to have run
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/proposals", get(list_proposals).post(create_proposal))
        .route("/v1/proposals/from-cart", post(create_from_cart))
        .route("/v1/proposals/{id}", get(get_proposal).delete(delete_proposal))
        .route("/v1/proposals/{id}/status", post(update_status))
}

async fn list_proposals(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
) -> Result<Json<Vec<Proposal>>, AppError> {
    Ok(Json(state.proposals.list(customer.as_str()).await?))
}

async fn create_proposal(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Json(draft): Json<ProposalDraft>,
) -> Result<(StatusCode, Json<Proposal>), AppError> {
    let proposal = state.proposals.create(customer.as_str(), draft).await?;
    publish_created(&state, &proposal);
    Ok((StatusCode::CREATED, Json(proposal)))
}

async fn create_from_cart(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Json(req): Json<FromCartRequest>,
) -> Result<(StatusCode, Json<Proposal>), AppError> {
    let proposal = state
        .proposals
        .create_from_cart(customer.as_str(), req.details, req.clear_cart)
        .await?;
    publish_created(&state, &proposal);
    Ok((StatusCode::CREATED, Json(proposal)))
}

async fn get_proposal(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Path(id): Path<Uuid>,
) -> Result<Json<Proposal>, AppError> {
    Ok(Json(state.proposals.get(customer.as_str(), id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Proposal>, AppError> {
    let proposal = state
        .proposals
        .update_status(customer.as_str(), id, req.status)
        .await?;

    state.publish(StoreEvent::ProposalStatusChanged(ProposalStatusChangedEvent {
        proposal_id: proposal.id,
        status: proposal.status.as_str().to_string(),
        timestamp: Utc::now().timestamp(),
    }));
    Ok(Json(proposal))
}

async fn delete_proposal(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.proposals.delete(customer.as_str(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn publish_created(state: &AppState, proposal: &Proposal) {
    state.publish(StoreEvent::ProposalCreated(ProposalCreatedEvent {
        proposal_id: proposal.id,
        customer_id: proposal.customer_id.clone(),
        total_amount: proposal.total_amount,
        timestamp: Utc::now().timestamp(),
    }));
}
