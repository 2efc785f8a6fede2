// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::{ApiJson, ApiPath};
use crate::{
    auth::{DeleteInvitation, PatchInvitation, PostInvitation, RequireScope},
    error::{ApiError, ErrorBody},
    models::{
        CreateInvitationRequest, InvitationDeletedResponse, InvitationListResponse,
        InvitationResponse, UpdateInvitationRequest,
    },
    state::AppState,
    storage::InvitationRepository,
};

#[utoipa::path(
    get,
    path = "/invitations",
    tag = "Invitations",
    responses(
        (status = 200, body = InvitationListResponse),
        (status = 500, body = ErrorBody)
    )
)]
pub async fn list_invitations(
    State(state): State<AppState>,
) -> Result<Json<InvitationListResponse>, ApiError> {
    let repo = InvitationRepository::new(&state.store);
    let invitations = repo.list()?.iter().map(|i| i.format()).collect::<Vec<_>>();
    Ok(Json(invitations.into()))
}

#[utoipa::path(
    get,
    path = "/invitations/{invitation_id}",
    params(("invitation_id" = u64, Path, description = "Invitation id")),
    tag = "Invitations",
    responses(
        (status = 200, body = InvitationResponse),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_invitation(
    ApiPath(invitation_id): ApiPath<u64>,
    State(state): State<AppState>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let repo = InvitationRepository::new(&state.store);
    let invitation = repo.get(invitation_id)?;
    Ok(Json(invitation.format().into()))
}

#[utoipa::path(
    post,
    path = "/invitations",
    request_body = CreateInvitationRequest,
    tag = "Invitations",
    security(("bearer_auth" = ["post:invitation"])),
    responses(
        (status = 200, body = InvitationResponse),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn create_invitation(
    RequireScope(user, _): RequireScope<PostInvitation>,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateInvitationRequest>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let repo = InvitationRepository::new(&state.store);
    let invitation = repo.create(request)?;

    tracing::info!(
        invitation_id = invitation.id,
        user_id = %user.user_id,
        "Invitation created"
    );
    Ok(Json(invitation.format().into()))
}

#[utoipa::path(
    patch,
    path = "/invitations/{invitation_id}",
    params(("invitation_id" = u64, Path, description = "Invitation id")),
    request_body = UpdateInvitationRequest,
    tag = "Invitations",
    security(("bearer_auth" = ["patch:invitation"])),
    responses(
        (status = 200, body = InvitationResponse),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_invitation(
    ApiPath(invitation_id): ApiPath<u64>,
    RequireScope(user, _): RequireScope<PatchInvitation>,
    State(state): State<AppState>,
    ApiJson(changes): ApiJson<UpdateInvitationRequest>,
) -> Result<Json<InvitationResponse>, ApiError> {
    let repo = InvitationRepository::new(&state.store);
    let invitation = repo.update(invitation_id, changes)?;

    tracing::info!(invitation_id, user_id = %user.user_id, "Invitation updated");
    Ok(Json(invitation.format().into()))
}

/// Delete an invitation. Its RSVPs are deleted with it.
#[utoipa::path(
    delete,
    path = "/invitations/{invitation_id}",
    params(("invitation_id" = u64, Path, description = "Invitation id")),
    tag = "Invitations",
    security(("bearer_auth" = ["delete:invitation"])),
    responses(
        (status = 200, body = InvitationDeletedResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_invitation(
    ApiPath(invitation_id): ApiPath<u64>,
    RequireScope(user, _): RequireScope<DeleteInvitation>,
    State(state): State<AppState>,
) -> Result<Json<InvitationDeletedResponse>, ApiError> {
    let repo = InvitationRepository::new(&state.store);
    let removed_rsvps = repo.delete(invitation_id)?;

    tracing::info!(
        invitation_id,
        removed_rsvps,
        user_id = %user.user_id,
        "Invitation deleted"
    );
    Ok(Json(InvitationDeletedResponse {
        success: true,
        invitation_id,
    }))
}
