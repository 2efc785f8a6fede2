// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RSVP handlers.
//!
//! An RSVP records the subject of the token that created it. Reading,
//! updating or deleting it later requires a token with the same subject,
//! in addition to the route scope.

use axum::{extract::State, Json};

use super::extract::{ApiJson, ApiPath};
use crate::{
    auth::{
        AuthError, AuthenticatedUser, DeleteInvitationRsvp, GetInvitationRsvpDetails,
        GetInvitationRsvps, PatchInvitationRsvp, PostInvitationRsvp, RequireScope,
    },
    error::{ApiError, ErrorBody},
    models::{
        CreateRsvpRequest, RsvpDeletedResponse, RsvpListResponse, RsvpResponse, UpdateRsvpRequest,
    },
    state::AppState,
    storage::{InvitationRepository, NewRsvp, RsvpRepository, StoreError, StoredRsvp},
};

/// Fetch an RSVP under `invitation_id` and check it belongs to `user`.
fn owned_rsvp(
    repo: &RsvpRepository<'_>,
    invitation_id: u64,
    rsvp_id: u64,
    user: &AuthenticatedUser,
) -> Result<StoredRsvp, ApiError> {
    let rsvp = repo.get(invitation_id, rsvp_id)?;
    if !rsvp.is_owned_by(&user.user_id) {
        tracing::warn!(
            invitation_id,
            rsvp_id,
            user_id = %user.user_id,
            "RSVP access by a different subject"
        );
        return Err(AuthError::NotOwner.into());
    }
    Ok(rsvp)
}

/// List the RSVPs of an invitation. An unknown invitation yields an empty list.
#[utoipa::path(
    get,
    path = "/invitations/{invitation_id}/rsvps",
    params(("invitation_id" = u64, Path, description = "Invitation id")),
    tag = "RSVPs",
    security(("bearer_auth" = ["get:invitation-rsvps"])),
    responses(
        (status = 200, body = RsvpListResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn list_rsvps(
    ApiPath(invitation_id): ApiPath<u64>,
    RequireScope(_user, _): RequireScope<GetInvitationRsvps>,
    State(state): State<AppState>,
) -> Result<Json<RsvpListResponse>, ApiError> {
    let repo = RsvpRepository::new(&state.store);
    let rsvps = repo
        .list_for_invitation(invitation_id)?
        .iter()
        .map(|r| r.format())
        .collect::<Vec<_>>();
    Ok(Json(rsvps.into()))
}

#[utoipa::path(
    get,
    path = "/invitations/{invitation_id}/rsvps/{rsvp_id}",
    params(
        ("invitation_id" = u64, Path, description = "Invitation id"),
        ("rsvp_id" = u64, Path, description = "RSVP id")
    ),
    tag = "RSVPs",
    security(("bearer_auth" = ["get:invitation-rsvp-details"])),
    responses(
        (status = 200, body = RsvpResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_rsvp(
    ApiPath((invitation_id, rsvp_id)): ApiPath<(u64, u64)>,
    RequireScope(user, _): RequireScope<GetInvitationRsvpDetails>,
    State(state): State<AppState>,
) -> Result<Json<RsvpResponse>, ApiError> {
    let repo = RsvpRepository::new(&state.store);
    let rsvp = owned_rsvp(&repo, invitation_id, rsvp_id, &user)?;
    Ok(Json(rsvp.format().into()))
}

/// Answer an invitation.
///
/// All four fields are required. A missing or `null` field is reported as
/// 404, not 400, for compatibility with existing clients.
#[utoipa::path(
    post,
    path = "/invitations/{invitation_id}/rsvps",
    params(("invitation_id" = u64, Path, description = "Invitation id")),
    request_body = CreateRsvpRequest,
    tag = "RSVPs",
    security(("bearer_auth" = ["post:invitation-rsvp"])),
    responses(
        (status = 200, body = RsvpResponse),
        (status = 400, description = "Malformed body or guest email already used", body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, description = "Invitation missing or RSVP fields missing", body = ErrorBody)
    )
)]
pub async fn create_rsvp(
    ApiPath(invitation_id): ApiPath<u64>,
    RequireScope(user, _): RequireScope<PostInvitationRsvp>,
    State(state): State<AppState>,
    body: Result<ApiJson<CreateRsvpRequest>, ApiError>,
) -> Result<Json<RsvpResponse>, ApiError> {
    // The parent is checked before the body so a missing invitation is 404
    if !InvitationRepository::new(&state.store).exists(invitation_id)? {
        return Err(StoreError::NotFound(format!("Invitation {invitation_id}")).into());
    }
    let ApiJson(request) = body?;

    let rsvp = NewRsvp::try_from(request).map_err(|_| {
        ApiError::not_found("guest_name, guest_email, response and plus_one are required")
    })?;

    let repo = RsvpRepository::new(&state.store);
    let stored = repo.create(invitation_id, &user.user_id, rsvp)?;

    tracing::info!(
        invitation_id,
        rsvp_id = stored.id,
        user_id = %user.user_id,
        "RSVP created"
    );
    Ok(Json(stored.format().into()))
}

#[utoipa::path(
    patch,
    path = "/invitations/{invitation_id}/rsvps/{rsvp_id}",
    params(
        ("invitation_id" = u64, Path, description = "Invitation id"),
        ("rsvp_id" = u64, Path, description = "RSVP id")
    ),
    request_body = UpdateRsvpRequest,
    tag = "RSVPs",
    security(("bearer_auth" = ["patch:invitation-rsvp"])),
    responses(
        (status = 200, body = RsvpResponse),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_rsvp(
    ApiPath((invitation_id, rsvp_id)): ApiPath<(u64, u64)>,
    RequireScope(user, _): RequireScope<PatchInvitationRsvp>,
    State(state): State<AppState>,
    ApiJson(changes): ApiJson<UpdateRsvpRequest>,
) -> Result<Json<RsvpResponse>, ApiError> {
    let repo = RsvpRepository::new(&state.store);
    owned_rsvp(&repo, invitation_id, rsvp_id, &user)?;
    let rsvp = repo.update(invitation_id, rsvp_id, changes)?;

    tracing::info!(invitation_id, rsvp_id, user_id = %user.user_id, "RSVP updated");
    Ok(Json(rsvp.format().into()))
}

#[utoipa::path(
    delete,
    path = "/invitations/{invitation_id}/rsvps/{rsvp_id}",
    params(
        ("invitation_id" = u64, Path, description = "Invitation id"),
        ("rsvp_id" = u64, Path, description = "RSVP id")
    ),
    tag = "RSVPs",
    security(("bearer_auth" = ["delete:invitation-rsvp"])),
    responses(
        (status = 200, body = RsvpDeletedResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_rsvp(
    ApiPath((invitation_id, rsvp_id)): ApiPath<(u64, u64)>,
    RequireScope(user, _): RequireScope<DeleteInvitationRsvp>,
    State(state): State<AppState>,
) -> Result<Json<RsvpDeletedResponse>, ApiError> {
    let repo = RsvpRepository::new(&state.store);
    owned_rsvp(&repo, invitation_id, rsvp_id, &user)?;
    repo.delete(invitation_id, rsvp_id)?;

    tracing::info!(invitation_id, rsvp_id, user_id = %user.user_id, "RSVP deleted");
    Ok(Json(RsvpDeletedResponse {
        success: true,
        rsvp_id,
    }))
}
