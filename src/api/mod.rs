// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{http::StatusCode, routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::{ApiError, ErrorBody},
    models::{
        CreateInvitationRequest, CreateRsvpRequest, IndexResponse, Invitation,
        InvitationDeletedResponse, InvitationListResponse, InvitationResponse, Rsvp,
        RsvpDeletedResponse, RsvpListResponse, RsvpResponse, UpdateInvitationRequest,
        UpdateRsvpRequest,
    },
    state::AppState,
};

pub mod extract;
pub mod health;
pub mod invitations;
pub mod rsvps;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/", get(index))
        .route(
            "/invitations",
            get(invitations::list_invitations).post(invitations::create_invitation),
        )
        .route(
            "/invitations/{invitation_id}",
            get(invitations::get_invitation)
                .patch(invitations::update_invitation)
                .delete(invitations::delete_invitation),
        )
        .route(
            "/invitations/{invitation_id}/rsvps",
            get(rsvps::list_rsvps).post(rsvps::create_rsvp),
        )
        .route(
            "/invitations/{invitation_id}/rsvps/{rsvp_id}",
            get(rsvps::get_rsvp)
                .patch(rsvps::update_rsvp)
                .delete(rsvps::delete_rsvp),
        )
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http()),
        )
        .layer(CorsLayer::permissive())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, body = IndexResponse))
)]
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        success: true,
        hello: "World".to_string(),
    })
}

async fn not_found() -> ApiError {
    ApiError::not_found("resource not found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

/// Registers the bearer scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        index,
        health::health,
        health::liveness,
        health::readiness,
        invitations::list_invitations,
        invitations::get_invitation,
        invitations::create_invitation,
        invitations::update_invitation,
        invitations::delete_invitation,
        rsvps::list_rsvps,
        rsvps::get_rsvp,
        rsvps::create_rsvp,
        rsvps::update_rsvp,
        rsvps::delete_rsvp
    ),
    components(
        schemas(
            Invitation,
            Rsvp,
            CreateInvitationRequest,
            UpdateInvitationRequest,
            CreateRsvpRequest,
            UpdateRsvpRequest,
            IndexResponse,
            InvitationListResponse,
            InvitationResponse,
            InvitationDeletedResponse,
            RsvpListResponse,
            RsvpResponse,
            RsvpDeletedResponse,
            ErrorBody
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Invitations", description = "Invitation management"),
        (name = "RSVPs", description = "Guest responses to an invitation"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
