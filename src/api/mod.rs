// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::header::HeaderName,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    auth::{middleware, AuthenticatedIdentity, FailureKind, Role},
    error::ApiError,
    models::{AdmittedResponse, ErrorResponse},
    pipeline::{AuthorizationDecision, PipelineKind},
    state::AppState,
};

pub mod authorize;
pub mod health;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let v1_routes = PipelineKind::ALL
        .into_iter()
        .fold(Router::<AppState>::new(), |routes, kind| {
            let gated = Router::<AppState>::new().route(
                &format!("/authorize/{}", kind.as_str()),
                post(authorize::admitted),
            );
            routes.merge(middleware::apply(gated, state.clone(), kind.pipeline()))
        });

    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/api-doc/openapi.json", get(openapi_json))
        .nest("/v1", v1_routes.method_not_allowed_fallback(method_not_allowed))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(layers)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found() -> impl IntoResponse {
    ApiError::not_found("not found")
}

async fn method_not_allowed() -> impl IntoResponse {
    ApiError::method_not_allowed("method not allowed")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        authorize::admitted
    ),
    components(
        schemas(
            AdmittedResponse,
            ErrorResponse,
            AuthenticatedIdentity,
            AuthorizationDecision,
            FailureKind,
            PipelineKind,
            Role,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Authorization", description = "Role and ownership checks for forwarded requests")
    )
)]
struct ApiDoc;
