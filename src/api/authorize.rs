// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::auth::Identity;
use crate::models::{AdmittedResponse, ErrorResponse};

/// Run a named authorization pipeline against the forwarded request.
///
/// The routing layer forwards the caller's `authorization` header and JSON
/// body unchanged. The pipeline itself runs in the route middleware; this
/// handler is only reached on admission.
#[utoipa::path(
    post,
    path = "/v1/authorize/{policy}",
    tag = "Authorization",
    params(
        ("policy" = String, Path,
         description = "One of `user`, `merchant`, `cart`, `listing`, `merchant-order`, `user-order`")
    ),
    request_body(content = serde_json::Value, description = "Forwarded request body; `id`, `user` and `merchant` are read"),
    responses(
        (status = 200, description = "Request admitted", body = AdmittedResponse),
        (status = 400, description = "No authorization header", body = ErrorResponse),
        (status = 401, description = "Invalid token or wrong role", body = ErrorResponse),
        (status = 403, description = "Empty token or caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Unknown policy or resource not found", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 503, description = "Owner lookup failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn admitted(Identity(identity): Identity) -> Json<AdmittedResponse> {
    Json(AdmittedResponse::from(identity))
}
