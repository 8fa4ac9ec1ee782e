// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization middleware for Axum.
//!
//! Runs a [`Pipeline`] in front of a router subtree. On admission the
//! verified [`AuthenticatedIdentity`](super::AuthenticatedIdentity) is
//! inserted into the request extensions and the handler receives the
//! original body unchanged.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let carts = Router::new()
//!     .route("/cart", delete(remove_cart_item))
//!     .route("/cart", patch(update_cart_item));
//!
//! let carts = middleware::apply(carts, state.clone(), PipelineKind::Cart.pipeline());
//! ```
//!
//! Handlers then read the caller with the [`Identity`](super::Identity)
//! extractor.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, HeaderMap},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::error::ApiError;
use crate::models::RequestPayload;
use crate::pipeline::Pipeline;
use crate::state::AppState;

/// Middleware state: the shared context plus the pipeline to run.
#[derive(Clone, Debug)]
pub struct PipelineState {
    pub app: AppState,
    pub pipeline: Arc<Pipeline>,
}

impl PipelineState {
    pub fn new(app: AppState, pipeline: Pipeline) -> Self {
        Self {
            app,
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Gate every route of `router` behind `pipeline`.
///
/// Uses `route_layer`, so unmatched paths still fall through to the
/// router's fallback instead of being rejected.
pub fn apply<S>(router: Router<S>, app: AppState, pipeline: Pipeline) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(from_fn_with_state(
        PipelineState::new(app, pipeline),
        authorize,
    ))
}

/// Authorization middleware function.
pub async fn authorize(
    State(gate): State<PipelineState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    // Role gate first: unauthenticated callers never get their body read.
    let identity = match gate.pipeline.authenticate(&gate.app, &parts.headers) {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    let (payload, body) = if gate.pipeline.reads_payload() {
        match read_payload(&parts.headers, body, gate.app.max_body_bytes).await {
            Ok(read) => read,
            Err(e) => return e.into_response(),
        }
    } else {
        (RequestPayload::default(), body)
    };

    match gate
        .pipeline
        .check_ownership(&gate.app, identity, &payload)
        .await
    {
        Ok(identity) => {
            let mut request = Request::from_parts(parts, body);
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Buffer the body up to `limit` bytes and return it with a replayable copy.
async fn read_payload(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<(RequestPayload, Body), ApiError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        tracing::warn!(limit, "request body exceeds limit");
        return Err(ApiError::payload_too_large("payload too large"));
    }

    let bytes = to_bytes(body, limit).await.map_err(|e| {
        tracing::warn!(error = %e, limit, "failed to read request body");
        ApiError::bad_request("invalid request body")
    })?;
    Ok((RequestPayload::from_bytes(&bytes), Body::from(bytes)))
}
