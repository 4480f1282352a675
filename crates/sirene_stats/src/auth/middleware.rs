//! Authentication middleware

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::introspection::TokenValidator;
use crate::error::{Error, Result};

/// Reject requests without an active bearer token.
///
/// On success the [`TokenInfo`](super::TokenInfo) is added to the request
/// extensions, where handlers pick it up with `Extension<TokenInfo>`.
pub async fn auth_middleware(
    State(validator): State<Arc<TokenValidator>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let info = match validator.validate(authorization.as_deref()).await {
        Ok(info) => info,
        Err(e @ Error::IntrospectionUnavailable(_)) => {
            warn!("Token introspection failed: {}", e);
            return Err(e);
        }
        Err(e) => {
            debug!(path = %request.uri().path(), "Rejected request: {}", e);
            return Err(e);
        }
    };

    debug!(client_id = info.client_id().unwrap_or("-"), "Token accepted");
    request.extensions_mut().insert(info);

    Ok(next.run(request).await)
}
