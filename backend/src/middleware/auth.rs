//! Authentication middleware
//!
//! Protected routes require a static bearer token configured for the
//! deployment. Request payloads carry user attribution (`user_name`) where
//! the transaction ledger needs it.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{ErrorDetail, ErrorResponse};

/// Authentication middleware that validates the static API token.
/// The token is read from the environment so the middleware does not need
/// access to application state.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let expected = std::env::var("WIMS__AUTH__API_TOKEN")
        .or_else(|_| std::env::var("WIMS_AUTH_API_TOKEN"))
        .unwrap_or_else(|_| "development-token".to_string());

    if token != expected {
        return unauthorized_response("Invalid API token");
    }

    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}
