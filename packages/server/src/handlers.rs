//! HTTP handler functions for the globe API.

use actix_web::{HttpResponse, web};
use globe_server_models::{ApiError, ApiHealth, ApiToken, TOKEN_NOT_CONFIGURED};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/get-token`
///
/// Hands the map rendering credential to the browser so it never has to be
/// embedded in client code. Responds `500` when the server has none.
pub async fn get_token(state: web::Data<AppState>) -> HttpResponse {
    match state.token.as_deref() {
        Some(token) => HttpResponse::Ok().json(ApiToken {
            token: token.to_string(),
        }),
        None => {
            log::warn!("Token requested but MAPBOX_TOKEN is not set");
            HttpResponse::InternalServerError().json(ApiError::new(TOKEN_NOT_CONFIGURED))
        }
    }
}
