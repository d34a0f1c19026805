//! CurrentUser extractor
//!
//! Handlers take `user: CurrentUser` directly. The middleware has usually
//! validated the token already; otherwise the header is checked here.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = parts.uri.to_string());
                return Err(AppError::unauthorized());
            }
        };

        let user = state
            .jwt_service
            .validate_access_token(token)
            .and_then(CurrentUser::try_from)
            .map_err(|e| {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = e.to_string(),
                    uri = parts.uri.to_string()
                );
                AppError::from(e)
            })?;

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
