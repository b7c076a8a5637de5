// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.
//!
//! Every route except login and `/health` takes a [`SessionOperator`], so
//! an unauthenticated request never reaches a handler.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use crewplan_api::{AuthenticatedActor, AuthenticationService, ClientInfo};
use crewplan_persistence::{OperatorData, SessionData};
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// The caller behind a valid `Authorization: Bearer <token>` header.
///
/// Validation rejects unknown or expired tokens and operators that have
/// been disabled or removed since logging in.
pub struct SessionOperator(pub AuthenticatedActor, pub OperatorData, pub SessionData);

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;

        let mut persistence = state.persistence.lock().await;
        let (actor, operator, session) =
            AuthenticationService::validate_session(&mut persistence, token.trim()).map_err(
                |e| {
                    warn!(error = %e, "Session validation failed");
                    SessionError::InvalidSession(e.to_string())
                },
            )?;
        drop(persistence);

        debug!(
            login_name = %operator.login_name,
            role = ?actor.role,
            "Session validated"
        );

        Ok(Self(actor, operator, session))
    }
}

/// Why a request could not be tied to a session.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        HttpError {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
        .into_response()
    }
}

/// Client details recorded with each login attempt.
///
/// The address comes from `X-Forwarded-For` since the service normally
/// sits behind a reverse proxy.
pub fn client_info(headers: &axum::http::HeaderMap) -> ClientInfo {
    let header_text = |name: &str| -> Option<String> {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
    };

    ClientInfo {
        ip_address: header_text("x-forwarded-for")
            .and_then(|list| list.split(',').next().map(|ip| ip.trim().to_string())),
        user_agent: header_text(header::USER_AGENT.as_str()),
    }
}
