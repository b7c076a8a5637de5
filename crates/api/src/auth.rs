// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use crewplan_audit::Actor;
use crewplan_persistence::{LoginAttempt, OperatorData, Persistence, SessionData};
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::error::AuthError;

/// Operator roles for authorization.
///
/// Roles apply only to operators of the service, never to roster members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full control, including operators and sessions.
    Admin,
    /// Resource managers: edit the roster, allocations and soft bookings,
    /// run imports and undo changes.
    Manager,
    /// Read-only access to listings, reports and exports.
    Viewer,
}

impl Role {
    /// Converts this role to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Viewer => "Viewer",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Manager" => Ok(Self::Manager),
            "Viewer" => Ok(Self::Viewer),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {s}"),
            }),
        }
    }
}

/// An authenticated operator with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The operator's database identifier.
    pub operator_id: i64,
    /// The operator's login name.
    pub login_name: String,
    /// The role assigned to this operator.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(operator_id: i64, login_name: String, role: Role) -> Self {
        Self {
            operator_id,
            login_name,
            role,
        }
    }

    /// Builds the actor for an operator record, checking its role.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored role is not recognized.
    pub fn from_operator(operator: &OperatorData) -> Result<Self, AuthError> {
        let role: Role = Role::from_str(&operator.role)?;
        Ok(Self::new(
            operator.operator_id,
            operator.login_name.clone(),
            role,
        ))
    }

    /// Converts this authenticated actor into the actor recorded in the activity log.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::operator(self.operator_id, self.login_name.clone())
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require(
        actor: &AuthenticatedActor,
        allowed: &[Role],
        action: &str,
        required_role: &str,
    ) -> Result<(), AuthError> {
        if allowed.contains(&actor.role) {
            Ok(())
        } else {
            warn!(
                login_name = %actor.login_name,
                role = actor.role.as_str(),
                action,
                "Authorization denied"
            );
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: required_role.to_string(),
            })
        }
    }

    /// Checks if an actor may change members, allocations or soft bookings.
    ///
    /// Admin and Manager actors may edit; Viewers may not.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a Viewer.
    pub fn authorize_edit_roster(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::require(actor, &[Role::Admin, Role::Manager], action, "Manager")
    }

    /// Checks if an actor may preview or commit a spreadsheet import.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a Viewer.
    pub fn authorize_import(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, &[Role::Admin, Role::Manager], "import", "Manager")
    }

    /// Checks if an actor may undo an activity log entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a Viewer.
    pub fn authorize_undo(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require(actor, &[Role::Admin, Role::Manager], "undo", "Manager")
    }

    /// Checks if an actor may manage operators, sessions and login history.
    ///
    /// Only Admin actors may.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require(actor, &[Role::Admin], action, "Admin")
    }
}

/// Where a login request came from, for the login history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// Remote address.
    pub ip_address: Option<String>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
}

/// A freshly opened session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedSession {
    /// The bearer token.
    pub session_token: String,
    /// RFC 3339 expiry.
    pub expires_at: String,
    /// The authenticated actor.
    pub actor: AuthenticatedActor,
    /// The operator record.
    pub operator: OperatorData,
}

/// Authentication service for session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session lifetime.
    pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(12);

    /// Verifies credentials, records the attempt and opens a session.
    ///
    /// Every attempt, successful or not, is written to the login history.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `login_name` - The operator login name (case-insensitive)
    /// * `password` - The plaintext password
    /// * `client` - Where the request came from
    /// * `ttl` - Session lifetime
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the operator is
    /// disabled, or the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        login_name: &str,
        password: &str,
        client: &ClientInfo,
        ttl: Duration,
    ) -> Result<OpenedSession, AuthError> {
        let normalized: String = login_name.trim().to_uppercase();
        let operator: Option<OperatorData> = persistence
            .get_operator_by_login(&normalized)
            .map_err(Self::database_error)?;

        let verified: Option<OperatorData> = operator.filter(|op| {
            !op.is_disabled && bcrypt::verify(password, &op.password_hash).unwrap_or(false)
        });

        let Some(operator) = verified else {
            persistence
                .record_login(&LoginAttempt {
                    operator_id: None,
                    login_name: normalized.clone(),
                    ip_address: client.ip_address.clone(),
                    user_agent: client.user_agent.clone(),
                    success: false,
                })
                .map_err(Self::database_error)?;
            warn!(login_name = %normalized, "Login failed");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Invalid login name or password"),
            });
        };

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        let login_history_id: i64 = persistence
            .record_login(&LoginAttempt {
                operator_id: Some(operator.operator_id),
                login_name: operator.login_name.clone(),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                success: true,
            })
            .map_err(Self::database_error)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: String = format_timestamp(now_seconds() + ttl)?;

        persistence
            .create_session(
                &session_token,
                operator.operator_id,
                &expires_at,
                Some(login_history_id),
            )
            .map_err(Self::database_error)?;
        persistence
            .update_last_login(operator.operator_id)
            .map_err(Self::database_error)?;

        info!(login_name = %operator.login_name, role = actor.role.as_str(), "Login succeeded");

        Ok(OpenedSession {
            session_token,
            expires_at,
            actor,
            operator,
        })
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `operator_data`, `session_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or the operator
    /// has been disabled or removed.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, OperatorData, SessionData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::database_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            OffsetDateTime::parse(&session.expires_at, &Rfc3339).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to parse session expiration: {e}"),
                }
            })?;
        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .get_operator_by_id(session.operator_id)
            .map_err(Self::database_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;
        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_operator(&operator)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::database_error)?;

        Ok((actor, operator, session))
    }

    /// Logs out by ending the session and stamping the logout time.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be ended.
    pub fn logout(persistence: &mut Persistence, session: &SessionData) -> Result<(), AuthError> {
        persistence
            .end_session(session.session_id)
            .map_err(Self::database_error)?;
        Ok(())
    }

    /// Removes sessions whose expiry has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn purge_expired_sessions(persistence: &mut Persistence) -> Result<usize, AuthError> {
        let now: String = format_timestamp(now_seconds())?;
        persistence
            .delete_expired_sessions(&now)
            .map_err(Self::database_error)
    }

    /// 32 random bytes, URL-safe base64 without padding.
    fn generate_session_token() -> String {
        let bytes: [u8; 32] = rand::random();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn database_error(err: crewplan_persistence::PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}

// Whole seconds keep stored RFC 3339 strings the same length, so they
// compare correctly as text.
fn now_seconds() -> OffsetDateTime {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

fn format_timestamp(value: OffsetDateTime) -> Result<String, AuthError> {
    value
        .format(&Rfc3339)
        .map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to format timestamp: {e}"),
        })
}
