// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use crewplan_api::{
    ActivityRequest, AllocationImportCommitResponse, AllocationImportPreviewResponse,
    AllocationImportRequest, AllocationResponse, ApiError, CapacityResponse,
    ChangePasswordRequest, CreateAllocationRequest, CreateMemberRequest, CreateOperatorRequest,
    CreateOperatorResponse, CreateSoftBookingRequest, DeleteResponse, ExportAllocationsRequest,
    ListActivityResponse, ListAllocationsRequest, ListAllocationsResponse, ListMembersRequest,
    ListMembersResponse, ListOperatorsResponse, ListSessionsResponse, ListSoftBookingsRequest,
    ListSoftBookingsResponse, LoginHistoryRequest, LoginHistoryResponse, LoginRequest,
    LoginResponse, MemberImportCommitResponse, MemberImportPreviewResponse, MemberResponse,
    MessageResponse, OperatorStatusResponse, PasswordPolicy, ReportRequest, Role,
    SoftBookingResponse, SpreadsheetUpload, UndoResponse, UpdateAllocationRequest,
    UpdateMemberRequest, UtilizationResponse, WhoAmIResponse,
};
use crewplan_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::session::{SessionOperator, client_info};

/// How often expired sessions are swept out of the database.
const SESSION_PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(15 * 60);

/// `CrewPlan` Server - HTTP server for VFX resource allocation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Lifetime of a login session, in hours
    #[arg(long, default_value_t = 12)]
    session_ttl_hours: i64,

    /// Login name of the Admin operator to create when no operators exist
    #[arg(long, requires = "bootstrap_password")]
    bootstrap_admin: Option<String>,

    /// Password for the bootstrap Admin operator
    #[arg(long, requires = "bootstrap_admin")]
    bootstrap_password: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// Single persistence handle; every request takes the lock in turn.
    persistence: Arc<Mutex<Persistence>>,
    /// Lifetime given to new sessions.
    session_ttl: Duration,
}

impl AppState {
    fn new(persistence: Persistence, session_ttl: Duration) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            session_ttl,
        }
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. }
            | ApiError::InvalidSpreadsheet { .. }
            | ApiError::PasswordPolicyViolation { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::AlreadyApplied { .. } | ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// A CSV download with a suggested file name.
fn csv_response(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

// ============================================================================
// Health and authentication
// ============================================================================

#[allow(clippy::unused_async)]
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handler for POST `/auth/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = crewplan_api::login(
        &mut persistence,
        &req,
        &client_info(&headers),
        app_state.session_ttl,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, session): SessionOperator,
) -> Result<Json<MessageResponse>, HttpError> {
    info!(login_name = %actor.login_name, "Handling logout request");

    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = crewplan_api::logout(&mut persistence, &session)?;
    Ok(Json(response))
}

/// Handler for GET `/auth/me`.
#[allow(clippy::unused_async)]
async fn handle_whoami(
    SessionOperator(actor, operator, _): SessionOperator,
) -> Json<WhoAmIResponse> {
    Json(crewplan_api::whoami(&actor, &operator))
}

/// Handler for POST `/auth/password`.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, operator, _): SessionOperator,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    info!(login_name = %actor.login_name, "Handling change_password request");

    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse =
        crewplan_api::change_password(&mut persistence, &operator, &req)?;
    Ok(Json(response))
}

// ============================================================================
// Administration
// ============================================================================

async fn handle_list_operators(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
) -> Result<Json<ListOperatorsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::list_operators(&mut persistence, &actor)?))
}

async fn handle_create_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<CreateOperatorRequest>,
) -> Result<Json<CreateOperatorResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        login_name = %req.login_name,
        role = %req.role,
        "Handling create_operator request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::create_operator(
        &mut persistence,
        &actor,
        &req,
    )?))
}

async fn handle_disable_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(operator_id): Path<i64>,
) -> Result<Json<OperatorStatusResponse>, HttpError> {
    info!(actor = %actor.login_name, operator_id, "Handling disable_operator request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::disable_operator(
        &mut persistence,
        &actor,
        operator_id,
    )?))
}

async fn handle_enable_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(operator_id): Path<i64>,
) -> Result<Json<OperatorStatusResponse>, HttpError> {
    info!(actor = %actor.login_name, operator_id, "Handling enable_operator request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::enable_operator(
        &mut persistence,
        &actor,
        operator_id,
    )?))
}

async fn handle_delete_operator(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(operator_id): Path<i64>,
) -> Result<Json<OperatorStatusResponse>, HttpError> {
    info!(actor = %actor.login_name, operator_id, "Handling delete_operator request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::delete_operator(
        &mut persistence,
        &actor,
        operator_id,
    )?))
}

async fn handle_list_sessions(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
) -> Result<Json<ListSessionsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::list_sessions(&mut persistence, &actor)?))
}

async fn handle_end_session(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(session_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    info!(actor = %actor.login_name, session_id, "Handling end_session request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::end_session(
        &mut persistence,
        &actor,
        session_id,
    )?))
}

async fn handle_login_history(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Query(query): Query<LoginHistoryRequest>,
) -> Result<Json<LoginHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::list_login_history(
        &mut persistence,
        &actor,
        &query,
    )?))
}

// ============================================================================
// Members
// ============================================================================

async fn handle_list_members(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ListMembersRequest>,
) -> Result<Json<ListMembersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::list_members(&mut persistence, &query)?))
}

async fn handle_create_member(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<CreateMemberRequest>,
) -> Result<Json<MemberResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        emp_id = %req.emp_id,
        department = %req.department,
        "Handling create_member request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::create_member(
        &mut persistence,
        &actor,
        req,
    )?))
}

async fn handle_update_member(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(member_id): Path<i64>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>, HttpError> {
    info!(actor = %actor.login_name, member_id, "Handling update_member request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::update_member(
        &mut persistence,
        &actor,
        member_id,
        req,
    )?))
}

async fn handle_delete_member(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(member_id): Path<i64>,
) -> Result<Json<DeleteResponse>, HttpError> {
    info!(actor = %actor.login_name, member_id, "Handling delete_member request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::delete_member(
        &mut persistence,
        &actor,
        member_id,
    )?))
}

async fn handle_deactivate_member(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(member_id): Path<i64>,
) -> Result<Json<MemberResponse>, HttpError> {
    info!(actor = %actor.login_name, member_id, "Handling deactivate_member request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::deactivate_member(
        &mut persistence,
        &actor,
        member_id,
    )?))
}

async fn handle_reactivate_member(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(member_id): Path<i64>,
) -> Result<Json<MemberResponse>, HttpError> {
    info!(actor = %actor.login_name, member_id, "Handling reactivate_member request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::reactivate_member(
        &mut persistence,
        &actor,
        member_id,
    )?))
}

async fn handle_preview_member_import(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<SpreadsheetUpload>,
) -> Result<Json<MemberImportPreviewResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        file_name = %req.file_name,
        "Handling member import preview"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::preview_member_import(
        &mut persistence,
        &actor,
        &req,
    )?))
}

async fn handle_commit_member_import(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<SpreadsheetUpload>,
) -> Result<Json<MemberImportCommitResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        file_name = %req.file_name,
        "Handling member import commit"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::commit_member_import(
        &mut persistence,
        &actor,
        &req,
    )?))
}

// ============================================================================
// Allocations
// ============================================================================

async fn handle_list_allocations(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ListAllocationsRequest>,
) -> Result<Json<ListAllocationsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::list_allocations(&mut persistence, &query)?))
}

async fn handle_create_allocation(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<CreateAllocationRequest>,
) -> Result<Json<AllocationResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        member_id = req.member_id,
        date = %req.allocation_date,
        "Handling create_allocation request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::create_allocation(
        &mut persistence,
        &actor,
        req,
    )?))
}

async fn handle_update_allocation(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(allocation_id): Path<i64>,
    Json(req): Json<UpdateAllocationRequest>,
) -> Result<Json<AllocationResponse>, HttpError> {
    info!(actor = %actor.login_name, allocation_id, "Handling update_allocation request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::update_allocation(
        &mut persistence,
        &actor,
        allocation_id,
        req,
    )?))
}

async fn handle_delete_allocation(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(allocation_id): Path<i64>,
) -> Result<Json<DeleteResponse>, HttpError> {
    info!(actor = %actor.login_name, allocation_id, "Handling delete_allocation request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::delete_allocation(
        &mut persistence,
        &actor,
        allocation_id,
    )?))
}

async fn handle_preview_allocation_import(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<AllocationImportRequest>,
) -> Result<Json<AllocationImportPreviewResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        file_name = %req.upload.file_name,
        "Handling allocation import preview"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::preview_allocation_import(
        &mut persistence,
        &actor,
        &req,
    )?))
}

async fn handle_commit_allocation_import(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<AllocationImportRequest>,
) -> Result<Json<AllocationImportCommitResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        file_name = %req.upload.file_name,
        strategy = ?req.strategy,
        "Handling allocation import commit"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::commit_allocation_import(
        &mut persistence,
        &actor,
        &req,
    )?))
}

async fn handle_export_allocations(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ExportAllocationsRequest>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let csv: String = crewplan_api::export_allocations(&mut persistence, &query)?;
    Ok(csv_response("allocations.csv", csv))
}

// ============================================================================
// Soft bookings
// ============================================================================

async fn handle_list_soft_bookings(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ListSoftBookingsRequest>,
) -> Result<Json<ListSoftBookingsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::list_soft_bookings(
        &mut persistence,
        &query,
    )?))
}

async fn handle_create_soft_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Json(req): Json<CreateSoftBookingRequest>,
) -> Result<Json<SoftBookingResponse>, HttpError> {
    info!(
        actor = %actor.login_name,
        show_name = %req.show_name,
        department = %req.department,
        "Handling create_soft_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::create_soft_booking(
        &mut persistence,
        &actor,
        req,
    )?))
}

async fn handle_delete_soft_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(booking_id): Path<i64>,
) -> Result<Json<DeleteResponse>, HttpError> {
    info!(actor = %actor.login_name, booking_id, "Handling delete_soft_booking request");

    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::delete_soft_booking(
        &mut persistence,
        &actor,
        booking_id,
    )?))
}

// ============================================================================
// Reports and activity
// ============================================================================

async fn handle_capacity_report(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ReportRequest>,
) -> Result<Json<CapacityResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::capacity_report(&mut persistence, &query)?))
}

async fn handle_utilization_report(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ReportRequest>,
) -> Result<Json<UtilizationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::utilization_report(
        &mut persistence,
        &query,
    )?))
}

async fn handle_list_activity(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ActivityRequest>,
) -> Result<Json<ListActivityResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(crewplan_api::list_activity(&mut persistence, &query)?))
}

async fn handle_export_activity(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(..): SessionOperator,
    Query(query): Query<ActivityRequest>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let csv: String = crewplan_api::export_activity(&mut persistence, &query)?;
    Ok(csv_response("activity.csv", csv))
}

async fn handle_undo_activity(
    AxumState(app_state): AxumState<AppState>,
    SessionOperator(actor, _, _): SessionOperator,
    Path(log_id): Path<i64>,
) -> Result<Json<UndoResponse>, HttpError> {
    info!(actor = %actor.login_name, log_id, "Handling undo request");

    let mut persistence = app_state.persistence.lock().await;
    let response: UndoResponse = crewplan_api::undo_activity(&mut persistence, &actor, log_id)?;
    drop(persistence);

    info!(log_id, message = %response.message, "Undo applied");
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/auth/password", post(handle_change_password))
        .route(
            "/admin/operators",
            get(handle_list_operators).post(handle_create_operator),
        )
        .route(
            "/admin/operators/{operator_id}",
            axum::routing::delete(handle_delete_operator),
        )
        .route(
            "/admin/operators/{operator_id}/disable",
            post(handle_disable_operator),
        )
        .route(
            "/admin/operators/{operator_id}/enable",
            post(handle_enable_operator),
        )
        .route("/admin/sessions", get(handle_list_sessions))
        .route(
            "/admin/sessions/{session_id}",
            axum::routing::delete(handle_end_session),
        )
        .route("/admin/login_history", get(handle_login_history))
        .route(
            "/members",
            get(handle_list_members).post(handle_create_member),
        )
        .route(
            "/members/{member_id}",
            axum::routing::patch(handle_update_member).delete(handle_delete_member),
        )
        .route(
            "/members/{member_id}/deactivate",
            post(handle_deactivate_member),
        )
        .route(
            "/members/{member_id}/reactivate",
            post(handle_reactivate_member),
        )
        .route(
            "/members/import/preview",
            post(handle_preview_member_import),
        )
        .route("/members/import/commit", post(handle_commit_member_import))
        .route(
            "/allocations",
            get(handle_list_allocations).post(handle_create_allocation),
        )
        .route("/allocations/export", get(handle_export_allocations))
        .route(
            "/allocations/{allocation_id}",
            axum::routing::patch(handle_update_allocation).delete(handle_delete_allocation),
        )
        .route(
            "/allocations/import/preview",
            post(handle_preview_allocation_import),
        )
        .route(
            "/allocations/import/commit",
            post(handle_commit_allocation_import),
        )
        .route(
            "/soft_bookings",
            get(handle_list_soft_bookings).post(handle_create_soft_booking),
        )
        .route(
            "/soft_bookings/{booking_id}",
            axum::routing::delete(handle_delete_soft_booking),
        )
        .route("/reports/capacity", get(handle_capacity_report))
        .route("/reports/utilization", get(handle_utilization_report))
        .route("/activity", get(handle_list_activity))
        .route("/activity/export", get(handle_export_activity))
        .route("/activity/{log_id}/undo", post(handle_undo_activity))
        .with_state(app_state)
}

/// Creates the first Admin operator on an empty database.
///
/// Does nothing once any operator exists, so the flags can stay in a
/// service definition across restarts.
///
/// # Errors
///
/// Returns an error if the password fails the policy or the insert fails.
fn bootstrap_admin(
    persistence: &mut Persistence,
    login_name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if persistence.count_operators()? > 0 {
        info!("Operators already exist; skipping bootstrap");
        return Ok(());
    }

    let display_name: &str = "Administrator";
    PasswordPolicy::default().validate(password, password, login_name, display_name)?;
    let operator_id: i64 =
        persistence.create_operator(login_name, display_name, password, Role::Admin.as_str())?;
    info!(operator_id, login_name = %login_name, "Bootstrap Admin operator created");
    Ok(())
}

/// Sweeps expired sessions on a fixed interval for the life of the server.
fn spawn_session_purge(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval: tokio::time::Interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let mut persistence = app_state.persistence.lock().await;
            match crewplan_api::purge_expired_sessions(&mut persistence) {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Purged expired sessions"),
                Err(e) => warn!(error = %e, "Failed to purge expired sessions"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing CrewPlan Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let (Some(login_name), Some(password)) = (&args.bootstrap_admin, &args.bootstrap_password)
    {
        bootstrap_admin(&mut persistence, login_name, password)?;
    } else if persistence.count_operators()? == 0 {
        warn!("No operators exist; start with --bootstrap-admin to create one");
    }

    let app_state: AppState =
        AppState::new(persistence, Duration::hours(args.session_ttl_hours.max(1)));
    spawn_session_purge(app_state.clone());

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
