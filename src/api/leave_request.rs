use crate::auth::auth::AuthUser;
use crate::leave::LeaveLifecycle;
use crate::leave::lifecycle::filter_status;
use crate::leave::validation::LeaveApplication;
use crate::model::leave_request::{Decision, LeaveRequest, LeaveStatus};
use crate::model::role::Role;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub total: usize,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveListQuery {
    /// Filter by leave status
    #[param(value_type = Option<String>, example = "pending")]
    pub status: Option<LeaveStatus>,
}

#[derive(Deserialize, ToSchema)]
pub struct RespondLeave {
    /// Optional note stored with the decision
    #[schema(example = "Get well soon")]
    pub remarks: Option<String>,
}

/* =========================
Create leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveApplication,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Missing or invalid field", body = Object, example = json!({
            "message": "reason is required"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    payload: web::Json<LeaveApplication>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let created = lifecycle.create(&auth, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

async fn respond(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    leave_id: String,
    decision: Decision,
    body: Option<web::Json<RespondLeave>>,
) -> actix_web::Result<HttpResponse> {
    auth.require_faculty_or_admin()?;

    let remarks = body.and_then(|b| b.into_inner().remarks);
    let updated = lifecycle.respond(&leave_id, decision, &auth, remarks).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/* =========================
Approve leave (Faculty/Admin)
========================= */
/// Approves a pending request and issues its exit pass
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = RespondLeave, description = "Optional remarks", content_type = "application/json"),
    responses(
        (status = 200, description = "Leave approved, pass issued", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        })),
        (status = 409, description = "Leave request already processed", body = Object, example = json!({
            "message": "Leave request already approved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<String>,
    body: Option<web::Json<RespondLeave>>,
) -> actix_web::Result<impl Responder> {
    respond(auth, lifecycle, path.into_inner(), Decision::Approve, body).await
}

/* =========================
Reject leave (Faculty/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = RespondLeave, description = "Optional remarks", content_type = "application/json"),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<String>,
    body: Option<web::Json<RespondLeave>>,
) -> actix_web::Result<impl Responder> {
    respond(auth, lifecycle, path.into_inner(), Decision::Reject, body).await
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = String, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    if auth.role == Role::SecurityGuard {
        return Err(actix_web::error::ErrorForbidden("Use pass verification"));
    }

    let leave = lifecycle.get(&path.into_inner()).await?;
    if auth.role == Role::Student && leave.student_id != auth.user_id {
        return Err(actix_web::error::ErrorForbidden("Not your leave request"));
    }

    Ok(HttpResponse::Ok().json(leave))
}

/// Role-scoped leave history: students see their own, faculty their department, admins all
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Leave list, most recent first", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
    query: web::Query<LeaveListQuery>,
) -> actix_web::Result<impl Responder> {
    let requests = match (auth.role, auth.department.as_deref()) {
        (Role::Student, _) => lifecycle.list_by_requester(&auth.user_id).await?,
        (Role::Faculty, Some(department)) => lifecycle.list_by_department(department).await?,
        (Role::Faculty, None) | (Role::Admin, _) => lifecycle.list_all().await?,
        (Role::SecurityGuard, _) => {
            return Err(actix_web::error::ErrorForbidden("Use pass verification"));
        }
    };

    let data = filter_status(requests, query.status);
    Ok(HttpResponse::Ok().json(LeaveListResponse {
        total: data.len(),
        data,
    }))
}

/// Remaining yearly allowance per leave type for the calling student
#[utoipa::path(
    get,
    path = "/api/leave/balance",
    responses(
        (status = 200, description = "Leave balance for the current year", body = crate::leave::balance::LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
) -> actix_web::Result<impl Responder> {
    auth.require_student()?;

    let balance = lifecycle
        .balance(&auth.user_id, Utc::now().date_naive())
        .await?;
    Ok(HttpResponse::Ok().json(balance))
}
