use crate::auth::auth::AuthUser;
use crate::config::{Config, LeavePolicy};
use crate::leave::LeaveLifecycle;
use crate::leave::report::build_report;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[schema(example = "ABC Engineering College")]
    pub college_name: String,
    #[schema(example = "2024-2025")]
    pub academic_year: String,
    pub policy: LeavePolicy,
}

/// Status totals, monthly trend and average response time over all requests
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    responses(
        (status = 200, description = "Leave report", body = crate::leave::report::LeaveReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn report_summary(
    auth: AuthUser,
    lifecycle: web::Data<LeaveLifecycle>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let requests = lifecycle.list_all().await?;
    Ok(HttpResponse::Ok().json(build_report(&requests)))
}

/// Effective leave policy
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current settings", body = SettingsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn settings(
    auth: AuthUser,
    config: web::Data<Config>,
    lifecycle: web::Data<LeaveLifecycle>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    Ok(HttpResponse::Ok().json(SettingsResponse {
        college_name: config.college_name.clone(),
        academic_year: config.academic_year.clone(),
        policy: lifecycle.policy().clone(),
    }))
}
