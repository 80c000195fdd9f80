use crate::auth::auth::AuthUser;
use crate::error::LeaveError;
use crate::leave::{PassVerifier, VerificationResult};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

const SYSTEM_ERROR: &str = "System Error";

#[derive(Deserialize, ToSchema)]
pub struct VerifyPass {
    /// Scanned or typed exit-pass token
    #[schema(example = "PASS-K3F9Q2Z-1708335000000")]
    pub token: String,
}

/// Verifies an exit pass and consumes it on success
#[utoipa::path(
    post,
    path = "/api/pass/verify",
    request_body(content = VerifyPass, content_type = "application/json"),
    responses(
        (status = 200, description = "Verification outcome; `success` is false for invalid, used or expired passes",
         body = VerificationResult,
         example = json!({
            "success": false,
            "message": "QR Code already used/scanned"
         })
        ),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Store failure", body = VerificationResult, example = json!({
            "success": false,
            "message": "System Error"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Pass"
)]
pub async fn verify_pass(
    auth: AuthUser,
    verifier: web::Data<PassVerifier>,
    payload: web::Json<VerifyPass>,
) -> actix_web::Result<impl Responder> {
    auth.require_security_or_admin()?;

    match verifier.verify(&payload.token).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(LeaveError::Storage(_)) => Ok(HttpResponse::InternalServerError().json(
            VerificationResult::rejected(SYSTEM_ERROR),
        )),
        Err(e) => Err(e.into()),
    }
}
