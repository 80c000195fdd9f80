use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::{Value, json};

fn unauthorized(req: ServiceRequest, body: Value) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(body);
    req.into_response(resp.map_into_boxed_body())
}

/// Resolves the bearer token into an `AuthUser` and stores it in the request
/// extensions for the handlers behind the protected scope.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let secret = match req.app_data::<Data<Config>>() {
        Some(config) => config.jwt_secret.clone(),
        None => return Err(actix_web::error::ErrorInternalServerError("App config missing")),
    };

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v.to_string(),
            Err(_) => {
                return Ok(unauthorized(
                    req,
                    json!({"error": "Invalid Authorization header encoding"}),
                ));
            }
        },
        None => {
            return Ok(unauthorized(
                req,
                json!({"error": "Missing Authorization header"}),
            ));
        }
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return Ok(unauthorized(
            req,
            json!({"error": "Authorization header must start with Bearer"}),
        ));
    };

    let claims = match verify_token(token, &secret) {
        Ok(c) => c,
        Err(e) => {
            return Ok(unauthorized(
                req,
                json!({"error": "Invalid or expired token", "details": e}),
            ));
        }
    };

    let Some(auth_user) = AuthUser::from_claims(claims) else {
        return Ok(unauthorized(req, json!({"error": "Unknown role"})));
    };

    tracing::debug!(user_id = %auth_user.user_id, role = %auth_user.role, "Authenticated request");
    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
