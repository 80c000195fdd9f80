use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::{model::role::Role, models::Claims};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

/// Caller identity, passed explicitly into every lifecycle operation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub name: String,
    pub role: Role,

    /// Present for students and faculty
    pub department: Option<String>,
    /// Present only for students
    pub registration_number: Option<String>,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Option<Self> {
        let role = Role::from_claim(&claims.role)?;
        Some(AuthUser {
            user_id: claims.sub,
            name: claims.name,
            role,
            department: claims.department,
            registration_number: claims.registration_number,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        match AuthUser::from_claims(claims) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(ErrorUnauthorized("Invalid role"))),
        }
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    pub fn require_student(&self) -> actix_web::Result<()> {
        if self.role == Role::Student {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Students only"))
        }
    }

    pub fn require_faculty_or_admin(&self) -> actix_web::Result<()> {
        if self.role.can_respond() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Faculty/Admin only"))
        }
    }

    pub fn require_security_or_admin(&self) -> actix_web::Result<()> {
        if self.role.can_verify() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Security/Admin only"))
        }
    }
}
