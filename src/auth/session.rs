use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, cookie::Cookie, dev::Payload, error::ResponseError,
    http::StatusCode, web::Data,
};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::flash;
use crate::model::user::User;

pub const SESSION_COOKIE: &str = "sid";

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub exp: usize,
}

/// Builds the HTTP-only session cookie carrying the signed claims.
pub fn issue_session(user: &User, secret: &str, ttl: usize) -> Result<Cookie<'static>, AppError> {
    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        exp: now() + ttl,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Credential(e.to_string()))?;

    Ok(Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .finish())
}

/// Removal cookie used by logout.
pub fn clear_session() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

pub fn verify_session(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Credential(e.to_string()))
}

/// Raised when a protected route is hit without a valid session; renders
/// as a redirect to the login page, never as a bare 401.
#[derive(Debug)]
pub struct AuthRedirect;

impl fmt::Display for AuthRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("login required")
    }
}

impl ResponseError for AuthRedirect {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        flash::error_redirect("/login", "Please login first to access this page")
    }
}

/// The logged-in identity, extracted per request from the session cookie.
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let cookie = match req.cookie(SESSION_COOKIE) {
            Some(c) => c,
            None => return ready(Err(AuthRedirect.into())),
        };

        let claims = match verify_session(cookie.value(), &config.session_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(AuthRedirect.into())),
        };

        ready(Ok(AuthUser {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
        }))
    }
}
