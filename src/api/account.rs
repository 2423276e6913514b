//! Account handlers: signup, login/logout, change-password and the
//! three-step password-reset flow.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, instrument};

use crate::auth::password;
use crate::auth::session::{self, AuthUser};
use crate::config::Config;
use crate::error::AppError;
use crate::flash;
use crate::model::user::User;
use crate::pages;
use crate::reset::ResetWorkflow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordForm {
    pub password: String,
    #[serde(rename = "confirmpassword")]
    pub confirm_password: String,
}

fn workflow<'a>(state: &'a AppState, config: &Config) -> ResetWorkflow<'a> {
    ResetWorkflow {
        users: &*state.users,
        mailer: &*state.mailer,
        ttl_mins: config.reset_token_ttl_mins,
    }
}

pub async fn index() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/login"))
        .finish()
}

pub async fn login_page(req: HttpRequest) -> HttpResponse {
    let flash = flash::peek(&req);
    pages::respond(&req, pages::login(flash.as_ref()))
}

pub async fn signup_page(req: HttpRequest) -> HttpResponse {
    let flash = flash::peek(&req);
    pages::respond(&req, pages::signup(flash.as_ref()))
}

pub async fn forgot_page(req: HttpRequest) -> HttpResponse {
    let flash = flash::peek(&req);
    pages::respond(&req, pages::forgot(flash.as_ref()))
}

pub async fn change_password_page(req: HttpRequest, _auth: AuthUser) -> HttpResponse {
    let flash = flash::peek(&req);
    pages::respond(&req, pages::change_password(flash.as_ref()))
}

#[instrument(name = "signup", skip_all, fields(email = %form.email))]
pub async fn signup(form: web::Form<SignupForm>, state: web::Data<AppState>) -> HttpResponse {
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return flash::error_redirect("/signup", "Name, email and password are all required");
    }

    let password_hash = match password::hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "failed to hash signup password");
            return flash::error_redirect("/signup", &format!("ERROR: {e}"));
        }
    };

    let user = User::new(name.to_string(), email.to_string(), password_hash);
    match state.users.create_user(user).await {
        Ok(()) => {
            info!("account created");
            flash::success_redirect("/login", "Account created successfully")
        }
        Err(e) => flash::error_redirect("/signup", &format!("ERROR: {e}")),
    }
}

#[instrument(name = "login", skip_all, fields(email = %form.email))]
pub async fn login(
    form: web::Form<LoginForm>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> HttpResponse {
    const FAILED: &str = "Invalid email or password. Try again!";

    if form.email.trim().is_empty() || form.password.is_empty() {
        return flash::error_redirect("/login", FAILED);
    }

    let user = match state.users.find_user_by_email(form.email.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("login rejected: unknown email");
            return flash::error_redirect("/login", FAILED);
        }
        Err(e) => {
            error!(error = %e, "store failure during login");
            return flash::error_redirect("/login", &format!("ERROR: {e}"));
        }
    };

    if !password::verify_password(&form.password, &user.password_hash) {
        info!("login rejected: password mismatch");
        return flash::error_redirect("/login", FAILED);
    }

    match session::issue_session(&user, &config.session_secret, config.session_ttl) {
        Ok(cookie) => {
            info!("login successful");
            let mut resp = HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/dashboard"))
                .finish();
            if let Err(e) = resp.add_cookie(&cookie) {
                error!(error = %e, "failed to attach session cookie");
            }
            resp
        }
        Err(e) => {
            error!(error = %e, "failed to issue session");
            flash::error_redirect("/login", &format!("ERROR: {e}"))
        }
    }
}

pub async fn logout() -> HttpResponse {
    let mut resp = flash::success_redirect("/login", "you have been logged out");
    if let Err(e) = resp.add_cookie(&session::clear_session()) {
        error!(error = %e, "failed to attach logout cookie");
    }
    resp
}

/// POST /forgot — step one of the reset flow. The unknown-email message
/// mirrors the account-enumeration behavior of the original site.
#[instrument(name = "forgot_password", skip_all, fields(email = %form.email))]
pub async fn forgot(
    req: HttpRequest,
    form: web::Form<ForgotForm>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> HttpResponse {
    let host = req.connection_info().host().to_string();

    match workflow(&state, &config)
        .request(form.email.trim(), &host, Utc::now())
        .await
    {
        Ok(_) => flash::success_redirect(
            "/forgot",
            "Email sent with further instructions. Please check that.",
        ),
        Err(AppError::NotFound(_)) => {
            flash::error_redirect("/forgot", "User does not exist with this email address")
        }
        Err(AppError::Mail(e)) => {
            error!(error = %e, "recovery mail delivery failed");
            flash::error_redirect(
                "/forgot",
                "Could not send the recovery email. Please try again later.",
            )
        }
        Err(e) => flash::error_redirect("/forgot", &format!("ERROR: {e}")),
    }
}

/// GET /reset/{token} — step two, the confirmation form.
pub async fn reset_form(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> HttpResponse {
    let token = path.into_inner();

    match workflow(&state, &config).validate(&token, Utc::now()).await {
        Ok(_) => {
            let flash = flash::peek(&req);
            pages::respond(&req, pages::reset(flash.as_ref(), &token))
        }
        Err(AppError::TokenInvalid) => flash::error_redirect(
            "/forgot",
            "Password reset token is invalid or has been expired",
        ),
        Err(e) => flash::error_redirect("/forgot", &format!("ERROR: {e}")),
    }
}

/// POST /reset/{token} — step three, credential rotation.
#[instrument(name = "confirm_reset", skip_all)]
pub async fn reset(
    path: web::Path<String>,
    form: web::Form<PasswordForm>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> HttpResponse {
    let token = path.into_inner();

    match workflow(&state, &config)
        .confirm(&token, &form.password, &form.confirm_password, Utc::now())
        .await
    {
        Ok(user) => {
            let mut resp =
                flash::success_redirect("/login", "Your password has been changed successfully");
            match session::issue_session(&user, &config.session_secret, config.session_ttl) {
                Ok(cookie) => {
                    if let Err(e) = resp.add_cookie(&cookie) {
                        error!(error = %e, "failed to attach session cookie");
                    }
                }
                Err(e) => error!(error = %e, "failed to issue session after reset"),
            }
            resp
        }
        Err(AppError::TokenInvalid) => flash::error_redirect(
            "/forgot",
            "Password reset token is invalid or has been expired",
        ),
        Err(AppError::PasswordMismatch) => {
            flash::error_redirect("/forgot", "Password does not match")
        }
        Err(e) => flash::error_redirect("/forgot", &format!("ERROR: {e}")),
    }
}

#[instrument(name = "change_password", skip_all, fields(email = %auth.email))]
pub async fn change_password(
    auth: AuthUser,
    form: web::Form<PasswordForm>,
    state: web::Data<AppState>,
) -> HttpResponse {
    if form.password != form.confirm_password {
        return flash::error_redirect("/password/change", "Password does not match, Type again");
    }

    let mut user = match state.users.find_user_by_email(&auth.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return flash::error_redirect("/password/change", "ERROR: account not found"),
        Err(e) => return flash::error_redirect("/password/change", &format!("ERROR: {e}")),
    };

    user.password_hash = match password::hash_password(&form.password) {
        Ok(hash) => hash,
        Err(e) => return flash::error_redirect("/password/change", &format!("ERROR: {e}")),
    };

    match state.users.save_user(&user).await {
        Ok(()) => {
            info!("password changed");
            flash::success_redirect("/dashboard", "Password changed successfully")
        }
        Err(e) => flash::error_redirect("/password/change", &format!("ERROR: {e}")),
    }
}
