use actix_web::{HttpRequest, HttpResponse, cookie::Cookie, http::header};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// One-shot notification carried across a redirect in a cookie. Set
/// alongside the redirect, read and cleared by the next page render.
pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            text: text.into(),
        }
    }
}

fn encode(flash: &Flash) -> String {
    let json = serde_json::to_vec(flash).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode(value: &str) -> Option<Flash> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Reads the pending flash, if any. The matching render helper clears it.
pub fn peek(req: &HttpRequest) -> Option<Flash> {
    decode(req.cookie(FLASH_COOKIE)?.value())
}

pub fn clear_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(FLASH_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

fn redirect_with(location: &str, flash: Flash) -> HttpResponse {
    let cookie = Cookie::build(FLASH_COOKIE, encode(&flash))
        .path("/")
        .http_only(true)
        .finish();

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_string()))
        .cookie(cookie)
        .finish()
}

pub fn success_redirect(location: &str, text: &str) -> HttpResponse {
    redirect_with(location, Flash::success(text))
}

pub fn error_redirect(location: &str, text: &str) -> HttpResponse {
    redirect_with(location, Flash::error(text))
}
