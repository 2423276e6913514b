use thiserror::Error;

/// Failure taxonomy shared by the store, the mailer and the reset workflow.
/// Handlers convert every variant into a flash message plus a redirect;
/// nothing here ever reaches a generic crash page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no matching {0}")]
    NotFound(&'static str),

    #[error("password reset token is invalid or has expired")]
    TokenInvalid,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("store error: {0}")]
    Store(String),

    #[error("mail error: {0}")]
    Mail(String),

    #[error("credential error: {0}")]
    Credential(String),
}
