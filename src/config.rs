use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub session_secret: String,
    pub session_ttl: usize,

    // SMTP account used for reset / confirmation mail
    pub smtp_email: String,
    pub smtp_password: String,
    pub smtp_relay: String,

    pub reset_token_ttl_mins: i64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            session_secret: env::var("SESSION_SECRET").expect("SESSION_SECRET must be set"),
            session_ttl: env::var("SESSION_TTL")
                .unwrap_or_else(|_| "86400".to_string()) // default 1 day
                .parse()
                .expect("SESSION_TTL must be a number of seconds"),

            smtp_email: env::var("SMTP_EMAIL").expect("SMTP_EMAIL must be set"),
            smtp_password: env::var("SMTP_PASSWORD").expect("SMTP_PASSWORD must be set"),
            smtp_relay: env::var("SMTP_RELAY").unwrap_or_else(|_| "smtp.gmail.com".to_string()),

            reset_token_ttl_mins: env::var("RESET_TOKEN_TTL_MINS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("RESET_TOKEN_TTL_MINS must be a number of minutes"),
        }
    }
}
