use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use std::env;

lazy_static! {
    pub static ref TOKEN_PATH: String =
        env::var("TOKEN_PATH").unwrap_or_else(|_| "token.json".to_string());
    pub static ref PORT: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);
}

pub fn init_logger() {
    Builder::new().filter_level(LevelFilter::Info).init();
    info!("Starting Rocket backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

/// Credential bootstrap blobs for non-interactive deployments: a raw JSON
/// bundle, or the same bundle base64-encoded.
pub fn token_seed() -> (Option<String>, Option<String>) {
    (env::var("TOKEN_JSON").ok(), env::var("TOKEN_JSON_B64").ok())
}
