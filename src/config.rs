use std::env;
use std::path::Path;

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_PROJECT_ID: &str = "default";
pub const DEFAULT_MAX_SUBMIT_ATTEMPTS: u32 = 5;
pub const SESSION_COOKIE: &str = "stratus_session";
/// Idle time after which a session is dropped; also the cookie's max-age.
pub const SESSION_TTL_HOURS: i64 = 12;

/// Load `.env` from the working directory, or the given file instead.
/// A missing file is not an error.
pub fn load_env_file(env_file: Option<&str>) {
    let loaded = match env_file {
        Some(path) => dotenvy::from_path(Path::new(path)).is_ok(),
        None => dotenvy::dotenv().is_ok(),
    };
    if !loaded {
        tracing::debug!(?env_file, "No env file loaded");
    }
}

pub fn get_api_base_url() -> String {
    sanitize_base_url(&env::var("API_BASE_URL").unwrap_or_default())
}

pub fn get_api_token() -> String {
    env::var("API_TOKEN").map(|t| t.trim().to_string()).unwrap_or_default()
}

/// Public URL the console is reached at; empty means relative links.
pub fn get_public_base_url() -> String {
    env::var("PUBLIC_BASE_URL")
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .unwrap_or_default()
}

pub fn get_default_project_id() -> String {
    env::var("DEFAULT_PROJECT_ID")
        .ok()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string())
}

/// Failed submissions allowed before the wizard asks the user to review
/// their input. Zero or unparsable values fall back to the default.
pub fn get_max_submit_attempts() -> u32 {
    env::var("WIZARD_MAX_SUBMIT_ATTEMPTS")
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_SUBMIT_ATTEMPTS)
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}
