use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// Password Toggl expects when authenticating with an API token.
pub const API_TOKEN_PASSWORD: &str = "api_token";

/// Builds the basic `Authorization` header value for an API token.
pub fn api_token_credentials(token: &str) -> String {
    let encoded = BASE64_STANDARD.encode(format!("{}:{}", token.trim(), API_TOKEN_PASSWORD));
    format!("Basic {encoded}")
}
