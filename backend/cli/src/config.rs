/// SnapSolve runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// SQLite database path
    pub db_path: String,
    /// Directory for uploaded images
    pub media_dir: String,
    /// Externally reachable base URL (e.g. "https://solve.example.com").
    /// When unset, images are sent to the model inline as data URLs.
    pub public_base_url: Option<String>,
    /// OpenAI-compatible chat-completions base URL
    pub ai_base_url: String,
    /// API key for the AI gateway
    pub ai_api_key: Option<String>,
    /// Model for the recognition step
    pub vision_model: String,
    /// Model for the solving step
    pub solver_model: String,
    /// Static bearer token; unset leaves the API open
    pub api_token: Option<String>,
    /// Upload size cap in bytes
    pub max_upload_bytes: usize,
    /// Submissions allowed per client per window
    pub rate_limit: u32,
    pub rate_window_secs: u64,
    /// Log directory; unset disables file logging
    pub log_dir: Option<String>,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("SNAPSOLVE_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SNAPSOLVE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            db_path: std::env::var("SNAPSOLVE_DB").unwrap_or_else(|_| "snapsolve.db".to_string()),
            media_dir: std::env::var("SNAPSOLVE_MEDIA_DIR").unwrap_or_else(|_| "media".to_string()),
            public_base_url: std::env::var("SNAPSOLVE_PUBLIC_URL").ok(),
            ai_base_url: std::env::var("SNAPSOLVE_AI_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            ai_api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            vision_model: std::env::var("SNAPSOLVE_VISION_MODEL")
                .unwrap_or_else(|_| "google/gemini-2.5-flash".to_string()),
            solver_model: std::env::var("SNAPSOLVE_SOLVER_MODEL")
                .unwrap_or_else(|_| "google/gemini-2.5-flash".to_string()),
            api_token: std::env::var("SNAPSOLVE_API_TOKEN").ok(),
            max_upload_bytes: std::env::var("SNAPSOLVE_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            rate_limit: std::env::var("SNAPSOLVE_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            rate_window_secs: std::env::var("SNAPSOLVE_RATE_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            log_dir: std::env::var("SNAPSOLVE_LOG_DIR").ok(),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
