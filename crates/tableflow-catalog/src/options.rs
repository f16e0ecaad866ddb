use std::time::Duration;

/// Options that control how the HTTP catalog source talks to the admin API.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Admin API base URL (ex.: `http://localhost:3003/admin/v1`).
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3003/admin/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}
