use std::time::Duration;

/// Default request body limit for the server.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default client request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Server-side settings for the HTTP binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Path of the single `POST` endpoint.
    pub path: String,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Attach a permissive CORS layer.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            cors: false,
        }
    }
}

impl ServerConfig {
    /// The endpoint path with a leading slash.
    pub fn route_path(&self) -> String {
        if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }
}

/// Settings for the reqwest-backed client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!("zrpc/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_path_adds_leading_slash() {
        let config = ServerConfig {
            path: "rpc".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.route_path(), "/rpc");
        assert_eq!(ServerConfig::default().route_path(), "/");
    }

    #[test]
    fn client_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT));
        assert!(config.user_agent.starts_with("zrpc/"));
    }
}
