use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Prefix prepended to relative image references in responses
    /// (e.g. "http://localhost:8080"). Stored references stay relative.
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
        }
    }
}
