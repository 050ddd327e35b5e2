use serde::{Deserialize, Serialize};

use crate::network::ConnectionConfig;

/// Configuration for a capture session
///
/// `server_address` is required; the language and simplification settings
/// are hints interpreted by the captioning service, not enforced locally.
///
/// # Example
/// ```
/// use livecap::coordinator::CaptureConfig;
///
/// let config = CaptureConfig::new("ws://127.0.0.1:5000/stream")
///     .with_languages("en-IN", "hi")
///     .with_simplify(true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// WebSocket address of the captioning service (required)
    pub server_address: String,

    /// Source language code for recognition (e.g. "en-IN")
    pub source_language: String,

    /// Target language code for translation (e.g. "hi")
    pub target_language: String,

    /// Whether the service should also produce simplified captions
    pub simplify: bool,

    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl CaptureConfig {
    /// Create a configuration for the given service address with the
    /// service's default languages
    pub fn new(server_address: impl Into<String>) -> Self {
        Self {
            server_address: server_address.into(),
            source_language: "en-IN".to_string(),
            target_language: "hi".to_string(),
            simplify: true,
            connect_timeout_ms: 10000,
        }
    }

    /// Set source and target language codes
    pub fn with_languages(
        mut self,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        self.source_language = source_language.into();
        self.target_language = target_language.into();
        self
    }

    /// Set whether simplified captions are requested
    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    /// Set the connection timeout in milliseconds
    pub fn with_connect_timeout(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    /// Derive the transport connection configuration
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.server_address.clone()).with_timeout(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CaptureConfig::new("ws://localhost:5000");

        assert_eq!(config.server_address, "ws://localhost:5000");
        assert_eq!(config.source_language, "en-IN");
        assert_eq!(config.target_language, "hi");
        assert!(config.simplify);
        assert_eq!(config.connect_timeout_ms, 10000);
    }

    #[test]
    fn test_config_builder() {
        let config = CaptureConfig::new("wss://captions.example.com")
            .with_languages("ta-IN", "en")
            .with_simplify(false)
            .with_connect_timeout(3000);

        assert_eq!(config.source_language, "ta-IN");
        assert_eq!(config.target_language, "en");
        assert!(!config.simplify);
        assert_eq!(config.connect_timeout_ms, 3000);
    }

    #[test]
    fn test_connection_config_derivation() {
        let config = CaptureConfig::new("ws://localhost:5000").with_connect_timeout(1234);
        let conn = config.connection_config();

        assert_eq!(conn.server_address, "ws://localhost:5000");
        assert_eq!(conn.timeout_ms, 1234);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = CaptureConfig::new("ws://localhost:5000").with_languages("en-IN", "bn");
        let json = serde_json::to_string(&config).unwrap();
        let back: CaptureConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, back);
    }
}
