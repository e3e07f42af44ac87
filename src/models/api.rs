use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service health status
    pub status: String,
    /// Service version
    pub version: String,
    /// Name of the access guard protecting the API
    pub guard: String,
    /// Number of CIDR ranges in the allow-list (0 = deny all)
    pub allowed_ranges: usize,
    /// Seconds since the service started
    pub uptime_seconds: u64,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

/// What a guarded handler sees of the caller.
///
/// The guard forwards requests unchanged, so these are the raw values the
/// request arrived with.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    /// Socket peer address of the connection
    pub peer_addr: Option<String>,
    /// Raw `X-Forwarded-For` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded_for: Option<String>,
    /// Raw value of the configured real-IP header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_ip: Option<String>,
    /// Correlation ID assigned to this request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            guard: "ip-guard".to_string(),
            allowed_ranges: 2,
            uptime_seconds: 5,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&response).expect("Serialization should succeed");
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"allowed_ranges\":2"));
    }

    #[test]
    fn test_whoami_skips_absent_headers() {
        let response = WhoAmIResponse {
            peer_addr: Some("127.0.0.1:5000".to_string()),
            forwarded_for: None,
            real_ip: None,
            request_id: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"peer_addr":"127.0.0.1:5000"}"#);
    }
}
