//! Gateway configuration.
//!
//! Built from environment variables at startup and used to assemble the
//! router and the message-bus client.

use std::time::Duration;

/// Global configuration of the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port to listen on (default `3000`).
    pub listen_port: u16,
    /// NATS server URL.
    pub nats_url: String,
    /// Prefix every route is mounted under, normalised to `/segment` or
    /// empty.
    pub route_prefix: String,
    /// Origins allowed to call the gateway from a browser.
    pub allowed_origins: Vec<String>,
    /// How long to wait for the identity service before giving up.
    pub upstream_timeout: Duration,
    /// Unique name of this gateway instance; names its reply subject.
    pub instance: String,
}

impl GatewayConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                      | Default                    | Description                         |
    /// |-------------------------------|----------------------------|-------------------------------------|
    /// | `GATEWAY_PORT`                | `3000`                     | HTTP listen port                    |
    /// | `NATS_URL`                    | `nats://localhost:4222`    | Message bus                         |
    /// | `GATEWAY_PREFIX`              | `/api`                     | Global route prefix                 |
    /// | `CORS_ALLOWED_ORIGINS`        | `http://localhost:5173`    | Comma-separated origin allow-list   |
    /// | `GATEWAY_UPSTREAM_TIMEOUT_MS` | `5000`                     | Identity service reply timeout      |
    /// | `GATEWAY_INSTANCE`            | random                     | Reply-subject instance name         |
    pub fn from_env() -> Self {
        let listen_port: u16 = std::env::var("GATEWAY_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let nats_url =
            std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let route_prefix =
            normalize_prefix(&std::env::var("GATEWAY_PREFIX").unwrap_or_else(|_| "/api".into()));

        let allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let upstream_timeout = std::env::var("GATEWAY_UPSTREAM_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|ms: &u64| *ms > 0)
            .map_or(Duration::from_secs(5), Duration::from_millis);

        let instance = std::env::var("GATEWAY_INSTANCE")
            .unwrap_or_else(|_| uuid::Uuid::new_v4().simple().to_string());

        Self {
            listen_port,
            nats_url,
            route_prefix,
            allowed_origins,
            upstream_timeout,
            instance,
        }
    }
}

/// `api/` → `/api`, `/` → empty.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Split a comma-separated list, dropping blanks and trailing slashes.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_normalisation() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix(" /v1/api/ "), "/v1/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn origin_list_parsing() {
        assert_eq!(
            parse_origins("http://a.test, https://b.test/ ,,"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }
}
