use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Payment gateway connection settings. The client itself is constructed
/// explicitly in `main` and carried in router state, never as a global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment picks the defaults, specific env vars override
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BRAINTREE_GATEWAY_URL") {
            self.gateway.base_url = v;
        }
        if let Ok(v) = env::var("BRAINTREE_MERCHANT_ID") {
            self.gateway.merchant_id = v;
        }
        if let Ok(v) = env::var("BRAINTREE_PUBLIC_KEY") {
            self.gateway.public_key = v;
        }
        if let Ok(v) = env::var("BRAINTREE_PRIVATE_KEY") {
            self.gateway.private_key = v;
        }
        if let Ok(v) = env::var("GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = v.parse().unwrap_or(self.gateway.timeout_secs);
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                // leaves headroom above the 1MB photo cap so oversize
                // uploads reach the handler's own check
                max_request_size_bytes: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
            },
            gateway: GatewayConfig {
                base_url: "https://api.sandbox.braintreegateway.com".to_string(),
                merchant_id: String::new(),
                public_key: String::new(),
                private_key: String::new(),
                timeout_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                max_request_size_bytes: 5 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            gateway: GatewayConfig {
                base_url: "https://api.sandbox.braintreegateway.com".to_string(),
                merchant_id: String::new(),
                public_key: String::new(),
                private_key: String::new(),
                timeout_secs: 15,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                max_request_size_bytes: 5 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            gateway: GatewayConfig {
                base_url: "https://api.braintreegateway.com".to_string(),
                merchant_id: String::new(),
                public_key: String::new(),
                private_key: String::new(),
                timeout_secs: 15,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
