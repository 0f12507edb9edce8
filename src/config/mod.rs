use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub routes: RouteConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing)]
    pub bearer_token: Option<String>,
}

/// Redirect targets used by the route guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub sign_in_path: String,
    pub tenant_dashboard_path: String,
    pub awaiting_organization_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub default_filter: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            sign_in_path: "/login".to_string(),
            tenant_dashboard_path: "/dashboard".to_string(),
            awaiting_organization_path: "/awaiting-organization".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // API overrides
        if let Some(v) = var("CONSOLE_API_BASE_URL") {
            self.api.base_url = v;
        }
        if let Some(v) = var("CONSOLE_API_TOKEN") {
            self.api.bearer_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Some(v) = var("CONSOLE_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }

        // Route overrides
        if let Some(v) = var("CONSOLE_SIGN_IN_PATH") {
            self.routes.sign_in_path = v;
        }
        if let Some(v) = var("CONSOLE_DASHBOARD_PATH") {
            self.routes.tenant_dashboard_path = v;
        }
        if let Some(v) = var("CONSOLE_AWAITING_ORG_PATH") {
            self.routes.awaiting_organization_path = v;
        }

        // Logging overrides
        if let Some(v) = var("CONSOLE_LOG_FILTER") {
            self.logging.default_filter = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:3000".to_string(),
                request_timeout_secs: 30,
                bearer_token: None,
            },
            routes: RouteConfig::default(),
            logging: LoggingConfig {
                default_filter: "institute_console=debug,info".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging-api.example.com".to_string(),
                request_timeout_secs: 15,
                bearer_token: None,
            },
            routes: RouteConfig::default(),
            logging: LoggingConfig {
                default_filter: "info".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.example.com".to_string(),
                request_timeout_secs: 10,
                bearer_token: None,
            },
            routes: RouteConfig::default(),
            logging: LoggingConfig {
                default_filter: "warn".to_string(),
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

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
