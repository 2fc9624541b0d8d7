use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub caption: CaptionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Issues a single reporter may file per local calendar day.
    pub daily_report_limit: i64,
    pub max_upload_bytes: usize,
    pub uploads_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// Base URL of the external captioning inference API. The model name is
    /// appended as a path segment per attempt.
    pub endpoint: String,
    /// Bearer token for the captioning API, if the deployment requires one.
    pub api_token: Option<String>,
    /// Ordered fallback list; the first model returning 2xx wins.
    pub models: Vec<String>,
    pub attempt_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Environment-specific defaults first, specific env vars override.
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT_SECS") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_DAILY_REPORT_LIMIT") {
            self.api.daily_report_limit = v.parse().unwrap_or(self.api.daily_report_limit);
        }
        if let Ok(v) = env::var("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }
        if let Ok(v) = env::var("API_UPLOADS_DIR") {
            self.api.uploads_dir = v;
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Caption service overrides
        if let Ok(v) = env::var("CAPTION_API_ENDPOINT") {
            self.caption.endpoint = v;
        }
        if let Ok(v) = env::var("CAPTION_API_TOKEN") {
            if !v.is_empty() {
                self.caption.api_token = Some(v);
            }
        }
        if let Ok(v) = env::var("CAPTION_MODELS") {
            let models: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !models.is_empty() {
                self.caption.models = models;
            }
        }
        if let Ok(v) = env::var("CAPTION_ATTEMPT_TIMEOUT_SECS") {
            self.caption.attempt_timeout_secs =
                v.parse().unwrap_or(self.caption.attempt_timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            api: ApiConfig {
                daily_report_limit: 15,
                max_upload_bytes: 10 * 1024 * 1024, // 10MB
                uploads_dir: "uploads".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            caption: Self::default_caption(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            api: ApiConfig {
                daily_report_limit: 15,
                max_upload_bytes: 5 * 1024 * 1024, // 5MB
                uploads_dir: "uploads".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 1,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            caption: Self::default_caption(),
        }
    }

    fn default_caption() -> CaptionConfig {
        CaptionConfig {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            api_token: None,
            models: vec![
                "Salesforce/blip-image-captioning-large".to_string(),
                "Salesforce/blip-image-captioning-base".to_string(),
                "nlpconnect/vit-gpt2-image-captioning".to_string(),
            ],
            attempt_timeout_secs: 10,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
