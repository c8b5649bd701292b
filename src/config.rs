use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub quota: QuotaConfig,
    pub llm: LlmConfig,
    pub security: SecurityConfig,
    /// Directory containing the college knowledge-base JSON files
    pub college_data_dir: String,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Question quota configuration
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Lifetime question cap for anonymous visitors
    pub anonymous_limit: u32,
    /// Questions per window for free accounts
    pub free_tier_limit: u32,
    /// Rolling window length, in days, after which a free account's counter resets
    pub reset_period_days: i64,
}

/// LLM provider configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
}

/// Security configuration for production deployments
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// True if server is behind a proxy that terminates SSL (nginx, Cloudflare, etc.)
    /// When true: cookie_secure=true is enabled
    pub ssl_proxy: bool,
    /// Session encryption key (64 hex chars). Required when ssl_proxy=true
    pub session_secret_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            quota: QuotaConfig::from_env(),
            llm: LlmConfig::from_env()?,
            security: SecurityConfig::from_env()?,
            college_data_dir: env::var("COLLEGE_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        })
    }
}

impl QuotaConfig {
    /// Load quota configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            anonymous_limit: env::var("ANONYMOUS_QUESTION_LIMIT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            free_tier_limit: env::var("FREE_TIER_QUESTIONS_LIMIT")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .unwrap_or(25),
            reset_period_days: env::var("QUESTIONS_RESET_PERIOD_DAYS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
        }
    }
}

impl LlmConfig {
    /// Load LLM provider configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("LLM_API_KEY").map_err(|_| ConfigError::MissingLlmApiKey)?;

        Ok(Self {
            api_url: env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key,
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            request_timeout: Duration::from_secs(
                env::var("LLM_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .unwrap_or(600),
            ),
        })
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            acquire_timeout: Duration::from_secs(
                env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            ),
            idle_timeout: Duration::from_secs(
                env::var("DATABASE_IDLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .unwrap_or(600),
            ),
            max_lifetime: Duration::from_secs(
                env::var("DATABASE_MAX_LIFETIME_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse()
                    .unwrap_or(1800),
            ),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
    MissingLlmApiKey,
    MissingSessionSecret,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL environment variable is required")
            }
            ConfigError::MissingLlmApiKey => {
                write!(f, "LLM_API_KEY environment variable is required")
            }
            ConfigError::MissingSessionSecret => {
                write!(
                    f,
                    "SESSION_SECRET_KEY is required when SSL_PROXY is enabled"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl SecurityConfig {
    /// Load security configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_secret_key = env::var("SESSION_SECRET_KEY").ok();

        let ssl_proxy = env::var("SSL_PROXY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        // When SSL_PROXY is enabled, SESSION_SECRET_KEY is required
        if ssl_proxy && session_secret_key.is_none() {
            return Err(ConfigError::MissingSessionSecret);
        }

        Ok(Self {
            ssl_proxy,
            session_secret_key,
        })
    }
}
