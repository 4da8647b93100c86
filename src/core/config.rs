use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// Present only when the Postgres store backend is selected
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub classifier: ClassifierConfig,
    pub moderation: ModerationConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Bearer token validation settings (HS256 tokens minted by the platform identity service)
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// External classifier gateway configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// TensorZero gateway URL. When unset the classifier is disabled and
    /// every submission takes the fallback path.
    pub tensorzero_url: Option<String>,
    pub api_key: String,
    pub model_name: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Total attempts per call (2 = one retry on transient failure)
    pub max_attempts: u32,
}

/// Where moderation state is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// What video/audio submissions become when the classifier is unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailClosedMode {
    /// Escalate to the human review queue
    Review,
    /// Reject outright
    Reject,
}

#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub store_backend: StoreBackend,
    /// Apply fail-closed handling to text and image as well
    pub fail_closed_all: bool,
    pub fail_closed_mode: FailClosedMode,
    pub notification_buffer: usize,
    pub default_locale: String,
    /// Optional directory overriding the built-in prompt templates
    pub prompt_template_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let moderation = ModerationConfig::from_env()?;
        let database = match moderation.store_backend {
            StoreBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        Ok(Config {
            app: AppConfig::from_env()?,
            database,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            classifier: ClassifierConfig::from_env()?,
            moderation,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB, payloads are text or URLs

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable is required".to_string())?;

        let issuer = env::var("JWT_ISSUER")
            .map_err(|_| "JWT_ISSUER environment variable is required".to_string())?;

        let audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| "content-trust".to_string());

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            jwt_secret,
            issuer,
            audience,
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Content Trust API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Content moderation and human review API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl ClassifierConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 20;
    const DEFAULT_MAX_ATTEMPTS: u32 = 2;

    pub fn from_env() -> Result<Self, String> {
        let tensorzero_url = env::var("TENSORZERO_URL").ok().filter(|s| !s.is_empty());

        let api_key = env::var("CLASSIFIER_API_KEY").unwrap_or_default();

        let model_name =
            env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| "openai::gpt-4o-mini".to_string());

        let timeout_secs = env::var("CLASSIFIER_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "CLASSIFIER_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_attempts = env::var("CLASSIFIER_MAX_ATTEMPTS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_ATTEMPTS.to_string())
            .parse::<u32>()
            .map_err(|_| "CLASSIFIER_MAX_ATTEMPTS must be a valid number".to_string())?
            .max(1);

        Ok(Self {
            tensorzero_url,
            api_key,
            model_name,
            timeout: Duration::from_secs(timeout_secs),
            max_attempts,
        })
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Postgres,
            fail_closed_all: false,
            fail_closed_mode: FailClosedMode::Review,
            notification_buffer: ModerationConfig::DEFAULT_NOTIFICATION_BUFFER,
            default_locale: "en".to_string(),
            prompt_template_dir: None,
        }
    }
}

impl ModerationConfig {
    const DEFAULT_NOTIFICATION_BUFFER: usize = 256;

    pub fn from_env() -> Result<Self, String> {
        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(format!(
                    "STORE_BACKEND must be 'postgres' or 'memory', got '{}'",
                    other
                ))
            }
        };

        let fail_closed_all = env::var("FAIL_CLOSED_ALL")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|_| "FAIL_CLOSED_ALL must be true or false".to_string())?;

        let fail_closed_mode = match env::var("FAIL_CLOSED_MODE")
            .unwrap_or_else(|_| "review".to_string())
            .to_lowercase()
            .as_str()
        {
            "review" => FailClosedMode::Review,
            "reject" => FailClosedMode::Reject,
            other => {
                return Err(format!(
                    "FAIL_CLOSED_MODE must be 'review' or 'reject', got '{}'",
                    other
                ))
            }
        };

        let notification_buffer = env::var("NOTIFICATION_BUFFER")
            .unwrap_or_else(|_| Self::DEFAULT_NOTIFICATION_BUFFER.to_string())
            .parse::<usize>()
            .map_err(|_| "NOTIFICATION_BUFFER must be a valid number".to_string())?
            .max(1);

        let default_locale = env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string());

        let prompt_template_dir = env::var("PROMPT_TEMPLATE_DIR")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            store_backend,
            fail_closed_all,
            fail_closed_mode,
            notification_buffer,
            default_locale,
            prompt_template_dir,
        })
    }
}
