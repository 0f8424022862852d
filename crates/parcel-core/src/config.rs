//! Configuration module
//!
//! Configuration is read once from the environment at startup and then split into
//! per-component structs. Each component receives only its own section through its
//! constructor, so tests can build components with substitute settings.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Read an environment variable, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_list(key: &str) -> Option<Vec<String>> {
    env_opt(key).map(|value| {
        value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub max_request_body_bytes: usize,
}

/// Database connection settings
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

/// Archive storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, Supabase, etc.)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Overrides the backend's own public URL scheme when set.
    pub public_base_url: Option<String>,
    /// Key prefix for archived source documents.
    pub archive_prefix: String,
}

/// Document fetcher settings
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_document_size_bytes: usize,
    /// Allow documents hosted on private, loopback or link-local addresses.
    pub allow_private_hosts: bool,
    /// If set, only these hosts (and their subdomains) may be fetched from.
    pub allowlist: Option<Vec<String>>,
}

/// Language model settings
#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    /// Extracted text longer than this is truncated before being sent.
    pub max_input_chars: usize,
    /// Re-ask once with a stricter schema reminder when the output is malformed.
    pub retry_on_malformed: bool,
}

/// Per-stage deadlines for one import
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub fetch_timeout: Duration,
    pub text_timeout: Duration,
    pub model_timeout: Duration,
    pub archive_timeout: Duration,
    pub persist_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(60),
            text_timeout: Duration::from_secs(60),
            model_timeout: Duration::from_secs(120),
            archive_timeout: Duration::from_secs(60),
            persist_timeout: Duration::from_secs(30),
        }
    }
}

/// Full application configuration.
#[derive(Clone, Debug)]
pub struct ParcelConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub fetch: FetchConfig,
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ParcelConfig>);

impl Config {
    fn inner(&self) -> &ParcelConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().server.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ParcelConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server(&self) -> &ServerConfig {
        &self.inner().server
    }

    pub fn database(&self) -> &DatabaseConfig {
        &self.inner().database
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.inner().storage
    }

    pub fn fetch(&self) -> &FetchConfig {
        &self.inner().fetch
    }

    pub fn model(&self) -> &ModelConfig {
        &self.inner().model
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.inner().pipeline
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server.port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().server.cors_origins
    }
}

impl ParcelConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_DOCUMENT_SIZE_MB: usize = 50;
        const FETCH_TIMEOUT_SECS: u64 = 60;
        const TEXT_TIMEOUT_SECS: u64 = 60;
        const MODEL_TIMEOUT_SECS: u64 = 120;
        const ARCHIVE_TIMEOUT_SECS: u64 = 60;
        const PERSIST_TIMEOUT_SECS: u64 = 30;
        const MODEL_MAX_INPUT_CHARS: usize = 200_000;
        const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
        const OPENAI_MODEL: &str = "gpt-4o";

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env_list("CORS_ORIGINS").unwrap_or_else(|| vec!["*".to_string()]);

        let server = ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            environment,
            cors_origins,
            max_request_body_bytes: env_or("MAX_REQUEST_BODY_BYTES", MAX_REQUEST_BODY_BYTES),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
        };

        let backend = match env_opt("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Local,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            public_base_url: env_opt("STORAGE_PUBLIC_BASE_URL"),
            archive_prefix: env_opt("ARCHIVE_PREFIX").unwrap_or_else(|| "documents".to_string()),
        };

        let fetch = FetchConfig {
            timeout: Duration::from_secs(env_or(
                "PIPELINE_FETCH_TIMEOUT_SECS",
                FETCH_TIMEOUT_SECS,
            )),
            max_document_size_bytes: env_or("MAX_DOCUMENT_SIZE_MB", MAX_DOCUMENT_SIZE_MB)
                * 1024
                * 1024,
            allow_private_hosts: env_or("ALLOW_PRIVATE_DOCUMENT_HOSTS", false),
            allowlist: env_list("DOCUMENT_URL_ALLOWLIST"),
        };

        let model_timeout = Duration::from_secs(env_or(
            "PIPELINE_MODEL_TIMEOUT_SECS",
            MODEL_TIMEOUT_SECS,
        ));

        let retry_on_malformed = env_or("EXTRACTION_RETRY_ENABLED", true);
        let model = ModelConfig {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: env_opt("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: env_opt("OPENAI_MODEL").unwrap_or_else(|| OPENAI_MODEL.to_string()),
            temperature: env_or("OPENAI_TEMPERATURE", 0.0),
            timeout: model_request_timeout(model_timeout, retry_on_malformed),
            max_input_chars: env_or("MODEL_MAX_INPUT_CHARS", MODEL_MAX_INPUT_CHARS),
            retry_on_malformed,
        };

        let pipeline = PipelineConfig {
            fetch_timeout: fetch.timeout,
            text_timeout: Duration::from_secs(env_or(
                "PIPELINE_TEXT_TIMEOUT_SECS",
                TEXT_TIMEOUT_SECS,
            )),
            model_timeout,
            archive_timeout: Duration::from_secs(env_or(
                "PIPELINE_ARCHIVE_TIMEOUT_SECS",
                ARCHIVE_TIMEOUT_SECS,
            )),
            persist_timeout: Duration::from_secs(env_or(
                "PIPELINE_PERSIST_TIMEOUT_SECS",
                PERSIST_TIMEOUT_SECS,
            )),
        };

        Ok(Self {
            server,
            database,
            storage,
            fetch,
            model,
            pipeline,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let environment = self.server.environment.to_lowercase();
        let is_production = environment == "production" || environment == "prod";
        if is_production && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !self.database.url.starts_with("postgres://")
            && !self.database.url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.model.api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("OPENAI_API_KEY must be set"));
        }

        if self.model.max_input_chars == 0 {
            return Err(anyhow::anyhow!("MODEL_MAX_INPUT_CHARS must be greater than 0"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        let prefix = &self.storage.archive_prefix;
        if prefix.is_empty() || prefix.contains("..") || prefix.starts_with('/') {
            return Err(anyhow::anyhow!(
                "ARCHIVE_PREFIX must be a relative path without '..'"
            ));
        }

        Ok(())
    }
}

/// Deadline for one model request. With the malformed-output retry enabled two requests
/// share the stage budget, so each gets half of it.
pub fn model_request_timeout(stage_timeout: Duration, retry_on_malformed: bool) -> Duration {
    if retry_on_malformed {
        stage_timeout / 2
    } else {
        stage_timeout
    }
}
