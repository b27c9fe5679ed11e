use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ConfigError;
use crate::storage::gcs::ServiceAccountKey;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    pub scratch_dir: PathBuf,
    pub fetch: FetchConfig,
    pub storage: GcsConfig,
    pub mail: MailConfig,
    pub status_store: StatusStoreConfig,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub max_redirects: usize,
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_redirects: 1,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GcsConfig {
    pub project_id: String,
    pub bucket: String,
    pub credentials: ServiceAccountKey,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from: String,
    pub transport: MailTransport,
}

#[derive(Debug, Clone)]
pub enum MailTransport {
    Mailgun(MailgunConfig),
    Smtp(SmtpConfig),
}

#[derive(Debug, Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    pub domain: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusStoreConfig {
    DynamoDb { table: String },
    Postgres { database_url: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let host: IpAddr = env.parsed("RELAY_HOST", "0.0.0.0")?;
        let port: u16 = env.parsed("RELAY_PORT", "3000")?;
        let max_body_size: usize = env.parsed("RELAY_MAX_BODY_SIZE", "1048576")?;
        let log_level = env.or("RELAY_LOG_LEVEL", "info");
        let scratch_dir = PathBuf::from(env.or("RELAY_SCRATCH_DIR", "/tmp"));

        let fetch = FetchConfig {
            max_redirects: env.parsed("RELAY_FETCH_MAX_REDIRECTS", "1")?,
            timeout: match env.get("RELAY_FETCH_TIMEOUT_SECS") {
                Some(secs) => Some(Duration::from_secs(
                    secs.parse()
                        .map_err(|e| ConfigError::invalid("RELAY_FETCH_TIMEOUT_SECS", e))?,
                )),
                None => None,
            },
        };

        let storage = GcsConfig {
            project_id: env.required("GCP_PROJECT_ID")?,
            bucket: env.required("GCP_BUCKET_NAME")?,
            credentials: decode_service_account(&env.required("GCP_SERVICE_ACCOUNT_KEY")?)?,
            api_base: env.or("GCP_STORAGE_API_BASE", "https://storage.googleapis.com"),
        };

        let transport = match env.or("RELAY_MAIL_TRANSPORT", "mailgun").as_str() {
            "mailgun" => MailTransport::Mailgun(MailgunConfig {
                api_key: env.required("MAILGUN_API")?,
                domain: env.required("MAILGUN_DOMAIN")?,
                api_base: env.or("MAILGUN_API_BASE", "https://api.mailgun.net"),
            }),
            "smtp" => MailTransport::Smtp(SmtpConfig {
                host: env.required("RELAY_SMTP_HOST")?,
                port: env.required("RELAY_SMTP_PORT")?.parse().map_err(|e| {
                    ConfigError::invalid("RELAY_SMTP_PORT", e)
                })?,
                user: env.required("RELAY_SMTP_USER")?,
                pass: env.required("RELAY_SMTP_PASS")?,
            }),
            other => {
                return Err(ConfigError::invalid(
                    "RELAY_MAIL_TRANSPORT",
                    format!("unknown transport '{other}' (expected mailgun or smtp)"),
                ));
            }
        };
        let mail = MailConfig {
            from: env.required("RELAY_MAIL_FROM")?,
            transport,
        };

        let status_store = match env.or("RELAY_STATUS_STORE", "dynamodb").as_str() {
            "dynamodb" => StatusStoreConfig::DynamoDb {
                table: env.or("RELAY_STATUS_TABLE", "assignment-submissions"),
            },
            "postgres" => StatusStoreConfig::Postgres {
                database_url: env.required("DATABASE_URL")?,
            },
            other => {
                return Err(ConfigError::invalid(
                    "RELAY_STATUS_STORE",
                    format!("unknown store '{other}' (expected dynamodb or postgres)"),
                ));
            }
        };

        Ok(Config {
            host,
            port,
            max_body_size,
            log_level,
            scratch_dir,
            fetch,
            storage,
            mail,
            status_store,
        })
    }
}

/// Decode the base64-wrapped service-account JSON document.
pub fn decode_service_account(encoded: &str) -> Result<ServiceAccountKey, ConfigError> {
    let raw = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::invalid("GCP_SERVICE_ACCOUNT_KEY", e))?;
    serde_json::from_slice(&raw).map_err(|e| ConfigError::invalid("GCP_SERVICE_ACCOUNT_KEY", e))
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or(key, default)
            .parse()
            .map_err(|e| ConfigError::invalid(key, e))
    }
}
