use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::Duration;

/// Deployment stage the process runs in, read from `APP_ENV`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "ci" | "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Everything the binary needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub uploads: Option<UploadSignerConfig>,
    pub admin_seed: Option<AdminSeedConfig>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(&env::var("APP_ENV").unwrap_or_default());

        let server = ServerConfig {
            host: env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: match env::var("APP_PORT") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort)?,
                Err(_) => 3000,
            },
        };

        let telemetry = TelemetryConfig {
            log_level: env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let session_secret = match optional_env("SESSION_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                return Err(ConfigError::MissingSessionSecret)
            }
            None => "hiredesk-development-secret".to_string(),
        };
        let session_ttl_minutes = env::var("SESSION_TTL_MINUTES")
            .unwrap_or_else(|_| "480".to_string())
            .parse::<i64>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or(ConfigError::InvalidSessionTtl)?;

        let uploads = match (
            optional_env("UPLOAD_CLOUD_NAME"),
            optional_env("UPLOAD_API_KEY"),
            optional_env("UPLOAD_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(UploadSignerConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            (None, None, None) => None,
            _ => return Err(ConfigError::IncompleteUploadSigner),
        };

        let admin_seed = match (optional_env("ADMIN_EMAIL"), optional_env("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeedConfig {
                email,
                password,
                display_name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteAdminSeed),
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            auth: AuthConfig {
                session_secret,
                session_ttl_minutes,
            },
            uploads,
            admin_seed,
        })
    }
}

/// An unset or empty variable reads as absent.
fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// HTTP listener binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `localhost` is accepted as an alias for the loopback address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filtering handed to the tracing subscriber.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Console session settings. The signing secret stays server-side;
/// production refuses to start without an operator-provided one.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::minutes(self.session_ttl_minutes)
    }
}

/// Credentials for countersigning direct browser uploads. All three values
/// come from the environment together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSignerConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Bootstrap admin account registered into the identity directory at
/// startup.
#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingSessionSecret,
    InvalidSessionTtl,
    IncompleteUploadSigner,
    IncompleteAdminSeed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT is not a valid port number"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST is neither an IP address nor localhost")
            }
            ConfigError::MissingSessionSecret => {
                write!(f, "SESSION_SECRET is required when APP_ENV is production")
            }
            ConfigError::InvalidSessionTtl => {
                write!(f, "SESSION_TTL_MINUTES must be a positive number of minutes")
            }
            ConfigError::IncompleteUploadSigner => write!(
                f,
                "UPLOAD_CLOUD_NAME, UPLOAD_API_KEY, and UPLOAD_API_SECRET must be set together"
            ),
            ConfigError::IncompleteAdminSeed => {
                write!(f, "ADMIN_EMAIL and ADMIN_PASSWORD must be set together")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
