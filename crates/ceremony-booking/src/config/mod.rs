use chrono::NaiveDate;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the booking service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let reminder_interval_secs = env::var("APP_REMINDER_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidReminderInterval)?;

        let facility_address = env::var("APP_FACILITY_ADDRESS")
            .unwrap_or_else(|_| BookingConfig::DEFAULT_FACILITY_ADDRESS.to_string());

        let report_epoch = match env::var("APP_REPORT_EPOCH") {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|source| ConfigError::InvalidReportEpoch { value: raw, source })?,
            Err(_) => BookingConfig::default_report_epoch(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            booking: BookingConfig {
                reminder_interval: Duration::from_secs(reminder_interval_secs),
                facility_address,
                report_epoch,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Facility-level settings for the booking workflows.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// How often the reminder sweep runs.
    pub reminder_interval: Duration,
    /// Address quoted in reminder notifications.
    pub facility_address: String,
    /// Default lower bound of appointment reports.
    pub report_epoch: NaiveDate,
}

impl BookingConfig {
    pub const DEFAULT_FACILITY_ADDRESS: &'static str = "Mangilik el STREET, 65";

    pub fn default_report_epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            reminder_interval: Duration::from_secs(3600),
            facility_address: Self::DEFAULT_FACILITY_ADDRESS.to_string(),
            report_epoch: Self::default_report_epoch(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidReminderInterval,
    InvalidReportEpoch {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidReminderInterval => {
                write!(f, "APP_REMINDER_INTERVAL_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidReportEpoch { value, .. } => {
                write!(f, "APP_REPORT_EPOCH '{value}' must be a YYYY-MM-DD date")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidReminderInterval => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidReportEpoch { source, .. } => Some(source),
        }
    }
}
