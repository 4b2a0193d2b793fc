use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::ceremony::appointments::LifecycleError;
use crate::workflows::ceremony::calendar::CalendarError;
use crate::workflows::ceremony::directory::DirectoryError;
use crate::workflows::ceremony::notifications::DeliveryError;
use crate::workflows::ceremony::report::ReportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Caller-visible classification of booking failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    IllegalStateTransition,
    Unavailable,
    /// Startup and host failures (configuration, telemetry, io).
    Internal,
}

impl ErrorKind {
    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvalidInput | ErrorKind::IllegalStateTransition => StatusCode::BAD_REQUEST,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(crate) fn error_response(kind: ErrorKind, message: String) -> Response {
    let body = Json(json!({ "error": message }));
    (kind.status_code(), body).into_response()
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Lifecycle(LifecycleError),
    Calendar(CalendarError),
    Report(ReportError),
    Directory(DirectoryError),
    Notification(DeliveryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Lifecycle(err) => write!(f, "appointment error: {}", err),
            AppError::Calendar(err) => write!(f, "calendar error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::Directory(err) => write!(f, "directory error: {}", err),
            AppError::Notification(err) => write!(f, "notification error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Lifecycle(err) => Some(err),
            AppError::Calendar(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Directory(err) => Some(err),
            AppError::Notification(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Lifecycle(err) => err.kind(),
            AppError::Calendar(err) => err.kind(),
            AppError::Report(err) => err.kind(),
            AppError::Directory(err) => err.kind(),
            AppError::Notification(err) => err.kind(),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_response(self.kind(), self.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<LifecycleError> for AppError {
    fn from(value: LifecycleError) -> Self {
        Self::Lifecycle(value)
    }
}

impl From<CalendarError> for AppError {
    fn from(value: CalendarError) -> Self {
        Self::Calendar(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<DirectoryError> for AppError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

impl From<DeliveryError> for AppError {
    fn from(value: DeliveryError) -> Self {
        Self::Notification(value)
    }
}
