use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage quota exceeded: {0}")]
    StorageQuotaExceeded(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Error taxonomy shared with callers that present messages to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StorageError,
    StorageQuotaExceeded,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    DuplicateError,
    InternalError,
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::StorageQuotaExceeded => "STORAGE_QUOTA_EXCEEDED",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DuplicateError => "DUPLICATE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Message suitable for showing to a site visitor.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCode::StorageError => "데이터 저장에 실패했습니다.",
            ErrorCode::StorageQuotaExceeded => "저장 공간이 부족합니다.",
            ErrorCode::ValidationError => "입력 정보를 확인해주세요.",
            ErrorCode::NotFound => "요청한 정보를 찾을 수 없습니다.",
            ErrorCode::Unauthorized => "로그인이 필요합니다.",
            ErrorCode::Forbidden => "접근 권한이 없습니다.",
            ErrorCode::DuplicateError => "이미 존재하는 정보입니다.",
            ErrorCode::InternalError => "서버 오류가 발생했습니다.",
            ErrorCode::UnknownError => "알 수 없는 오류가 발생했습니다.",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured form of an error, handed to whoever decides what to show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Storage(_) => ErrorCode::StorageError,
            AppError::StorageQuotaExceeded(_) => ErrorCode::StorageQuotaExceeded,
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::Forbidden => ErrorCode::Forbidden,
            AppError::Conflict(_) => ErrorCode::DuplicateError,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Unknown(_) => ErrorCode::UnknownError,
        }
    }

    pub fn report(&self) -> ErrorReport {
        let message = match self {
            AppError::Storage(msg)
            | AppError::StorageQuotaExceeded(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Internal(msg) | AppError::Unknown(msg) => {
                tracing::error!(code = %self.code(), "{}", msg);
                self.code().user_message().to_string()
            }
            AppError::Unauthorized | AppError::Forbidden => self.code().user_message().to_string(),
        };

        ErrorReport {
            code: self.code(),
            message,
            timestamp: Utc::now(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("Serialization failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::StorageQuotaExceeded).unwrap();
        assert_eq!(json, "\"STORAGE_QUOTA_EXCEEDED\"");
        assert_eq!(AppError::Conflict("x".into()).code().as_str(), "DUPLICATE_ERROR");
    }

    #[test]
    fn test_report_hides_internal_detail() {
        let report = AppError::Internal("lock poisoned".into()).report();
        assert_eq!(report.code, ErrorCode::InternalError);
        assert_eq!(report.message, "서버 오류가 발생했습니다.");

        let report = AppError::NotFound("Notice not found".into()).report();
        assert_eq!(report.message, "Notice not found");
    }
}
