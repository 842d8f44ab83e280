use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("No organization selected")]
    EmptySelection,

    #[error("Invalid date range: start {start} is not before end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Invalid timestamp '{value}': expected YYYY-MM-DD HH:MM:SS.mmm")]
    TimestampError { value: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Input,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AuditError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AuditError::ApiError(_) | AuditError::HttpStatusError { .. } => ErrorCategory::Network,
            AuditError::AuthError { .. } => ErrorCategory::Authentication,
            AuditError::EmptySelection
            | AuditError::InvalidRange { .. }
            | AuditError::TimestampError { .. } => ErrorCategory::Input,
            AuditError::ConfigError { .. }
            | AuditError::MissingConfigError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            AuditError::CsvError(_) | AuditError::SerializationError(_) => ErrorCategory::Data,
            AuditError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Authentication | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 是否為單一請求層級的傳輸失敗（可依 WindowErrorPolicy 略過）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AuditError::ApiError(_) | AuditError::HttpStatusError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AuditError::ApiError(_) => "Check network connectivity and the API endpoint URLs",
            AuditError::HttpStatusError { .. } => {
                "The API rejected the request; verify the endpoint and retry later"
            }
            AuditError::AuthError { .. } => "Verify the API login (--login or [api].login)",
            AuditError::EmptySelection => "Select at least one organization by its list number",
            AuditError::InvalidRange { .. } => "Make sure --from is earlier than --to and not in the future",
            AuditError::TimestampError { .. } => "Use the format 'YYYY-MM-DD HH:MM:SS.mmm'",
            AuditError::CsvError(_) | AuditError::SerializationError(_) => {
                "Inspect the API response or the export data for malformed content"
            }
            AuditError::IoError(_) => "Check file permissions and available disk space",
            AuditError::ConfigError { .. }
            | AuditError::MissingConfigError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::ConfigValidationError { .. } => {
                "Review the command line flags and the TOML configuration file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AuditError::ApiError(e) => format!("Could not reach the order API: {}", e),
            AuditError::HttpStatusError { status, .. } => {
                format!("The order API answered with status {}", status)
            }
            AuditError::AuthError { .. } => "Could not obtain an access token".to_string(),
            AuditError::EmptySelection => "Nothing selected".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let status = AuditError::HttpStatusError {
            status: 502,
            url: "http://localhost/deliveries".to_string(),
        };
        assert!(status.is_transport());
        assert_eq!(status.category(), ErrorCategory::Network);

        let auth = AuditError::AuthError {
            message: "no token".to_string(),
        };
        assert!(!auth.is_transport());
        assert_eq!(auth.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_empty_selection_message() {
        let err = AuditError::EmptySelection;
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "Nothing selected");
    }
}
