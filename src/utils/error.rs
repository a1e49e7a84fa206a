use crate::core::decoder::DecodeError;
use crate::domain::model::GeoReportV2Error;
use thiserror::Error;

/// Failures raised by the transport collaborator.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum Open311Error {
    #[error("Could not build a request URL from endpoint '{endpoint}': {reason}")]
    UrlBuilder { endpoint: String, reason: String },

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("GeoReport v2 error {}: {}", .0.code, .0.description)]
    GeoReportV2(GeoReportV2Error),

    #[error("Could not parse {expected} response: {source}")]
    DataParsing {
        expected: &'static str,
        #[source]
        source: DecodeError,
        /// Why the same body was not a GeoReport v2 error envelope either.
        envelope: Option<DecodeError>,
    },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UrlBuilder,
    Transport,
    GeoReportV2,
    DataParsing,
    UnsupportedOperation,
    Configuration,
}

impl Open311Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UrlBuilder { .. } => ErrorKind::UrlBuilder,
            Self::Transport(_) => ErrorKind::Transport,
            Self::GeoReportV2(_) => ErrorKind::GeoReportV2,
            Self::DataParsing { .. } => ErrorKind::DataParsing,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::IoError(_)
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorKind::Configuration,
        }
    }

    /// Only network failures are worth retrying, with the caller's own policy.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// The protocol error reported by the server, if any.
    pub fn geo_report_error(&self) -> Option<&GeoReportV2Error> {
        match self {
            Self::GeoReportV2(error) => Some(error),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::UrlBuilder => "Check the endpoint URL in the configuration",
            ErrorKind::Transport => "Check network connectivity and retry",
            ErrorKind::GeoReportV2 => {
                "The server rejected the request; check the parameters, jurisdiction and API key"
            }
            ErrorKind::DataParsing => {
                "The server response was unexpected; check that the endpoint speaks the selected format"
            }
            ErrorKind::UnsupportedOperation => "This operation is not available in this client",
            ErrorKind::Configuration => "Fix the configuration file or command line arguments",
        }
    }
}

impl From<DecodeError> for Open311Error {
    fn from(error: DecodeError) -> Self {
        match error {
            DecodeError::Unsupported(operation) => Self::UnsupportedOperation(operation),
            other => Self::DataParsing {
                expected: "response",
                source: other,
                envelope: None,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Open311Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_decode_maps_to_unsupported_operation() {
        let error: Open311Error = DecodeError::Unsupported("service discovery").into();
        assert_eq!(error.kind(), ErrorKind::UnsupportedOperation);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_geo_report_error_display() {
        let error = Open311Error::GeoReportV2(GeoReportV2Error {
            code: 403,
            description: "Invalid api_key".to_string(),
        });
        assert_eq!(error.to_string(), "GeoReport v2 error 403: Invalid api_key");
        assert_eq!(error.geo_report_error().map(|e| e.code), Some(403));
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        let transport = Open311Error::Transport(TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(transport.is_retryable());

        let url = Open311Error::UrlBuilder {
            endpoint: "::".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(!url.is_retryable());
    }
}
