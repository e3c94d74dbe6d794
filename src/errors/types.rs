//! Error type definitions for f1tv-dl

use thiserror::Error;

use crate::models::TransportFamily;

/// Top-level error type for the resolution chain and the transcode step
#[derive(Error, Debug)]
pub enum AppError {
    /// The string is not a well-formed F1TV video detail URL
    #[error("Invalid F1TV URL: {url}")]
    InvalidUrl { url: String },

    /// Missing or rejected entitlement token
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Network failure or non-2xx response from an F1TV endpoint
    #[error("Upstream error: {service}{} - {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream {
        service: String,
        status: Option<u16>,
        message: String,
    },

    /// Lookup returned nothing usable
    #[error("Not found: {resource} '{id}'")]
    NotFound { resource: String, id: String },

    /// A parsed manifest has no rendition matching the request
    #[error("No matching rendition: {message}")]
    RenditionNotFound { message: String },

    /// Manifest body does not conform to its family's grammar
    #[error("Parse error: {family} manifest - {message}")]
    Parse {
        family: TransportFamily,
        message: String,
    },

    /// Invalid configuration or argument values
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The external transcoder could not be run or failed
    #[error("Process error: {message}")]
    Process { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn invalid_url<S: Into<String>>(url: S) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an upstream error for a named service, with the HTTP status if one was received
    pub fn upstream<S: Into<String>, M: Into<String>>(
        service: S,
        status: Option<u16>,
        message: M,
    ) -> Self {
        Self::Upstream {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn rendition_not_found<S: Into<String>>(message: S) -> Self {
        Self::RenditionNotFound {
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(family: TransportFamily, message: S) -> Self {
        Self::Parse {
            family,
            message: message.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn process<S: Into<String>>(message: S) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    /// Whether this failure looks like a rejected or expired entitlement token
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Auth { .. } => true,
            Self::Upstream {
                status, message, ..
            } => {
                matches!(status, Some(401) | Some(403))
                    || message.to_lowercase().contains("unauthorized")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_includes_status() {
        let err = AppError::upstream("playback", Some(401), "Unauthorized");
        assert_eq!(err.to_string(), "Upstream error: playback (401) - Unauthorized");

        let err = AppError::upstream("catalog", None, "connection refused");
        assert_eq!(err.to_string(), "Upstream error: catalog - connection refused");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(AppError::auth("missing token").is_unauthorized());
        assert!(AppError::upstream("playback", Some(401), "denied").is_unauthorized());
        assert!(AppError::upstream("playback", Some(403), "denied").is_unauthorized());
        assert!(AppError::upstream("playback", None, "Unauthorized request").is_unauthorized());
        assert!(!AppError::upstream("catalog", Some(500), "boom").is_unauthorized());
        assert!(!AppError::not_found("content", "123").is_unauthorized());
    }

    #[test]
    fn test_parse_error_names_family() {
        let err = AppError::parse(TransportFamily::ManifestDescription, "unexpected EOF");
        assert_eq!(
            err.to_string(),
            "Parse error: manifest-description manifest - unexpected EOF"
        );
    }
}
