//! Error taxonomy for report queries.
//!
//! Errors fall into four families:
//! - credential errors (missing locally, or rejected by the server)
//! - query errors (bad builder input, or a server-reported query error)
//! - format errors (unknown output format name, always local)
//! - HTTP status errors (one variant per mapped 4xx/5xx status)

use thiserror::Error;

const INVALID_CREDENTIALS: &str = "API key is invalid. Please provide a valid key.";
const INVALID_QUERY: &str = "Likely a badly formatted or missing parameter";

/// Report client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key was supplied; detected before any network call.
    #[error("No API key provided. Please provide a valid key.")]
    MissingCredentials,
    /// The server rejected the API key.
    #[error("{message}")]
    InvalidCredentials { message: String },
    /// A query parameter was malformed or missing.
    #[error("{message}")]
    InvalidQuery { message: String },
    /// The requested output format is not registered.
    #[error("invalid format: {name}. Please see docs for allowed formats.")]
    InvalidFormat { name: String },
    /// A builder argument violated its contract.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: &'static str,
    },

    #[error("bad request (400)")]
    BadRequest,
    #[error("unauthorized (401)")]
    Unauthorized,
    #[error("forbidden (403)")]
    Forbidden,
    #[error("not found (404)")]
    NotFound,
    #[error("not acceptable (406)")]
    NotAcceptable,
    #[error("unprocessable entity (422)")]
    UnprocessableEntity,
    #[error("too many requests (429)")]
    TooManyRequests,
    #[error("internal server error (500)")]
    InternalServerError,
    #[error("not implemented (501)")]
    NotImplemented,
    #[error("bad gateway (502)")]
    BadGateway,
    #[error("service unavailable (503)")]
    ServiceUnavailable,
    #[error("gateway timeout (504)")]
    GatewayTimeout,

    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The HTTP request itself failed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body could not be read as a report.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Builds an `InvalidCredentials` error with the default message.
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials {
            message: INVALID_CREDENTIALS.to_string(),
        }
    }

    /// Builds an `InvalidQuery` error with the default message.
    pub fn invalid_query() -> Self {
        Self::InvalidQuery {
            message: INVALID_QUERY.to_string(),
        }
    }

    /// Builds an `InvalidQuery` error with a specific message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Maps an HTTP status code to its error, if the status is a mapped failure.
    pub fn from_status(status: u16) -> Option<Self> {
        let error = match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            406 => Self::NotAcceptable,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            501 => Self::NotImplemented,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            _ => return None,
        };
        Some(error)
    }

    /// The HTTP status this error corresponds to.
    ///
    /// Credential errors report 401 and query errors 400, matching the
    /// status family the server would use for them.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest | Self::InvalidQuery { .. } => Some(400),
            Self::Unauthorized | Self::MissingCredentials | Self::InvalidCredentials { .. } => {
                Some(401)
            }
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::NotAcceptable => Some(406),
            Self::UnprocessableEntity => Some(422),
            Self::TooManyRequests => Some(429),
            Self::InternalServerError => Some(500),
            Self::NotImplemented => Some(501),
            Self::BadGateway => Some(502),
            Self::ServiceUnavailable => Some(503),
            Self::GatewayTimeout => Some(504),
            Self::InvalidFormat { .. }
            | Self::InvalidArgument { .. }
            | Self::ClientBuild(_)
            | Self::Transport(_)
            | Self::InvalidResponse(_) => None,
        }
    }

    /// True for 4xx-family errors, including credential and query errors.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|status| (400..500).contains(&status))
    }

    /// True for 5xx-family errors.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|status| status >= 500)
    }

    /// True when the caller needs to fix the API key.
    pub const fn is_credentials_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials | Self::InvalidCredentials { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    const MAPPED: [u16; 12] = [400, 401, 403, 404, 406, 422, 429, 500, 501, 502, 503, 504];

    #[test]
    fn every_mapped_status_roundtrips() {
        for status in MAPPED {
            let error = Error::from_status(status).expect("status should be mapped");
            assert_eq!(error.status(), Some(status), "mismatch for {status}");
        }
    }

    #[test]
    fn success_and_unmapped_statuses_have_no_error() {
        for status in [200, 201, 204, 301, 402, 418, 505] {
            assert!(Error::from_status(status).is_none(), "{status} mapped");
        }
    }

    #[test]
    fn status_families_classify() {
        assert!(Error::NotFound.is_client_error());
        assert!(!Error::NotFound.is_server_error());
        assert!(Error::ServiceUnavailable.is_server_error());
        assert!(Error::MissingCredentials.is_client_error());
        assert!(Error::invalid_query().is_client_error());
        assert!(!Error::InvalidFormat { name: "x".into() }.is_client_error());
    }

    #[test]
    fn credential_errors_are_distinguishable() {
        assert!(Error::MissingCredentials.is_credentials_error());
        assert!(Error::invalid_credentials().is_credentials_error());
        assert!(!Error::Unauthorized.is_credentials_error());
        assert!(!Error::invalid_query().is_credentials_error());
    }

    #[test]
    fn default_messages_are_human_readable() {
        assert_eq!(
            Error::MissingCredentials.to_string(),
            "No API key provided. Please provide a valid key."
        );
        assert_eq!(
            Error::invalid_query().to_string(),
            "Likely a badly formatted or missing parameter"
        );
        assert_eq!(
            Error::InvalidFormat {
                name: "pdf".into()
            }
            .to_string(),
            "invalid format: pdf. Please see docs for allowed formats."
        );
    }

    #[test]
    fn status_messages() {
        let messages: Vec<String> = MAPPED
            .iter()
            .filter_map(|status| Error::from_status(*status))
            .map(|error| error.to_string())
            .collect();
        assert_snapshot!(messages.join("\n"), @r"
        bad request (400)
        unauthorized (401)
        forbidden (403)
        not found (404)
        not acceptable (406)
        unprocessable entity (422)
        too many requests (429)
        internal server error (500)
        not implemented (501)
        bad gateway (502)
        service unavailable (503)
        gateway timeout (504)
        ");
    }
}
