use thiserror::Error;

/// Application error, carrying everything `main` needs to report a failure.
///
/// Exit-code mapping: `Config` and `Io` mean the local environment needs fixing
/// (exit 2); the upstream variants mean a remote API misbehaved (exit 4);
/// `Sources` reports a partially failed combined run (exit 1).
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Missing or invalid process configuration (environment variables, flags).
    #[error("{0}")]
    Config(String),

    /// Local filesystem failure while reading or writing a snapshot.
    #[error("{0}")]
    Io(String),

    /// Transport-level failure talking to an upstream API.
    #[error("{0}")]
    Network(String),

    /// Upstream answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { status: u16, url: String },

    /// Upstream payload did not match its documented shape.
    #[error("{0}")]
    UpstreamFormat(String),

    /// A fetched record failed validation (e.g. an unparseable date).
    #[error("{0}")]
    MalformedInput(String),

    /// One or more sources failed during a combined run.
    #[error("{failed} of {total} sources failed")]
    Sources { failed: usize, total: usize },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Io(_) => 2,
            AppError::Network(_)
            | AppError::HttpStatus { .. }
            | AppError::UpstreamFormat(_)
            | AppError::MalformedInput(_) => 4,
            AppError::Sources { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_io_errors_exit_with_2() {
        assert_eq!(AppError::Config("STEAM_ID must be set".into()).exit_code(), 2);
        assert_eq!(AppError::Io("no such file".into()).exit_code(), 2);
    }

    #[test]
    fn upstream_errors_exit_with_4() {
        let status = AppError::HttpStatus {
            status: 503,
            url: "https://api.example.com".into(),
        };
        assert_eq!(status.exit_code(), 4);
        assert_eq!(AppError::Network("timed out".into()).exit_code(), 4);
        assert_eq!(AppError::UpstreamFormat("missing field".into()).exit_code(), 4);
        assert_eq!(AppError::MalformedInput("bad date".into()).exit_code(), 4);
    }

    #[test]
    fn partial_failure_exits_with_1() {
        let err = AppError::Sources { failed: 2, total: 5 };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "2 of 5 sources failed");
    }

    #[test]
    fn http_status_display_names_the_url() {
        let err = AppError::HttpStatus {
            status: 401,
            url: "https://api.github.com/users/x/repos".into(),
        };
        assert_eq!(
            err.to_string(),
            "https://api.github.com/users/x/repos returned HTTP 401"
        );
    }
}
