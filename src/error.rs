use thiserror::Error;

/// Failure of a single outbound HTTP GET.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Why one album ended up with the placeholder instead of its cover.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoverFetchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to decode cover from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("fetching cover from {url} timed out")]
    Timeout { url: String },

    #[error("cover task for album #{index} did not complete: {reason}")]
    Task { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a usable TrueType/OpenType font")]
    Invalid { path: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum CollageError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("Last.fm is unavailable: {0}")]
    UpstreamUnavailable(#[source] FetchError),

    #[error("Last.fm rejected the request (error {code}): {message}")]
    UpstreamRejected { code: i64, message: String },

    #[error("Last.fm returned a malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("cover for album #{index} could not be fetched: {source}")]
    CoverFetchFailure {
        index: usize,
        #[source]
        source: CoverFetchError,
    },

    #[error("result stream closed after {received} of {expected} covers")]
    IncompleteResults { expected: usize, received: usize },

    #[error("failed to encode collage: {0}")]
    Encode(#[from] image::ImageError),

    #[error("collage encoding task did not complete: {0}")]
    EncodeTask(String),
}

impl CollageError {
    /// Errors caused by Last.fm rather than by us or the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CollageError::UpstreamUnavailable(_)
                | CollageError::UpstreamRejected { .. }
                | CollageError::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        let unavailable = CollageError::UpstreamUnavailable(FetchError::Status {
            url: "http://lastfm".to_string(),
            status: 503,
        });
        assert!(unavailable.is_upstream());

        let rejected = CollageError::UpstreamRejected {
            code: 6,
            message: "User not found".to_string(),
        };
        assert!(rejected.is_upstream());

        assert!(!CollageError::InvalidRequest("grid".to_string()).is_upstream());
        assert!(!CollageError::IncompleteResults {
            expected: 4,
            received: 2
        }
        .is_upstream());
    }

    #[test]
    fn test_cover_error_message_names_url() {
        let err = CoverFetchError::from(FetchError::Status {
            url: "http://img/cover.png".to_string(),
            status: 404,
        });
        assert_eq!(
            err.to_string(),
            "request to http://img/cover.png returned status 404"
        );
    }
}
