#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("API key is missing. Set the {env} environment variable.")]
    MissingApiKey { env: String },

    #[error("invalid endpoint: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GeminiError {
    /// True when retrying with the same credentials and endpoint cannot
    /// succeed, so any conversation built on them should be discarded.
    pub fn is_session_fatal(&self) -> bool {
        match self {
            GeminiError::MissingApiKey { .. } | GeminiError::InvalidUrl(_) => true,
            GeminiError::Status { status, .. } => matches!(status, 400 | 401 | 403 | 404),
            GeminiError::Transport(_) | GeminiError::Decode(_) => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GeminiError::Transport(err) if err.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_config_errors_are_session_fatal() {
        let missing = GeminiError::MissingApiKey {
            env: "API_KEY".to_string(),
        };
        assert!(missing.is_session_fatal());
        assert!(missing.to_string().contains("API_KEY"));
        for status in [400u16, 401, 403, 404] {
            let err = GeminiError::Status {
                status,
                body: String::new(),
            };
            assert!(err.is_session_fatal(), "status {status}");
        }
    }

    #[test]
    fn transient_errors_keep_the_session() {
        for status in [429u16, 500, 503] {
            let err = GeminiError::Status {
                status,
                body: "busy".to_string(),
            };
            assert!(!err.is_session_fatal(), "status {status}");
        }
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!GeminiError::from(decode).is_session_fatal());
    }

    #[test]
    fn gateway_timeout_status_is_not_a_transport_timeout() {
        let err = GeminiError::Status {
            status: 504,
            body: String::new(),
        };
        assert!(!err.is_timeout());
        assert!(!err.is_session_fatal());
    }
}
