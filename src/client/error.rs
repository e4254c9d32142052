use thiserror::Error;

/// Errors surfaced by [`super::ApiClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response, decoded from the server's error envelope
    #[error("API error ({status}) {error}: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    /// The access token was rejected and could not be refreshed
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: 409,
            error: "CONFLICT".to_string(),
            message: "Category 'Food' already exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (409) CONFLICT: Category 'Food' already exists"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found() {
        let err = ClientError::Api {
            status: 404,
            error: "NOT_FOUND".to_string(),
            message: "gone".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(ClientError::SessionExpired.status(), None);
    }
}
