/// Errors raised by the trials workflows.
///
/// The variants fall into four groups: configuration (a page element or setting is missing, or a
/// browser call failed), application (the backend answered with a non-success status), transport
/// (the request or its decoding failed) and local lookup (a trial id is not in the current
/// result set).
#[derive(Debug, thiserror::Error)]
pub enum TrialsError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("page element not found: {0}")]
    MissingElement(String),
    #[error("browser call failed: {0}")]
    Browser(String),

    #[error("{0}")]
    Backend(String),

    #[error("HTTP error! Status: {0}")]
    HttpStatus(u16),
    #[error("{0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("trial not found: {0}")]
    TrialNotFound(String),
    #[error("no trial selected")]
    NoActiveTrial,
}

impl TrialsError {
    /// True for failures of the request itself rather than of the backend's answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            TrialsError::HttpStatus(_) | TrialsError::Network(_) | TrialsError::Decode(_)
        )
    }

    /// True for errors caused by page or settings wiring.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TrialsError::InvalidConfig(_)
                | TrialsError::MissingElement(_)
                | TrialsError::Browser(_)
        )
    }
}

pub type TrialsResult<T> = std::result::Result<T, TrialsError>;
