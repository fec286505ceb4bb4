mod fixed;
mod remote;

use crate::capture::Payload;
use crate::mood::ExpressionScores;
use futures::future::BoxFuture;

pub use fixed::FixedClassifier;
pub use remote::RemoteClassifier;

#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid classifier url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("http error {0}: {1}")]
    HttpStatus(u16, String),

    #[error("classifier service error: {0}")]
    Service(String),

    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),
}

impl ClassifierError {
    /// Whether a later attempt has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClassifierError::Http(e) => e.is_timeout() || e.is_connect(),
            ClassifierError::HttpStatus(status, _) => crate::util::is_http_retryable(*status),
            _ => false,
        }
    }
}

/// Produces raw expression scores for a captured payload. An empty result
/// means no face or voice was found.
pub trait Classifier: Send + Sync {
    fn classify(&self, payload: Payload) -> BoxFuture<'_, Result<ExpressionScores, ClassifierError>>;
}
