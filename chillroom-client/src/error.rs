use chillroom_core::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport is not open (state: {0})")]
    NotOpen(&'static str),

    #[error("transport is already {0}")]
    AlreadyStarted(&'static str),

    #[error("message content is empty")]
    EmptyMessage,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error(transparent)]
    Model(ModelError),

    #[error("media sink error: {0}")]
    Sink(String),

    #[error("server rejected request with HTTP {0}")]
    HttpStatus(u16),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed answer: {0}")]
    MalformedAnswer(String),

    #[error("invalid negotiation step: {step} while {state}")]
    InvalidTransition {
        step: &'static str,
        state: &'static str,
    },

    #[error("peer connection has no local description")]
    NoLocalDescription,

    #[error("peer connection error: {0}")]
    Peer(#[from] webrtc::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("session has shut down")]
    SessionClosed,
}

impl From<ModelError> for ClientError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::EmptyContent => ClientError::EmptyMessage,
            other => ClientError::Model(other),
        }
    }
}
