#[derive(Debug, thiserror::Error)]
pub enum KioskError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("queue-assigner unreachable: {0}")]
    Upstream(String),
    #[error("queue-assigner timed out: {0}")]
    UpstreamTimeout(String),
    #[error("queue-assigner returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },
    #[error("unexpected queue-assigner response: {0}")]
    UpstreamDecode(String),

    #[error("name store error: {0}")]
    Store(#[from] sled::Error),
    #[error("failed to encode name record: {0}")]
    StoreEncode(serde_json::Error),
    #[error("failed to decode name record: {0}")]
    StoreDecode(serde_json::Error),

    #[error("patient {0} not found in queue")]
    PatientNotFound(String),
    #[error("no patients in queue")]
    QueueEmpty,
    #[error("patient id {0} is already bound to a name")]
    DuplicatePatientId(String),
}

impl KioskError {
    /// Whether repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            KioskError::Upstream(_) | KioskError::UpstreamTimeout(_) => true,
            KioskError::UpstreamStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the failure lies in the local name store rather than the network.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            KioskError::Store(_) | KioskError::StoreEncode(_) | KioskError::StoreDecode(_)
        )
    }
}

impl From<reqwest::Error> for KioskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            KioskError::UpstreamTimeout(err.to_string())
        } else if err.is_decode() {
            KioskError::UpstreamDecode(err.to_string())
        } else {
            KioskError::Upstream(err.to_string())
        }
    }
}

pub type KioskResult<T> = std::result::Result<T, KioskError>;
