#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Service,
    Protocol,
}

/// Failure of one call to the prediction or history service. Never retried
/// by the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach service: {message}")]
    Network { message: String },
    #[error("service rejected the request (HTTP {status}): {message}")]
    Service { status: u16, message: String },
    #[error("unexpected response from service: {message}")]
    Protocol { message: String },
}

pub type PredictionError = ApiError;
pub type DashboardError = ApiError;

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Network { .. } => ApiErrorKind::Network,
            ApiError::Service { .. } => ApiErrorKind::Service,
            ApiError::Protocol { .. } => ApiErrorKind::Protocol,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn network(err: reqwest::Error) -> Self {
        ApiError::Network {
            message: format!("{:#}", anyhow::Error::from(err)),
        }
    }

    pub(crate) fn protocol(err: anyhow::Error) -> Self {
        ApiError::Protocol {
            message: format!("{err:#}"),
        }
    }
}
