// RKSOK — Gateway error types
//
// Every per-request failure. None of them escape a connection task: the
// handler converts each into one of the three wire statuses.

use thiserror::Error;

use super::protocol::{ResponseStatus, Verb};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Connection closed or timed out before the frame terminator")]
    IncompleteFrame,

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Request name is empty")]
    EmptyName,

    #[error("Approval authority unreachable: {0}")]
    AuthorityUnreachable(String),

    #[error("Storage does not support {0:?}")]
    UnsupportedOperation(Verb),

    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl GatewayError {
    /// The wire status this failure is reported as.
    pub fn status(&self) -> ResponseStatus {
        match self {
            GatewayError::EmptyName => ResponseStatus::NotFound,
            GatewayError::IncompleteFrame
            | GatewayError::MalformedRequest(_)
            | GatewayError::AuthorityUnreachable(_)
            | GatewayError::UnsupportedOperation(_)
            | GatewayError::StorageFailure(_) => ResponseStatus::IncorrectRequest,
        }
    }
}

impl From<crate::store::StoreError> for GatewayError {
    fn from(e: crate::store::StoreError) -> Self {
        GatewayError::StorageFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_empty_name_maps_to_not_found() {
        assert_eq!(GatewayError::EmptyName.status(), ResponseStatus::NotFound);

        for err in [
            GatewayError::IncompleteFrame,
            GatewayError::MalformedRequest("x".into()),
            GatewayError::AuthorityUnreachable("refused".into()),
            GatewayError::UnsupportedOperation(Verb::Write),
            GatewayError::StorageFailure("disk".into()),
        ] {
            assert_eq!(err.status(), ResponseStatus::IncorrectRequest, "{}", err);
        }
    }
}
