use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use suiwal_swap::{StorageError, SwapError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Swap(#[from] SwapError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Swap(SwapError::Storage(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Swap(err) if err.is_local() => StatusCode::BAD_REQUEST,
            ApiError::Swap(
                SwapError::Rpc(_) | SwapError::PriceApi(_) | SwapError::RemoteRejected(_),
            ) => StatusCode::BAD_GATEWAY,
            ApiError::Swap(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suiwal_swap::SignerError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(SwapError::NotConnected).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SwapError::InsufficientBalance {
                requested: 2,
                available: 1
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(SwapError::Rpc("timeout".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(SwapError::RemoteRejected(SignerError::UserRejected)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(SwapError::Config("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
