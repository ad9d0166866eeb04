use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use thiserror::Error;

/// Everything a request can fail with. Unknown, expired, and malformed
/// codes all surface as `NotFound` so a client cannot probe whether a code
/// ever existed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no files uploaded")]
    NoFiles,
    #[error("malformed upload: {0}")]
    Upload(#[from] MultipartError),
    #[error("too many files, maximum {0} per upload")]
    TooManyFiles(usize),
    #[error("file too large, maximum {0} bytes per file")]
    FileTooLarge(u64),
    #[error("storage limit exceeded")]
    StorageExceeded,
    #[error("share code not found")]
    NotFound,
    #[error("share code space exhausted")]
    CodeSpaceExhausted,
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFiles | ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyFiles(_)
            | ApiError::FileTooLarge(_)
            | ApiError::StorageExceeded => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::CodeSpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Io(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_status() {
        assert_eq!(ApiError::NoFiles.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::TooManyFiles(15).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::FileTooLarge(200).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::StorageExceeded.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::CodeSpaceExhausted.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
