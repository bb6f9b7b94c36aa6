use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use checkout_engine::CheckoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error(transparent)]
    CheckoutError(#[from] CheckoutError),
}

impl ServerError {
    /// A stable machine-readable code for the response envelope.
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) => "BAD_REQUEST",
            Self::CheckoutError(e) => match e {
                CheckoutError::ValidationError(_) => "VALIDATION_ERROR",
                CheckoutError::OrderNotFound(_) => "ORDER_NOT_FOUND",
                CheckoutError::OrderAlreadyExists(_) => "ORDER_ALREADY_EXISTS",
                CheckoutError::InvalidNotification(_) => "INVALID_NOTIFICATION",
                CheckoutError::VerificationFailed(_) => "VERIFICATION_FAILED",
                CheckoutError::TransactionCreationFailed { .. } => "TRANSACTION_CREATION_FAILED",
                CheckoutError::UpstreamGateway(_) => "UPSTREAM_GATEWAY",
                CheckoutError::StoreError(_) => "STORE_ERROR",
            },
            _ => "SERVER_ERROR",
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::CheckoutError(e) => match e {
                CheckoutError::ValidationError(_) => StatusCode::BAD_REQUEST,
                CheckoutError::InvalidNotification(_) => StatusCode::BAD_REQUEST,
                CheckoutError::VerificationFailed(_) => StatusCode::FORBIDDEN,
                CheckoutError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                CheckoutError::OrderAlreadyExists(_) => StatusCode::CONFLICT,
                CheckoutError::TransactionCreationFailed { .. } => StatusCode::BAD_GATEWAY,
                CheckoutError::UpstreamGateway(_) => StatusCode::BAD_GATEWAY,
                CheckoutError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(
            serde_json::json!({
                "success": false,
                "error": self.error_code(),
                "message": self.to_string(),
            })
            .to_string(),
        )
    }
}
