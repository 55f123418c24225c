use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiRejection>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.code, err.message.clone()));
        Ok(warp::reply::with_status(json, StatusCode::OK))
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::Rejected,
            "malformed request body",
        ));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::Failure,
            "api not defined",
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::InternalError,
            format!("Unhandled error: {:?}", err),
        ));
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

/// Numeric codes clients branch on.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum ApiErrorCode {
    #[error("Request failed")]
    Failure,
    #[error("Request rejected")]
    Rejected,
    /// Not an error: carries a code echoed in debug mode.
    #[error("Debug echo")]
    DebugEcho,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn code(&self) -> u8 {
        match self {
            ApiErrorCode::Failure => 1,
            ApiErrorCode::Rejected => 2,
            ApiErrorCode::DebugEcho => 3,
            ApiErrorCode::InvalidToken => 6,
            ApiErrorCode::InternalError => 1,
        }
    }
}

impl Serialize for ApiErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug)]
pub struct ApiRejection {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiRejection {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiRejection {
            code,
            message: message.into(),
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiRejection {
        warn!("Internal error: {}", error);
        ApiRejection::new(ApiErrorCode::InternalError, ApiErrorCode::InternalError.to_string())
    }
}

impl reject::Reject for ApiRejection {}

impl From<PassportError> for ApiRejection {
    fn from(error: PassportError) -> Self {
        match error {
            PassportError::InvalidRequest(InvalidRequest::MissingToken) => {
                ApiRejection::new(ApiErrorCode::InvalidToken, "illegal verification request")
            }
            e @ (PassportError::InvalidRequest(_)
            | PassportError::NotVerified
            | PassportError::Validation(_)) => ApiRejection::new(ApiErrorCode::Rejected, e.to_string()),
            e @ (PassportError::NoSuchMember
            | PassportError::Throttled
            | PassportError::SendFailed(_)
            | PassportError::CodeMismatch(_)
            | PassportError::MutationFailed(_)) => ApiRejection::new(ApiErrorCode::Failure, e.to_string()),
            e @ (PassportError::Store(_) | PassportError::Internal(_)) => ApiRejection::internal(e),
        }
    }
}
