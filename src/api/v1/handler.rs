use super::error::*;
use crate::application_port::*;
use crate::domain_model::ConsumeKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }

    /// A success that still carries a coded notice for the client.
    pub fn ok_with_notice(data: T, code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Empty {}

/// Accepts `"2"` and `2` alike; older clients post every field as a string.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn issue_token(
    passport_service: Arc<dyn PassportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let token = passport_service
        .issue_token()
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let response = TokenResponse {
        token: token.as_str().to_owned(),
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub op: String,
    #[serde(default)]
    pub basis: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub credential_type: String,
}

#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_code: Option<String>,
}

pub async fn send_code(
    body: SendCodeRequest,
    passport_service: Arc<dyn PassportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = SendCodeInput {
        token: body.token,
        operation: body.op,
        account: body.basis,
        credential_type: body.credential_type,
    };
    let result = passport_service
        .send_code(input)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    let api_response = match result.debug_code {
        Some(code) => {
            let notice = format!("[test] verification code: {}", code);
            ApiResponse::ok_with_notice(
                SendCodeResponse {
                    debug_code: Some(code),
                },
                ApiErrorCode::DebugEcho,
                notice,
            )
        }
        None => ApiResponse::ok(SendCodeResponse { debug_code: None }),
    };
    Ok(warp::reply::json(&api_response))
}

#[derive(Debug, Deserialize)]
pub struct CompareCodeRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub basis: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub credential_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
}

pub async fn compare_code(
    body: CompareCodeRequest,
    passport_service: Arc<dyn PassportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = CompareCodeInput {
        token: body.token,
        account: body.basis,
        credential_type: body.credential_type,
        code: body.code,
    };
    passport_service
        .compare_code(input)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(Empty {})))
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub pwd: String,
    #[serde(default)]
    pub repwd: String,
    #[serde(default)]
    pub old_pwd: String,
}

async fn consume(
    kind: ConsumeKind,
    body: PasswordRequest,
    passport_service: Arc<dyn PassportService>,
) -> Result<warp::reply::Json, warp::Rejection> {
    let input = ConsumeInput {
        token: body.token,
        kind,
        new_password: body.pwd,
        confirm_password: body.repwd,
        old_password: kind.requires_old_password().then_some(body.old_pwd),
    };
    passport_service
        .consume_verification(input)
        .await
        .map_err(ApiRejection::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(Empty {})))
}

pub async fn reset_pwd(
    body: PasswordRequest,
    passport_service: Arc<dyn PassportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    consume(ConsumeKind::ResetPassword, body, passport_service).await
}

pub async fn modify_pwd(
    body: PasswordRequest,
    passport_service: Arc<dyn PassportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    consume(ConsumeKind::ModifyPassword, body, passport_service).await
}

pub async fn trade_pwd(
    body: PasswordRequest,
    passport_service: Arc<dyn PassportService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    consume(ConsumeKind::ModifyTradePassword, body, passport_service).await
}
