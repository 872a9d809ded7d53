//! Request bodies and response envelopes for the challenge endpoints.
//!
//! Handlers take the raw request body and return a status plus an envelope,
//! leaving the transport to the caller.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    clock::Clock,
    error::ChallengeError,
    service::{ChallengeService, ValidationResult},
    store::{Challenge, ChallengeStore},
};

/// Body of a create challenge request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateChallengeRequest {
    /// Encoded public key
    #[serde(rename = "pubKey")]
    pub pub_key: String,
}

/// Body of a verify challenge request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyChallengeRequest {
    /// Compact signed token
    pub token: String,
}

/// Result codes carried in every envelope
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResponseCode {
    #[serde(rename = "CryptoAPI-ChallengeCreateSucceed")]
    ChallengeCreateSucceed,
    #[serde(rename = "CryptoAPI-ChallengeCreateFailed")]
    ChallengeCreateFailed,
    #[serde(rename = "CryptoAPI-ChallengeValidationSucceeded")]
    ChallengeValidationSucceeded,
    #[serde(rename = "CryptoAPI-ChallengeValidationFailed")]
    ChallengeValidationFailed,
}

/// Response envelope
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    pub code: ResponseCode,
    pub message: String,
}

/// Transport-level outcome of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    InternalError,
}

impl Status {
    /// Matching HTTP status code
    pub fn as_u16(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::InternalError => 500,
        }
    }
}

/// A status together with the envelope to send back
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiReply<T> {
    pub status: Status,
    pub body: ApiResponse<T>,
}

impl<T> ApiReply<T> {
    fn new(status: Status, result: Option<T>, code: ResponseCode, message: &str) -> Self {
        Self {
            status,
            body: ApiResponse {
                result,
                code,
                message: message.to_string(),
            },
        }
    }
}

/// Challenge endpoints on top of a [`ChallengeService`]
pub struct ChallengeApi<S, C> {
    service: ChallengeService<S, C>,
}

impl<S: ChallengeStore, C: Clock> ChallengeApi<S, C> {
    pub fn new(service: ChallengeService<S, C>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ChallengeService<S, C> {
        &self.service
    }

    /// `POST v1/challenge`
    pub fn create_challenge(&self, body: &[u8]) -> ApiReply<Challenge> {
        info!("create challenge request received");

        let request: CreateChallengeRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "could not parse create challenge request");
                return ApiReply::new(
                    Status::BadRequest,
                    None,
                    ResponseCode::ChallengeCreateFailed,
                    "invalid request body",
                );
            }
        };

        match self.service.create_challenge(&request.pub_key) {
            Ok(challenge) => ApiReply::new(
                Status::Ok,
                Some(challenge),
                ResponseCode::ChallengeCreateSucceed,
                "successfully created challenge",
            ),
            Err(ChallengeError::InvalidPublicKey(_)) => ApiReply::new(
                Status::BadRequest,
                None,
                ResponseCode::ChallengeCreateFailed,
                "invalid public key",
            ),
            Err(e) => {
                error!(error = %e, "failed to create challenge");
                ApiReply::new(
                    Status::InternalError,
                    None,
                    ResponseCode::ChallengeCreateFailed,
                    "error while trying to create challenge",
                )
            }
        }
    }

    /// `POST v1/verify-challenge`
    pub fn verify_challenge(&self, body: &[u8]) -> ApiReply<ValidationResult> {
        info!("verify challenge request received");

        let request: VerifyChallengeRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "could not parse verify challenge request");
                return ApiReply::new(
                    Status::BadRequest,
                    Some(ValidationResult::invalid("")),
                    ResponseCode::ChallengeValidationFailed,
                    "invalid request body",
                );
            }
        };

        match self.service.verify_challenge(&request.token) {
            Ok(result) if result.valid => ApiReply::new(
                Status::Ok,
                Some(result),
                ResponseCode::ChallengeValidationSucceeded,
                "challenge validation succeeded",
            ),
            Ok(result) => {
                info!(reason = %result.validation_error, "challenge validation failed");
                ApiReply::new(
                    Status::Ok,
                    Some(result),
                    ResponseCode::ChallengeValidationFailed,
                    "challenge validation failed",
                )
            }
            Err(e) => {
                error!(error = %e, "error while challenge validation");
                ApiReply::new(
                    Status::InternalError,
                    Some(ValidationResult::invalid("")),
                    ResponseCode::ChallengeValidationFailed,
                    "internal error while trying to validate challenge",
                )
            }
        }
    }
}
