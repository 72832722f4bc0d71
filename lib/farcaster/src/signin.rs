//! Sign In With Farcaster message verification.
//!
//! Verification of the signed SIWF message is delegated to an external
//! verification service over HTTP. The client implements the
//! [`SignInVerifier`](ghostwriter_access::SignInVerifier) trait the
//! signature strategy consumes.

use async_trait::async_trait;
use ghostwriter_access::{ServiceError, SignInRequest, SignInVerification, SignInVerifier};
use ghostwriter_core::Fid;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::FarcasterError;

/// Client for the SIWF verification service.
#[derive(Clone)]
pub struct SignInClient {
    http: reqwest::Client,
    verify_url: String,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    message: &'a str,
    signature: &'a str,
    domain: &'a str,
    nonce: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    fid: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

impl SignInClient {
    /// Creates a client against a verification endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(verify_url: impl Into<String>) -> Result<Self, FarcasterError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| FarcasterError::Http {
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            verify_url: verify_url.into(),
        })
    }

    /// Verifies a signed sign-in message.
    #[instrument(skip(self, request), fields(domain = request.domain))]
    pub async fn verify(
        &self,
        request: SignInRequest<'_>,
    ) -> Result<SignInVerification, Report<FarcasterError>> {
        let body = VerifyRequest {
            message: request.message,
            signature: request.signature,
            domain: request.domain,
            nonce: request.nonce,
        };

        let response = self
            .http
            .post(&self.verify_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| FarcasterError::Http {
                details: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(FarcasterError::Api {
                status: status.as_u16(),
                details,
            }
            .into());
        }

        let decoded: VerifyResponse =
            response.json().await.map_err(|e| FarcasterError::Decode {
                details: e.to_string(),
            })?;

        Ok(SignInVerification {
            success: decoded.success,
            fid: decoded.fid.map(Fid::new),
            error: decoded.error,
        })
    }
}

#[async_trait]
impl SignInVerifier for SignInClient {
    async fn verify_sign_in(
        &self,
        request: SignInRequest<'_>,
    ) -> Result<SignInVerification, ServiceError> {
        self.verify(request).await.map_err(ServiceError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_response_decodes_success() {
        let response: VerifyResponse =
            serde_json::from_str(r#"{"success":true,"fid":3}"#).expect("should decode");
        assert!(response.success);
        assert_eq!(response.fid, Some(3));
        assert_eq!(response.error, None);
    }

    #[test]
    fn verify_response_decodes_rejection() {
        let response: VerifyResponse =
            serde_json::from_str(r#"{"success":false,"error":"nonce mismatch"}"#)
                .expect("should decode");
        assert!(!response.success);
        assert_eq!(response.fid, None);
        assert_eq!(response.error.as_deref(), Some("nonce mismatch"));
    }

    #[test]
    fn verify_request_serializes_all_fields() {
        let request = VerifyRequest {
            message: "example.com wants you to sign in",
            signature: "0xsig",
            domain: "example.com",
            nonce: "abc123",
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["message"], "example.com wants you to sign in");
        assert_eq!(json["signature"], "0xsig");
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["nonce"], "abc123");
    }
}
