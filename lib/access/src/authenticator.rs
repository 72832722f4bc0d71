//! The strategy dispatcher.
//!
//! One [`Authenticator`] value is constructed at process start from
//! configuration and the wired collaborators, then shared by reference
//! through application state. It selects exactly one strategy per request
//! and fails closed: every failure leaves as a classified
//! [`AuthError`], never as an unhandled panic or a silent redirect.

use std::sync::Arc;

use crate::credentials::{Credentials, SignatureCredentials, SignerCredentials};
use crate::error::AuthError;
use crate::identity::{
    IdentityResolver, SignInRequest, SignInVerifier, SignerDirectory, SignerState,
    VerifiedIdentity,
};
use crate::user::User;
use ghostwriter_core::Fid;

/// Dispatches authentication requests to the matching strategy.
pub struct Authenticator {
    /// Domain the sign-in messages must be bound to.
    domain: String,
    sign_in: Arc<dyn SignInVerifier>,
    signers: Arc<dyn SignerDirectory>,
    resolver: Arc<dyn IdentityResolver>,
}

impl Authenticator {
    /// Creates an authenticator bound to a domain and its collaborators.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        sign_in: Arc<dyn SignInVerifier>,
        signers: Arc<dyn SignerDirectory>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            domain: domain.into(),
            sign_in,
            signers,
            resolver,
        }
    }

    /// Returns the domain sign-in messages are verified against.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Authenticates a request with exactly one strategy.
    ///
    /// # Errors
    ///
    /// Returns a classified [`AuthError`]; see the variant docs for the
    /// failure taxonomy.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<User, AuthError> {
        match credentials {
            Credentials::Signature(credentials) => self.authenticate_signature(credentials).await,
            Credentials::Signer(credentials) => self.authenticate_signer(credentials).await,
        }
    }

    /// Direct-signature strategy: verify a signed SIWF message.
    async fn authenticate_signature(
        &self,
        credentials: SignatureCredentials,
    ) -> Result<User, AuthError> {
        // Presence checks come first: no external call for an incomplete
        // request.
        let message = require(credentials.message.as_deref(), "message")?;
        let signature = require(credentials.signature.as_deref(), "signature")?;
        let nonce = require(credentials.nonce.as_deref(), "nonce")?;

        let verification = self
            .sign_in
            .verify_sign_in(SignInRequest {
                message,
                signature,
                nonce,
                domain: &self.domain,
            })
            .await
            .map_err(|e| AuthError::ServiceUnavailable { details: e.details })?;

        if !verification.success {
            return Err(AuthError::InvalidSignature {
                detail: verification.error,
            });
        }
        let Some(fid) = verification.fid else {
            return Err(AuthError::InvalidSignature {
                detail: Some("verification reported success without a fid".to_string()),
            });
        };

        self.resolve(VerifiedIdentity {
            fid,
            username: credentials.username,
            avatar_url: credentials.avatar_url,
            signer_uuid: None,
        })
        .await
    }

    /// Delegated-signer strategy: confirm an approved signer bound to the
    /// claimed account.
    async fn authenticate_signer(
        &self,
        credentials: SignerCredentials,
    ) -> Result<User, AuthError> {
        let signer_uuid = require(credentials.signer_uuid.as_deref(), "signerUuid")?;
        let claimed = require(credentials.fid.as_deref(), "fid")?;

        // Both sides of the binding check are normalized to numeric fids.
        // A claimed fid that is not a canonical decimal number can never
        // match a directory-reported fid, so it is an invalid credential.
        let claimed_fid: Fid = claimed.parse().map_err(|_| AuthError::InvalidCredentials)?;

        let status = self
            .signers
            .lookup_signer(signer_uuid)
            .await
            .map_err(|e| AuthError::ServiceUnavailable { details: e.details })?;

        let bound = status.state == SignerState::Approved && status.fid == Some(claimed_fid);
        if !bound {
            return Err(AuthError::InvalidCredentials);
        }

        let profiles = self
            .signers
            .fetch_profiles(&[claimed_fid])
            .await
            .map_err(|_| AuthError::AccountNotFound { fid: claimed_fid })?;
        let Some(profile) = profiles.into_iter().next() else {
            return Err(AuthError::AccountNotFound { fid: claimed_fid });
        };

        self.resolve(VerifiedIdentity {
            fid: profile.fid,
            username: Some(profile.username),
            avatar_url: profile.avatar_url,
            signer_uuid: Some(signer_uuid.to_string()),
        })
        .await
    }

    async fn resolve(&self, identity: VerifiedIdentity) -> Result<User, AuthError> {
        let fid = identity.fid;
        let username = identity.username.clone();

        self.resolver.resolve(identity).await.map_err(|e| {
            tracing::error!(
                %fid,
                username = username.as_deref(),
                error = %e,
                "identity resolution failed"
            );
            AuthError::StoreFailure { details: e.message }
        })
    }
}

fn require<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, AuthError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AuthError::MissingCredential { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ResolverError, ServiceError};
    use crate::identity::{Profile, SignInVerification, SignerStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sign-in verifier fake that counts calls and returns a canned result.
    struct FakeSignInVerifier {
        calls: AtomicUsize,
        result: Result<SignInVerification, ServiceError>,
    }

    impl FakeSignInVerifier {
        fn succeeding(fid: u64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(SignInVerification {
                    success: true,
                    fid: Some(Fid::new(fid)),
                    error: None,
                }),
            }
        }

        fn rejecting(error: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(SignInVerification {
                    success: false,
                    fid: None,
                    error: Some(error.to_string()),
                }),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SignInVerifier for FakeSignInVerifier {
        async fn verify_sign_in(
            &self,
            _request: SignInRequest<'_>,
        ) -> Result<SignInVerification, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    /// Signer directory fake with canned signer status and profiles.
    struct FakeSignerDirectory {
        lookup_calls: AtomicUsize,
        status: SignerStatus,
        profiles: Vec<Profile>,
    }

    impl FakeSignerDirectory {
        fn new(status: SignerStatus, profiles: Vec<Profile>) -> Self {
            Self {
                lookup_calls: AtomicUsize::new(0),
                status,
                profiles,
            }
        }

        fn approved(fid: u64) -> Self {
            Self::new(
                SignerStatus {
                    state: SignerState::Approved,
                    fid: Some(Fid::new(fid)),
                },
                vec![Profile {
                    fid: Fid::new(fid),
                    username: format!("user{fid}"),
                    avatar_url: None,
                }],
            )
        }
    }

    #[async_trait]
    impl SignerDirectory for FakeSignerDirectory {
        async fn lookup_signer(&self, _signer_uuid: &str) -> Result<SignerStatus, ServiceError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.status.clone())
        }

        async fn fetch_profiles(&self, fids: &[Fid]) -> Result<Vec<Profile>, ServiceError> {
            Ok(self
                .profiles
                .iter()
                .filter(|p| fids.contains(&p.fid))
                .cloned()
                .collect())
        }
    }

    /// Resolver fake that mints a user straight from the identity.
    struct FakeResolver {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl FakeResolver {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl IdentityResolver for FakeResolver {
        async fn resolve(&self, identity: VerifiedIdentity) -> Result<User, ResolverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail_with {
                return Err(ResolverError::new(message));
            }
            let username = identity
                .username
                .unwrap_or_else(|| identity.fid.to_string());
            let mut user = User::new(identity.fid, username);
            user.set_avatar_url(identity.avatar_url);
            user.set_signer_uuid(identity.signer_uuid);
            Ok(user)
        }
    }

    fn authenticator(
        sign_in: Arc<FakeSignInVerifier>,
        signers: Arc<FakeSignerDirectory>,
        resolver: Arc<FakeResolver>,
    ) -> Authenticator {
        Authenticator::new("ghostwriter.example", sign_in, signers, resolver)
    }

    fn signature_credentials() -> SignatureCredentials {
        SignatureCredentials {
            message: Some("ghostwriter.example wants you to sign in".to_string()),
            signature: Some("0xabc".to_string()),
            nonce: Some("n0nce".to_string()),
            username: Some("dwr".to_string()),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn signature_success_resolves_user() {
        let sign_in = Arc::new(FakeSignInVerifier::succeeding(3));
        let signers = Arc::new(FakeSignerDirectory::approved(3));
        let resolver = Arc::new(FakeResolver::ok());
        let auth = authenticator(sign_in.clone(), signers, resolver);

        let user = auth
            .authenticate(Credentials::Signature(signature_credentials()))
            .await
            .expect("should authenticate");

        assert_eq!(user.fid(), Fid::new(3));
        assert_eq!(user.username(), "dwr");
        assert_eq!(sign_in.call_count(), 1);
    }

    #[tokio::test]
    async fn signature_authentication_is_idempotent() {
        let sign_in = Arc::new(FakeSignInVerifier::succeeding(3));
        let signers = Arc::new(FakeSignerDirectory::approved(3));
        let resolver = Arc::new(FakeResolver::ok());
        let auth = authenticator(sign_in, signers, resolver);

        let first = auth
            .authenticate(Credentials::Signature(signature_credentials()))
            .await
            .expect("should authenticate");
        let second = auth
            .authenticate(Credentials::Signature(signature_credentials()))
            .await
            .expect("should authenticate");

        assert_eq!(first.fid(), second.fid());
    }

    #[tokio::test]
    async fn signature_missing_field_never_calls_service() {
        for strip in ["message", "signature", "nonce"] {
            let mut credentials = signature_credentials();
            match strip {
                "message" => credentials.message = None,
                "signature" => credentials.signature = None,
                _ => credentials.nonce = None,
            }

            let sign_in = Arc::new(FakeSignInVerifier::succeeding(3));
            let signers = Arc::new(FakeSignerDirectory::approved(3));
            let resolver = Arc::new(FakeResolver::ok());
            let auth = authenticator(sign_in.clone(), signers, resolver);

            let err = auth
                .authenticate(Credentials::Signature(credentials))
                .await
                .expect_err("should fail");

            assert_eq!(err, AuthError::MissingCredential { field: strip });
            assert_eq!(sign_in.call_count(), 0, "service called for missing {strip}");
        }
    }

    #[tokio::test]
    async fn signature_rejection_carries_service_detail() {
        let sign_in = Arc::new(FakeSignInVerifier::rejecting("signature mismatch"));
        let signers = Arc::new(FakeSignerDirectory::approved(3));
        let resolver = Arc::new(FakeResolver::ok());
        let auth = authenticator(sign_in, signers, resolver);

        let err = auth
            .authenticate(Credentials::Signature(signature_credentials()))
            .await
            .expect_err("should fail");

        assert_eq!(
            err,
            AuthError::InvalidSignature {
                detail: Some("signature mismatch".to_string())
            }
        );
    }

    #[tokio::test]
    async fn signature_resolver_failure_surfaces_message() {
        let sign_in = Arc::new(FakeSignInVerifier::succeeding(3));
        let signers = Arc::new(FakeSignerDirectory::approved(3));
        let resolver = Arc::new(FakeResolver::failing("unique constraint violation"));
        let auth = authenticator(sign_in, signers, resolver);

        let err = auth
            .authenticate(Credentials::Signature(signature_credentials()))
            .await
            .expect_err("should fail");

        assert_eq!(
            err,
            AuthError::StoreFailure {
                details: "unique constraint violation".to_string()
            }
        );
    }

    fn signer_credentials(fid: &str) -> SignerCredentials {
        SignerCredentials {
            signer_uuid: Some("3f0c5f4e-signer".to_string()),
            fid: Some(fid.to_string()),
        }
    }

    #[tokio::test]
    async fn signer_success_resolves_user_with_signer() {
        let sign_in = Arc::new(FakeSignInVerifier::succeeding(3));
        let signers = Arc::new(FakeSignerDirectory::approved(123));
        let resolver = Arc::new(FakeResolver::ok());
        let auth = authenticator(sign_in, signers, resolver);

        let user = auth
            .authenticate(Credentials::Signer(signer_credentials("123")))
            .await
            .expect("should authenticate");

        assert_eq!(user.fid(), Fid::new(123));
        assert_eq!(user.username(), "user123");
        assert_eq!(user.signer_uuid(), Some("3f0c5f4e-signer"));
    }

    #[tokio::test]
    async fn signer_missing_field_never_calls_directory() {
        let signers = Arc::new(FakeSignerDirectory::approved(123));
        let auth = authenticator(
            Arc::new(FakeSignInVerifier::succeeding(3)),
            signers.clone(),
            Arc::new(FakeResolver::ok()),
        );

        let err = auth
            .authenticate(Credentials::Signer(SignerCredentials {
                signer_uuid: None,
                fid: Some("123".to_string()),
            }))
            .await
            .expect_err("should fail");

        assert_eq!(err, AuthError::MissingCredential { field: "signerUuid" });
        assert_eq!(signers.lookup_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn signer_not_approved_is_invalid() {
        let signers = Arc::new(FakeSignerDirectory::new(
            SignerStatus {
                state: SignerState::PendingApproval,
                fid: Some(Fid::new(123)),
            },
            vec![],
        ));
        let auth = authenticator(
            Arc::new(FakeSignInVerifier::succeeding(3)),
            signers,
            Arc::new(FakeResolver::ok()),
        );

        let err = auth
            .authenticate(Credentials::Signer(signer_credentials("123")))
            .await
            .expect_err("should fail");

        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn signer_bound_to_other_account_is_invalid() {
        let signers = Arc::new(FakeSignerDirectory::approved(999));
        let auth = authenticator(
            Arc::new(FakeSignInVerifier::succeeding(3)),
            signers,
            Arc::new(FakeResolver::ok()),
        );

        let err = auth
            .authenticate(Credentials::Signer(signer_credentials("123")))
            .await
            .expect_err("should fail");

        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn signer_fid_comparison_normalizes_numeric_forms() {
        // The directory reports the fid numerically; a decimal string claim
        // of the same number must match.
        let signers = Arc::new(FakeSignerDirectory::approved(123));
        let auth = authenticator(
            Arc::new(FakeSignInVerifier::succeeding(3)),
            signers,
            Arc::new(FakeResolver::ok()),
        );

        let user = auth
            .authenticate(Credentials::Signer(signer_credentials("123")))
            .await
            .expect("should authenticate");
        assert_eq!(user.fid(), Fid::new(123));

        // A non-canonical spelling must not compare equal.
        let err = auth
            .authenticate(Credentials::Signer(signer_credentials("0123")))
            .await
            .expect_err("should fail");
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn signer_without_profile_is_account_not_found() {
        let signers = Arc::new(FakeSignerDirectory::new(
            SignerStatus {
                state: SignerState::Approved,
                fid: Some(Fid::new(123)),
            },
            vec![],
        ));
        let auth = authenticator(
            Arc::new(FakeSignInVerifier::succeeding(3)),
            signers,
            Arc::new(FakeResolver::ok()),
        );

        let err = auth
            .authenticate(Credentials::Signer(signer_credentials("123")))
            .await
            .expect_err("should fail");

        assert_eq!(
            err,
            AuthError::AccountNotFound {
                fid: Fid::new(123)
            }
        );
    }
}
