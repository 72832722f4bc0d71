//! Verified identities and the collaborator traits the strategies call.
//!
//! The strategies never touch the local store or the network directly; they
//! go through the narrow traits defined here. The server wires these to a
//! real HTTP client and a real database; tests wire them to in-memory
//! fakes.

use async_trait::async_trait;
use ghostwriter_core::Fid;

use crate::error::{ResolverError, ServiceError};
use crate::user::User;

/// A normalized identity produced by a successful verification.
///
/// Both strategies reduce their service responses to this tuple before
/// handing it to the [`IdentityResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// The verified account's fid.
    pub fid: Fid,
    /// Username, when the strategy learned one.
    pub username: Option<String>,
    /// Avatar URL, when the strategy learned one.
    pub avatar_url: Option<String>,
    /// The delegated signer that proved this identity, for the signer
    /// strategy only. The resolver persists it on the user record.
    pub signer_uuid: Option<String>,
}

/// A sign-in message verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest<'a> {
    /// The signed SIWF message.
    pub message: &'a str,
    /// The signature over the message.
    pub signature: &'a str,
    /// The nonce embedded in the message.
    pub nonce: &'a str,
    /// The domain this application is bound to.
    pub domain: &'a str,
}

/// Result of a sign-in message verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInVerification {
    /// Whether the signature verified.
    pub success: bool,
    /// The fid the message was signed by, on success.
    pub fid: Option<Fid>,
    /// Service-reported error detail, on rejection.
    pub error: Option<String>,
}

/// External service that verifies signed sign-in messages.
#[async_trait]
pub trait SignInVerifier: Send + Sync {
    /// Verifies a signed sign-in message against a domain.
    async fn verify_sign_in(
        &self,
        request: SignInRequest<'_>,
    ) -> Result<SignInVerification, ServiceError>;
}

/// Approval state of a delegated signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerState {
    /// The account holder approved the signer; it can publish casts.
    Approved,
    /// The signer was requested but not yet approved.
    PendingApproval,
    /// The signer was revoked by the account holder.
    Revoked,
    /// Any other state reported by the directory.
    Other(String),
}

impl SignerState {
    /// Parses the directory's wire representation of a signer state.
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "approved" => Self::Approved,
            "pending_approval" => Self::PendingApproval,
            "revoked" => Self::Revoked,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Status of a delegated signer as reported by the signer directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerStatus {
    /// Approval state.
    pub state: SignerState,
    /// The fid the signer is bound to, once approved.
    pub fid: Option<Fid>,
}

/// A Farcaster account profile as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    /// The account's fid.
    pub fid: Fid,
    /// The account's username.
    pub username: String,
    /// The account's avatar URL, if set.
    pub avatar_url: Option<String>,
}

/// External service that tracks delegated signers and account profiles.
#[async_trait]
pub trait SignerDirectory: Send + Sync {
    /// Looks up the status of a delegated signer.
    async fn lookup_signer(&self, signer_uuid: &str) -> Result<SignerStatus, ServiceError>;

    /// Fetches account profiles in bulk by fid.
    ///
    /// Unknown fids are omitted from the result rather than reported as
    /// errors.
    async fn fetch_profiles(&self, fids: &[Fid]) -> Result<Vec<Profile>, ServiceError>;
}

/// Callback that materializes a local user from a verified identity.
///
/// Implemented by the persistence layer. Must be idempotent: resolving the
/// same identity twice yields the same user record.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Upserts and returns the local user for a verified identity.
    async fn resolve(&self, identity: VerifiedIdentity) -> Result<User, ResolverError>;
}
