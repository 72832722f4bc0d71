//! Inbound authentication credentials.
//!
//! The route that received the request decides which variant to build; the
//! credential content never decides the strategy. Fields are optional
//! because presence checking is the strategy's first job -- a missing field
//! must fail fast without any external call.

use serde::Deserialize;

/// Credentials for the direct-signature strategy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignatureCredentials {
    /// The signed SIWF message.
    pub message: Option<String>,
    /// The signature over the message.
    pub signature: Option<String>,
    /// The nonce embedded in the message.
    pub nonce: Option<String>,
    /// Username hint passed along by the sign-in widget.
    pub username: Option<String>,
    /// Avatar URL hint passed along by the sign-in widget.
    #[serde(rename = "pfpUrl")]
    pub avatar_url: Option<String>,
}

/// Credentials for the delegated-signer strategy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignerCredentials {
    /// The delegated signer to look up.
    #[serde(rename = "signerUuid")]
    pub signer_uuid: Option<String>,
    /// The fid the client claims the signer belongs to.
    pub fid: Option<String>,
}

/// The closed set of authentication strategies.
///
/// Exactly one variant is attempted per request.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Sign In With Farcaster message + signature.
    Signature(SignatureCredentials),
    /// Delegated signer uuid + claimed fid.
    Signer(SignerCredentials),
}
