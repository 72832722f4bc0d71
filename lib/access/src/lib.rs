//! Authentication and session management for the ghostwriter platform.
//!
//! This crate provides:
//! - The two sign-in strategies (direct signature and delegated signer) and
//!   the [`Authenticator`] that dispatches between them
//! - The narrow traits the strategies call out through
//!   ([`SignInVerifier`], [`SignerDirectory`], [`IdentityResolver`])
//! - Encrypted cookie sessions with one-shot flash messages
//!   ([`SessionManager`], [`SessionData`])
//! - User management (the [`User`] type mirroring a Farcaster account)
//!
//! # Authentication Model
//!
//! Both strategies converge on the same outcome: a normalized
//! [`VerifiedIdentity`] proving control of a Farcaster account, handed to an
//! [`IdentityResolver`] that materializes the local [`User`] record. The
//! strategies differ only in *how* control is proven:
//!
//! - **Signature**: the user signs a Sign In With Farcaster message; an
//!   external verification service checks the signature against the
//!   configured domain.
//! - **Signer**: the user completed a delegated-signer approval; the signer
//!   directory confirms the signer is approved and bound to the claimed
//!   account.
//!
//! # Example
//!
//! ```no_run
//! use ghostwriter_access::{SessionData, SessionManager};
//! use ghostwriter_core::Fid;
//!
//! let secret = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
//! let sessions = SessionManager::new(&[secret.to_string()], true).unwrap();
//!
//! let session = SessionData::for_user(Fid::new(3));
//! let set_cookie = sessions.commit(&session).unwrap();
//! # let _ = set_cookie;
//! ```

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use authenticator::Authenticator;
pub use credentials::{Credentials, SignatureCredentials, SignerCredentials};
pub use error::{AuthError, ResolverError, ServiceError, SessionError};
pub use identity::{
    IdentityResolver, Profile, SignInRequest, SignInVerification, SignInVerifier, SignerDirectory,
    SignerState, SignerStatus, VerifiedIdentity,
};
pub use session::{FlashKind, FlashMessage, SessionData, SessionManager, SESSION_COOKIE};
pub use user::User;
