//! Farcaster service collaborators for the ghostwriter platform.
//!
//! This crate provides the HTTP clients behind the narrow traits that
//! `ghostwriter-access` defines:
//!
//! - [`DirectoryClient`]: signer status lookup, bulk profile fetch,
//!   username lookup, channel lookup, and cast publishing against a
//!   Neynar-style Farcaster API
//! - [`SignInClient`]: Sign In With Farcaster message verification against
//!   an external verification service
//! - [`cache`]: a read-through lookup cache with one centralized TTL policy
//!   table

pub mod cache;
pub mod client;
pub mod error;
pub mod signin;

pub use cache::{CachePolicy, CacheStore, CachedResource, MemoryCache};
pub use client::{Channel, DirectoryClient, PublishedCast};
pub use error::FarcasterError;
pub use signin::SignInClient;
