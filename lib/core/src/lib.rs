//! Core domain types and utilities for the ghostwriter platform.
//!
//! This crate provides the foundational types shared across the platform:
//! Farcaster account identifiers ([`Fid`]), strongly-typed entity IDs, and
//! the error handling foundation.

pub mod error;
pub mod fid;
pub mod id;

pub use error::Result;
pub use fid::{Fid, ParseFidError};
pub use id::{CastLogId, FlashId, ParseIdError, TeamId};
