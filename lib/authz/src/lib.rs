//! Authorization for the ghostwriter platform.
//!
//! Two relations control everything:
//!
//! - **Teammate**: membership -- who may view a team and add others to it.
//! - **Grant**: delegation -- whose account the team may cast as.
//!
//! The gate functions in [`gate`] are pure decision functions over a
//! [`DelegationStore`]: they read, they never write, and they fail with
//! [`AuthzError::Forbidden`] which the web boundary maps to HTTP 403.

pub mod error;
pub mod gate;
pub mod types;

pub use error::AuthzError;
pub use gate::{require_can_cast_as_author, require_user_belongs_to_team, DelegationStore};
pub use types::{Grant, Team, Teammate};
