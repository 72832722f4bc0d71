//! Error handling foundation for the ghostwriter platform.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error enums in its own
//! error module; layers add context via rootcause's `.context()` as
//! errors propagate toward the request boundary.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<u64> = Ok(7);
        assert_eq!(ok.expect("should be ok"), 7);
    }
}
