//! Common authentication utility functions

use subtle::ConstantTimeEq;

/// Constant-time string comparison
///
/// Used for the OAuth state check so response timing does not reveal how
/// much of a guessed state matched.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
