// annotate.rs

use itertools::Itertools;

/// Convenience functions that may be typed without brackets.
pub const BARE_CALLS: [&str; 4] = ["asn", "now", "nowf", "help"];

/// Turn bare convenience function names into calls, so `now` becomes
/// `now()`. Only single spaces separate tokens.
pub fn annotate(text: &str) -> String {
    text.split(' ')
        .map(|token| {
            if BARE_CALLS.contains(&token) {
                format!("{}()", token)
            } else {
                token.to_string()
            }
        })
        .join(" ")
}
