#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sprecon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;
pub mod universe;

// Re-export main types from sub-crates
pub use sprecon_data as data;
pub use sprecon_index as index;
pub use sprecon_output as output;

// Re-export common universe types
pub use universe::{MembershipChanges, MembershipSummary, MembershipTable, Universe};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
