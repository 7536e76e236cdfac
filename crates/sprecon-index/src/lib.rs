#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sprecon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod columns;
pub mod compare;
pub mod error;
pub mod membership;
pub mod method_a;
pub mod method_b;
pub mod rebalance;
pub mod series;
pub mod window;

pub use compare::{Approximations, CorrelationMatrix, TrackingStats, create_index_approximations};
pub use error::{IndexError, Result};
pub use method_a::{append_official_index_and_returns_a, calculate_total_market_cap};
pub use method_b::{
    RebalanceConfig, RebalancedPortfolio, append_official_index_and_levels_b,
    calculate_returns_with_rebalancing,
};
pub use rebalance::RebalanceFrequency;
pub use window::DateWindow;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
