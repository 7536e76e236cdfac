#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sprecon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dates;
pub mod derived;
pub mod error;
pub mod frames;
pub mod loader;
pub mod records;
pub mod schema;

pub use error::{DataError, Result};
pub use loader::{DataConfig, MarketData};
pub use records::{IndexObservation, MembershipRecord, StockObservation};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
