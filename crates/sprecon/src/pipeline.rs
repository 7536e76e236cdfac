//! One-call reconstruction runs over a loaded data set.

use crate::universe::{MembershipSummary, MembershipTable};
use polars::prelude::DataFrame;
use sprecon_data::MarketData;
use sprecon_index::{
    Approximations, DateWindow, RebalanceConfig, RebalanceFrequency, RebalancedPortfolio, Result,
    create_index_approximations, method_a, method_b,
};

/// Loaded inputs plus the membership index built from them.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    data: MarketData,
    membership: MembershipTable,
}

impl Reconstruction {
    /// Index the membership table of `data`.
    pub fn new(data: MarketData) -> Result<Self> {
        let membership = MembershipTable::new(data.constituents.clone())?;
        Ok(Self { data, membership })
    }

    /// Input tables.
    pub const fn data(&self) -> &MarketData {
        &self.data
    }

    /// Membership lookups.
    pub const fn membership(&self) -> &MembershipTable {
        &self.membership
    }

    /// Descriptive statistics of the membership table.
    pub fn summary(&self) -> MembershipSummary {
        MembershipSummary::from_records(self.membership.records())
    }

    /// Method A joined with the official series.
    pub fn method_a(&self, window: DateWindow) -> Result<DataFrame> {
        method_a::approximate(&self.data, window)
    }

    /// Method B joined with the official series, plus the portfolio that
    /// produced it.
    pub fn method_b(&self, config: &RebalanceConfig) -> Result<(DataFrame, RebalancedPortfolio)> {
        method_b::approximate(&self.data, config)
    }

    /// Both methods merged with the official series.
    pub fn compare(
        &self,
        window: DateWindow,
        frequency: RebalanceFrequency,
    ) -> Result<Approximations> {
        create_index_approximations(&self.data, window, frequency)
    }
}
