//! Names of the columns produced by the approximations.

/// Total market cap of the active constituents.
pub const SP500_MARKET_CAP: &str = "sp500_market_cap";
/// Number of active constituents with an observation.
pub const N_CONSTITUENTS: &str = "n_constituents";
/// Method A index level.
pub const LEVEL_APPROX_A: &str = "level_approx_A";
/// Method A return.
pub const RET_APPROX_A: &str = "ret_approx_A";
/// Method A cumulative return, 1 on the first date.
pub const CUMRET_APPROX_A: &str = "cumret_approx_A";
/// Compounded official return, 1 on the first date.
pub const SP500_CUMRET: &str = "sp500_cumret";
/// Method B return.
pub const RET_APPROX_B: &str = "ret_approx_B";
/// Method B cumulative return, 1 on the first date.
pub const CUMRET_APPROX_B: &str = "cumret_approx_B";
/// Method B index level.
pub const LEVEL_APPROX_B: &str = "level_approx_B";
/// Number of securities held by the Method B portfolio.
pub const N_HOLDINGS: &str = "n_holdings";
/// Portfolio or index weight.
pub const WEIGHT: &str = "weight";

