//! Column names shared by every frame in the workspace.
//!
//! Names follow the CRSP conventions of the source tables so that exported
//! files line up with the upstream data dictionary.

/// Security identifier.
pub const PERMNO: &str = "permno";
/// Index number.
pub const INDNO: &str = "indno";
/// Membership start date (inclusive).
pub const MBRSTARTDT: &str = "mbrstartdt";
/// Membership end date (inclusive).
pub const MBRENDDT: &str = "mbrenddt";
/// Membership flag.
pub const MBRFLG: &str = "mbrflg";
/// Index family.
pub const INDFAM: &str = "indfam";

/// Observation date.
pub const DATE: &str = "date";
/// Price; negative values are bid/ask midpoints.
pub const PRC: &str = "prc";
/// Shares outstanding.
pub const SHROUT: &str = "shrout";
/// Cumulative share adjustment factor.
pub const CFACSHR: &str = "cfacshr";
/// Cumulative price adjustment factor.
pub const CFACPR: &str = "cfacpr";
/// Return including distributions.
pub const RET: &str = "ret";
/// Return excluding distributions.
pub const RETX: &str = "retx";
/// Exchange code.
pub const EXCHCD: &str = "exchcd";
/// Share code.
pub const SHRCD: &str = "shrcd";
/// Standard industrial classification code.
pub const SICCD: &str = "siccd";

/// Official index level.
pub const SPINDX: &str = "spindx";
/// Official index return.
pub const SPRTRN: &str = "sprtrn";

/// Split-adjusted shares outstanding.
pub const ADJ_SHROUT: &str = "adj_shrout";
/// Split-adjusted absolute price.
pub const ADJ_PRC: &str = "adj_prc";
/// Market capitalization.
pub const MARKET_CAP: &str = "market_cap";
