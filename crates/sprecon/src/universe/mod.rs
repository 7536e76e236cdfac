//! Point-in-time membership of the index.
//!
//! Membership intervals are inclusive on both ends, so a security added or
//! removed on a quarter boundary counts as a member on that date.

pub mod membership;
pub mod summary;

pub use membership::{MembershipChanges, MembershipTable, PointInTime};
pub use summary::MembershipSummary;

/// Trait for security universes.
pub trait Universe {
    /// Security identifiers in the universe.
    fn symbols(&self) -> Vec<i64>;

    /// Check if a security is in the universe.
    fn contains(&self, permno: i64) -> bool {
        self.symbols().contains(&permno)
    }

    /// Get the number of constituents.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

impl Universe for PointInTime<'_> {
    fn symbols(&self) -> Vec<i64> {
        self.permnos().into_iter().collect()
    }

    fn contains(&self, permno: i64) -> bool {
        self.table().is_member(permno, self.date())
    }
}
