//! Yearly revenue streams and the municipality royalty charged on them.

pub mod royalty;
pub mod streams;

pub use royalty::{compute_royalties, RoyaltySchedule};
pub use streams::{build_revenue_schedule, degradation_factor, revenue_for_year, RevenueLine};
