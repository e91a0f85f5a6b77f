//! Closed-form yearly schedules feeding the cash-flow assembler.

pub mod debt;
pub mod depreciation;
pub mod reserve;
