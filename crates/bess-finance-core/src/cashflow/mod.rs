//! Year-by-year cash-flow waterfall.

pub mod assembler;
pub mod row;

pub use assembler::{assemble_year, simulate, Schedules, Simulation, YearState};
pub use row::YearRow;
