pub mod cashflow;
pub mod derived;
pub mod error;
pub mod inputs;
pub mod kpi;
pub mod model;
pub mod revenue;
pub mod schedules;
pub mod tax;
pub mod time_value;
pub mod types;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use cashflow::{simulate, Simulation, YearRow};
pub use derived::DerivedMetrics;
pub use error::BessFinanceError;
pub use inputs::{ModelInputs, ValidatedInputs};
pub use kpi::{calculate_kpis, Kpis};
pub use model::{derive_metrics, run_financial_model, run_simulation, FinancialModelOutput};
pub use types::*;

/// Standard result type for all BESS finance computations
pub type BessFinanceResult<T> = Result<T, BessFinanceError>;
