//! Validated parameter bundles consumed by the simulation engine.
//!
//! Bundles deserialize with the defaults of a 50 MW / 200 MWh reference
//! project, so partial JSON documents are accepted. Nothing downstream of
//! [`ModelInputs::validate`] re-checks ranges.

pub mod capex_opex;
pub mod financial;
pub mod municipality;
pub mod project;
pub mod revenues;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::error::BessFinanceError;
use crate::BessFinanceResult;

pub use capex_opex::CapexOpex;
pub use financial::{AmortizationType, FinancialParameters};
pub use municipality::MunicipalityFees;
pub use project::ProjectData;
pub use revenues::{FloorTerms, FloorType, MerchantTerms, Revenues, TerminalValue, TollingTranche};

/// Upper bound on any year-valued parameter.
pub const MAX_PROJECT_LIFE: u32 = 60;

/// The five parameter bundles of a run plus the degradation switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelInputs {
    pub project: ProjectData,
    pub capex_opex: CapexOpex,
    pub financial: FinancialParameters,
    pub revenues: Revenues,
    pub municipality: MunicipalityFees,
    /// When false, power and energy capacity stay at nameplate every year.
    pub apply_degradation: bool,
}

impl Default for ModelInputs {
    fn default() -> Self {
        ModelInputs {
            project: ProjectData::default(),
            capex_opex: CapexOpex::default(),
            financial: FinancialParameters::default(),
            revenues: Revenues::default(),
            municipality: MunicipalityFees::default(),
            apply_degradation: true,
        }
    }
}

impl ModelInputs {
    /// Check every field-level and cross-field constraint, consuming the
    /// bundle into a [`ValidatedInputs`] the engine accepts.
    pub fn validate(self) -> BessFinanceResult<ValidatedInputs> {
        self.check()?;
        Ok(ValidatedInputs(self))
    }

    /// Run the checks without taking ownership.
    pub fn check(&self) -> BessFinanceResult<()> {
        self.project.validate()?;
        self.capex_opex.validate()?;
        self.financial.validate()?;
        self.revenues.validate()?;
        self.municipality.validate()?;

        let fin = &self.financial;
        if fin.debt_pct_on_capex > Decimal::ZERO && fin.debt_tenor_years == 0 {
            return Err(BessFinanceError::invalid(
                "financial.debt_tenor_years",
                format!(
                    "Debt share of {} needs a tenor of at least one year",
                    fin.debt_pct_on_capex
                ),
            ));
        }
        let drawn = fin.debt_pct_on_capex > Decimal::ZERO && fin.debt_tenor_years > 0;
        if drawn && fin.debt_tenor_years > self.project.project_life {
            return Err(BessFinanceError::invalid(
                "financial.debt_tenor_years",
                format!(
                    "Debt tenor ({}) must not exceed project life ({})",
                    fin.debt_tenor_years, self.project.project_life
                ),
            ));
        }
        Ok(())
    }
}

/// Inputs that passed [`ModelInputs::validate`]. Immutable for the run.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ValidatedInputs(ModelInputs);

impl Deref for ValidatedInputs {
    type Target = ModelInputs;

    fn deref(&self) -> &ModelInputs {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

pub(crate) fn check_range(field: &str, value: Decimal, min: Decimal, max: Decimal) -> BessFinanceResult<()> {
    if value < min || value > max {
        return Err(BessFinanceError::invalid(
            field,
            format!("Must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &str, value: Decimal) -> BessFinanceResult<()> {
    if value < Decimal::ZERO {
        return Err(BessFinanceError::invalid(
            field,
            format!("Must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn check_positive(field: &str, value: Decimal) -> BessFinanceResult<()> {
    if value <= Decimal::ZERO {
        return Err(BessFinanceError::invalid(
            field,
            format!("Must be positive, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn check_years(field: &str, value: u32, min: u32) -> BessFinanceResult<()> {
    if value < min || value > MAX_PROJECT_LIFE {
        return Err(BessFinanceError::invalid(
            field,
            format!("Must be between {min} and {MAX_PROJECT_LIFE} years, got {value}"),
        ));
    }
    Ok(())
}
