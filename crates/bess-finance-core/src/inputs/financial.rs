use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{check_range, check_years};
use crate::types::Rate;
use crate::BessFinanceResult;

/// How the project loan principal is repaid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationType {
    /// Constant debt service (French amortisation)
    #[default]
    Annuity,
    /// Constant principal, declining interest
    EqualPrincipal,
}

/// Financing, tax and discounting assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialParameters {
    pub debt_tenor_years: u32,
    /// Gearing as a share of total CAPEX (land excluded)
    pub debt_pct_on_capex: Rate,
    pub interest_rate: Rate,
    pub amortization_type: AmortizationType,
    /// Arrangement fees paid by equity at financial close
    pub debt_upfront_fees_pct: Rate,
    /// Corporate income tax rate
    pub ires: Rate,
    /// Regional production tax rate
    pub irap: Rate,
    pub depreciation_life_years: u32,
    pub discount_rate_equity: Rate,
}

impl Default for FinancialParameters {
    fn default() -> Self {
        FinancialParameters {
            debt_tenor_years: 10,
            debt_pct_on_capex: dec!(0.60),
            interest_rate: dec!(0.055),
            amortization_type: AmortizationType::Annuity,
            debt_upfront_fees_pct: dec!(0.01),
            ires: dec!(0.24),
            irap: dec!(0.039),
            depreciation_life_years: 15,
            discount_rate_equity: dec!(0.10),
        }
    }
}

impl FinancialParameters {
    pub fn validate(&self) -> BessFinanceResult<()> {
        check_years("financial.debt_tenor_years", self.debt_tenor_years, 0)?;
        check_range("financial.debt_pct_on_capex", self.debt_pct_on_capex, dec!(0), dec!(1))?;
        check_range("financial.interest_rate", self.interest_rate, dec!(0), dec!(0.30))?;
        check_range(
            "financial.debt_upfront_fees_pct",
            self.debt_upfront_fees_pct,
            dec!(0),
            dec!(0.10),
        )?;
        check_range("financial.ires", self.ires, dec!(0), dec!(0.50))?;
        check_range("financial.irap", self.irap, dec!(0), dec!(0.20))?;
        check_years(
            "financial.depreciation_life_years",
            self.depreciation_life_years,
            1,
        )?;
        check_range(
            "financial.discount_rate_equity",
            self.discount_rate_equity,
            dec!(0),
            dec!(0.50),
        )?;
        Ok(())
    }

    /// Combined statutory rate, IRES + IRAP.
    pub fn total_tax_rate(&self) -> Rate {
        self.ires + self.irap
    }

    /// Blended discount rate: E·Re + D·Rd·(1 − IRES).
    pub fn discount_rate_project(&self) -> Rate {
        let debt_weight = self.debt_pct_on_capex;
        let equity_weight = Decimal::ONE - debt_weight;
        equity_weight * self.discount_rate_equity
            + debt_weight * self.interest_rate * (Decimal::ONE - self.ires)
    }
}
