use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::check_range;
use crate::types::Rate;
use crate::BessFinanceResult;

/// Host-municipality royalty terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MunicipalityFees {
    pub enabled: bool,
    /// Share of total revenue owed each year
    pub royalty_pct: Rate,
    /// Settle all future royalties as one discounted payment at year 0
    pub discounted_upfront: bool,
    pub discount_rate_wacc: Rate,
}

impl Default for MunicipalityFees {
    fn default() -> Self {
        MunicipalityFees {
            enabled: false,
            royalty_pct: dec!(0.03),
            discounted_upfront: false,
            discount_rate_wacc: dec!(0.08),
        }
    }
}

impl MunicipalityFees {
    pub fn validate(&self) -> BessFinanceResult<()> {
        check_range("municipality.royalty_pct", self.royalty_pct, dec!(0), dec!(0.20))?;
        check_range(
            "municipality.discount_rate_wacc",
            self.discount_rate_wacc,
            dec!(0),
            dec!(0.40),
        )?;
        Ok(())
    }
}
