use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::inputs::MunicipalityFees;
use crate::types::Money;

/// Municipality royalty charges over years 0..=project_life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltySchedule {
    /// Single payment at year 0 when settled upfront
    pub upfront: Money,
    /// Yearly charge, reduces EBITDA
    pub yearly: Vec<Money>,
}

impl RoyaltySchedule {
    pub fn yearly_at(&self, year: usize) -> Money {
        self.yearly.get(year).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Royalty charges for the given revenue totals (index = year).
///
/// Upfront settlement discounts each year's royalty with exponent `year − 1`,
/// so year 1 is the undiscounted base period.
pub fn compute_royalties(fees: &MunicipalityFees, revenue_totals: &[Money]) -> RoyaltySchedule {
    let mut yearly = vec![Decimal::ZERO; revenue_totals.len()];

    if !fees.enabled {
        return RoyaltySchedule {
            upfront: Decimal::ZERO,
            yearly,
        };
    }

    if fees.discounted_upfront {
        let one_plus_r = Decimal::ONE + fees.discount_rate_wacc;
        let upfront = revenue_totals
            .iter()
            .enumerate()
            .skip(1)
            .map(|(year, revenue)| {
                revenue * fees.royalty_pct / one_plus_r.powu(year as u64 - 1)
            })
            .sum();
        return RoyaltySchedule { upfront, yearly };
    }

    for (year, revenue) in revenue_totals.iter().enumerate().skip(1) {
        yearly[year] = revenue * fees.royalty_pct;
    }
    RoyaltySchedule {
        upfront: Decimal::ZERO,
        yearly,
    }
}
