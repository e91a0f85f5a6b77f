use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Year};

/// One depreciable CAPEX block and the year its charge starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapexTranche {
    pub start_year: Year,
    pub amount: Money,
}

/// Straight-line charge per year 0..=project_life, summed over tranches.
///
/// Every tranche writes off over `min(depreciation_life, project_life)`
/// years from its own start year and stops at project end.
pub fn allocate_depreciation(
    tranches: &[CapexTranche],
    depreciation_life: u32,
    project_life: Year,
) -> Vec<Money> {
    let mut charges = vec![Decimal::ZERO; project_life as usize + 1];
    let life = depreciation_life.min(project_life);
    if life == 0 {
        return charges;
    }

    for tranche in tranches {
        if tranche.amount.is_zero() || tranche.start_year == 0 {
            continue;
        }
        let annual = tranche.amount / Decimal::from(life);
        let last = (tranche.start_year + life - 1).min(project_life);
        for year in tranche.start_year..=last {
            charges[year as usize] += annual;
        }
    }

    charges
}
