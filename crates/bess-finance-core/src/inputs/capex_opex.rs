use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{check_non_negative, check_range, check_years};
use crate::types::{Money, Rate, Year};
use crate::BessFinanceResult;

/// Investment and running-cost assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapexOpex {
    /// Initial CAPEX per MWh of nominal energy
    #[serde(alias = "initial_capex_per_mw")]
    pub initial_capex_per_mwh: Money,
    /// Share of CAPEX attributable to the battery modules
    pub battery_share_of_capex: Rate,
    /// Cost of one augmentation event as a share of battery CAPEX
    #[serde(alias = "augmentation_cost_pct_of_batt_capex")]
    pub augmentation_cost_pct_of_battery_capex: Rate,
    /// First augmentation year, 0 = disabled
    pub augmentation_year_1: Year,
    /// Second augmentation year, 0 = disabled
    pub augmentation_year_2: Year,
    pub fixed_om_per_mw_year: Money,
    pub insurance_grid_per_mw_year: Money,
    /// End-of-life decommissioning cost per MW
    pub decommissioning_per_mw: Money,
    /// One-off land purchase at year 0, not financed and not depreciated
    #[serde(alias = "land_cost_eur")]
    pub land_cost: Money,
    /// Yield earned by the decommissioning reserve on its opening balance
    pub reserve_interest_rate: Rate,
}

impl Default for CapexOpex {
    fn default() -> Self {
        CapexOpex {
            initial_capex_per_mwh: dec!(250000),
            battery_share_of_capex: dec!(0.60),
            augmentation_cost_pct_of_battery_capex: dec!(0.25),
            augmentation_year_1: 0,
            augmentation_year_2: 0,
            fixed_om_per_mw_year: dec!(8000),
            insurance_grid_per_mw_year: dec!(5000),
            decommissioning_per_mw: dec!(15000),
            land_cost: Decimal::ZERO,
            reserve_interest_rate: Decimal::ZERO,
        }
    }
}

impl CapexOpex {
    pub fn validate(&self) -> BessFinanceResult<()> {
        check_non_negative("capex_opex.initial_capex_per_mwh", self.initial_capex_per_mwh)?;
        check_range(
            "capex_opex.battery_share_of_capex",
            self.battery_share_of_capex,
            dec!(0),
            dec!(1),
        )?;
        check_range(
            "capex_opex.augmentation_cost_pct_of_battery_capex",
            self.augmentation_cost_pct_of_battery_capex,
            dec!(0),
            dec!(2),
        )?;
        check_years("capex_opex.augmentation_year_1", self.augmentation_year_1, 0)?;
        check_years("capex_opex.augmentation_year_2", self.augmentation_year_2, 0)?;
        check_non_negative("capex_opex.fixed_om_per_mw_year", self.fixed_om_per_mw_year)?;
        check_non_negative(
            "capex_opex.insurance_grid_per_mw_year",
            self.insurance_grid_per_mw_year,
        )?;
        check_non_negative("capex_opex.decommissioning_per_mw", self.decommissioning_per_mw)?;
        check_non_negative("capex_opex.land_cost", self.land_cost)?;
        check_range(
            "capex_opex.reserve_interest_rate",
            self.reserve_interest_rate,
            dec!(0),
            dec!(0.20),
        )?;
        Ok(())
    }
}
