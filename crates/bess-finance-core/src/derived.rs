use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::inputs::ModelInputs;
use crate::types::{Money, Rate, Year};

const DAYS_PER_YEAR: Decimal = dec!(365);

/// Second-order quantities derived from the input bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// 365 × (1 − unavailability)
    pub operating_days_per_year: Decimal,
    /// Nominal energy × (SOC max − SOC min)
    pub cycled_energy_mwh: Decimal,
    /// Cycled energy × cycles/day × operating days
    pub annual_cycled_energy_mwh: Decimal,
    /// Nominal energy × CAPEX per MWh (land excluded)
    pub total_capex: Money,
    pub land_cost: Money,
    pub total_om_per_mw_year: Money,
    pub opex_per_year: Money,
    pub augmentation_cost_per_event: Money,
    /// Enabled augmentation years within project life, ascending, no duplicates
    pub augmentation_years: Vec<Year>,
    pub decommissioning_cost: Money,
    pub debt_amount: Money,
    pub equity_amount: Money,
    pub debt_upfront_fees: Money,
    pub total_corporate_tax_rate: Rate,
    pub discount_rate_project: Rate,
}

impl DerivedMetrics {
    pub fn compute(inputs: &ModelInputs) -> Self {
        let pj = &inputs.project;
        let cx = &inputs.capex_opex;
        let fp = &inputs.financial;

        let operating_days_per_year = DAYS_PER_YEAR * (Decimal::ONE - pj.grid_system_unavailability);
        let cycled_energy_mwh = pj.nominal_energy_mwh * pj.soc_window();
        let annual_cycled_energy_mwh = cycled_energy_mwh * pj.cycles_per_day * operating_days_per_year;

        let total_capex = pj.nominal_energy_mwh * cx.initial_capex_per_mwh;
        let total_om_per_mw_year = cx.fixed_om_per_mw_year + cx.insurance_grid_per_mw_year;
        let opex_per_year = total_om_per_mw_year * pj.nominal_power_mw;

        let augmentation_cost_per_event = total_capex
            * cx.battery_share_of_capex
            * cx.augmentation_cost_pct_of_battery_capex;
        let mut augmentation_years: Vec<Year> = [cx.augmentation_year_1, cx.augmentation_year_2]
            .into_iter()
            .filter(|&y| y > 0 && y <= pj.project_life)
            .collect();
        augmentation_years.sort_unstable();
        augmentation_years.dedup();

        let debt_amount = total_capex * fp.debt_pct_on_capex;

        DerivedMetrics {
            operating_days_per_year,
            cycled_energy_mwh,
            annual_cycled_energy_mwh,
            total_capex,
            land_cost: cx.land_cost,
            total_om_per_mw_year,
            opex_per_year,
            augmentation_cost_per_event,
            augmentation_years,
            decommissioning_cost: cx.decommissioning_per_mw * pj.nominal_power_mw,
            debt_amount,
            equity_amount: total_capex - debt_amount,
            debt_upfront_fees: debt_amount * fp.debt_upfront_fees_pct,
            total_corporate_tax_rate: fp.total_tax_rate(),
            discount_rate_project: fp.discount_rate_project(),
        }
    }
}
