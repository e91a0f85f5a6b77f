use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::derived::DerivedMetrics;
use crate::inputs::{FloorType, ModelInputs};
use crate::types::{Money, Rate, Year};

/// Revenue earned in one year, by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueLine {
    pub floor: Money,
    pub tolling: Money,
    pub merchant: Money,
}

impl RevenueLine {
    pub fn total(&self) -> Money {
        self.floor + self.tolling + self.merchant
    }
}

/// Remaining capacity share in `year`: (1 − rate)^(year − 1), 1 in year 0 and 1.
pub fn degradation_factor(rate: Rate, year: Year) -> Decimal {
    (Decimal::ONE - rate).powu(year.saturating_sub(1) as u64)
}

/// Price escalated from its year-1 level.
fn escalate(price: Money, escalation: Rate, year: Year) -> Money {
    price * (Decimal::ONE + escalation).powu(year.saturating_sub(1) as u64)
}

/// Revenue for a single year.
///
/// Year 0 earns nothing. Merchant sales take precedence over tolling: while
/// merchant is enabled no tolling contract pays, whatever its window.
pub fn revenue_for_year(inputs: &ModelInputs, derived: &DerivedMetrics, year: Year) -> RevenueLine {
    if year == 0 {
        return RevenueLine::default();
    }

    let pj = &inputs.project;
    let rv = &inputs.revenues;

    let factor = if inputs.apply_degradation {
        degradation_factor(pj.degradation_rate, year)
    } else {
        Decimal::ONE
    };
    let power = pj.nominal_power_mw * factor;
    let energy = pj.nominal_energy_mwh * factor;

    let terms = rv.active_floor();
    let mut floor = if year <= terms.duration_years {
        let price = escalate(terms.price, terms.escalation, year);
        match rv.floor_type {
            FloorType::Cm => price * power * terms.share,
            FloorType::Macse => price * energy * terms.share,
        }
    } else {
        Decimal::ZERO
    };
    if rv.terminal_value.enabled && year == pj.project_life {
        floor += rv.terminal_value.per_mw * pj.nominal_power_mw;
    }

    let tolling = if rv.merchant.enabled {
        Decimal::ZERO
    } else {
        let uplift = Decimal::ONE + rv.tolling_profit_sharing_pct;
        rv.tolling_tranches
            .iter()
            .filter(|t| t.is_active(year))
            .map(|t| escalate(t.base_price_per_mw_year, rv.tolling_escalation, year) * power * uplift)
            .sum()
    };

    let merchant = if rv.merchant.enabled {
        let annual_energy =
            energy * pj.soc_window() * pj.cycles_per_day * derived.operating_days_per_year;
        annual_energy
            * escalate(
                rv.merchant.selling_price_per_mwh,
                rv.merchant.price_escalation,
                year,
            )
    } else {
        Decimal::ZERO
    };

    RevenueLine {
        floor,
        tolling,
        merchant,
    }
}

/// Revenue lines for years 0..=project_life.
pub fn build_revenue_schedule(inputs: &ModelInputs, derived: &DerivedMetrics) -> Vec<RevenueLine> {
    (0..=inputs.project.project_life)
        .map(|year| revenue_for_year(inputs, derived, year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::TollingTranche;
    use rust_decimal_macros::dec;

    fn schedule(inputs: &ModelInputs) -> Vec<RevenueLine> {
        build_revenue_schedule(inputs, &DerivedMetrics::compute(inputs))
    }

    #[test]
    fn test_year_zero_is_empty() {
        let lines = schedule(&ModelInputs::default());
        assert_eq!(lines[0], RevenueLine::default());
    }

    #[test]
    fn test_capacity_market_floor() {
        let mut inputs = ModelInputs::default();
        inputs.revenues.tolling_tranches.clear();
        inputs.revenues.cm.escalation = dec!(0.02);
        let lines = schedule(&inputs);
        // 60000 * 50 MW * 0.5
        assert_eq!(lines[1].floor, dec!(1_500_000));
        // 60000 * 1.02 * (50 * 0.99) * 0.5
        assert_eq!(lines[2].floor, dec!(1_514_700));
        assert!(lines[5].floor > Decimal::ZERO);
        assert_eq!(lines[6].floor, Decimal::ZERO);
    }

    #[test]
    fn test_macse_floor_on_energy() {
        let mut inputs = ModelInputs::default();
        inputs.apply_degradation = false;
        inputs.revenues.floor_type = FloorType::Macse;
        let lines = schedule(&inputs);
        // 90 * 200 MWh * 0.5
        assert_eq!(lines[1].floor, dec!(9000));
        assert_eq!(lines[10].floor, dec!(9000));
        assert_eq!(lines[11].floor, Decimal::ZERO);
    }

    #[test]
    fn test_tolling_tranches_sum_with_profit_sharing() {
        let mut inputs = ModelInputs::default();
        inputs.apply_degradation = false;
        inputs.revenues.tolling_profit_sharing_pct = dec!(0.10);
        inputs.revenues.tolling_tranches = vec![
            TollingTranche {
                base_price_per_mw_year: dec!(1000),
                start_year: 1,
                end_year: 3,
                booked_cycles: dec!(1),
            },
            TollingTranche {
                base_price_per_mw_year: dec!(2000),
                start_year: 3,
                end_year: 4,
                booked_cycles: dec!(1),
            },
        ];
        let lines = schedule(&inputs);
        assert_eq!(lines[1].tolling, dec!(55_000));
        assert_eq!(lines[3].tolling, dec!(165_000));
        assert_eq!(lines[4].tolling, dec!(110_000));
        assert_eq!(lines[5].tolling, Decimal::ZERO);
    }

    #[test]
    fn test_merchant_suppresses_tolling() {
        let mut inputs = ModelInputs::default();
        inputs.revenues.merchant.enabled = true;
        let lines = schedule(&inputs);
        assert!(lines.iter().all(|l| l.tolling.is_zero()));
        assert!(lines[1].merchant > Decimal::ZERO);
    }

    #[test]
    fn test_merchant_formula() {
        let mut inputs = ModelInputs::default();
        inputs.apply_degradation = false;
        inputs.revenues.merchant.enabled = true;
        inputs.revenues.merchant.selling_price_per_mwh = dec!(100);
        inputs.revenues.merchant.price_escalation = Decimal::ZERO;
        let lines = schedule(&inputs);
        // 200 * 0.8 * 1 * 357.7 * 100
        assert_eq!(lines[1].merchant, dec!(5_723_200));
    }

    #[test]
    fn test_terminal_value_in_final_year_only() {
        let mut inputs = ModelInputs::default();
        inputs.revenues.terminal_value.enabled = true;
        inputs.revenues.terminal_value.per_mw = dec!(10_000);
        let lines = schedule(&inputs);
        let last = inputs.project.project_life as usize;
        assert_eq!(lines[last].floor, dec!(500_000));
        assert_eq!(lines[last - 1].floor, Decimal::ZERO);
    }

    #[test]
    fn test_degradation_factor() {
        assert_eq!(degradation_factor(dec!(0.1), 0), Decimal::ONE);
        assert_eq!(degradation_factor(dec!(0.1), 1), Decimal::ONE);
        assert_eq!(degradation_factor(dec!(0.1), 3), dec!(0.81));
    }
}
