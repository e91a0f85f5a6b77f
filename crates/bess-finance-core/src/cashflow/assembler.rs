use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::row::YearRow;
use crate::derived::DerivedMetrics;
use crate::inputs::{ModelInputs, ValidatedInputs};
use crate::revenue::{build_revenue_schedule, compute_royalties, RevenueLine, RoyaltySchedule};
use crate::schedules::debt::{build_debt_schedule, DebtSchedule, DebtTranche};
use crate::schedules::depreciation::{allocate_depreciation, CapexTranche};
use crate::schedules::reserve::SinkingFund;
use crate::tax::{compute_taxes, TaxLine, TaxRates};
use crate::types::{Money, Year};

/// State carried from one year into the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearState {
    pub loss_carryforward: Money,
    pub reserve_balance: Money,
}

/// Everything that can be computed before the year loop.
#[derive(Debug, Clone)]
pub struct Schedules {
    pub derived: DerivedMetrics,
    pub debt: DebtSchedule,
    pub depreciation: Vec<Money>,
    pub revenue: Vec<RevenueLine>,
    pub royalties: RoyaltySchedule,
    pub reserve: SinkingFund,
}

impl Schedules {
    pub fn build(inputs: &ModelInputs) -> Self {
        let derived = DerivedMetrics::compute(inputs);
        let life = inputs.project.project_life;

        let debt = build_debt_schedule(
            &DebtTranche::new(derived.debt_amount, &inputs.financial),
            life,
        );

        let mut tranches = vec![CapexTranche {
            start_year: 1,
            amount: derived.total_capex,
        }];
        tranches.extend(derived.augmentation_years.iter().map(|&y| CapexTranche {
            start_year: y,
            amount: derived.augmentation_cost_per_event,
        }));
        let depreciation =
            allocate_depreciation(&tranches, inputs.financial.depreciation_life_years, life);

        let revenue = build_revenue_schedule(inputs, &derived);
        let totals: Vec<Money> = revenue.iter().map(RevenueLine::total).collect();
        let royalties = compute_royalties(&inputs.municipality, &totals);

        let reserve = SinkingFund::new(
            derived.decommissioning_cost,
            inputs.capex_opex.reserve_interest_rate,
            life,
        );

        Schedules {
            derived,
            debt,
            depreciation,
            revenue,
            royalties,
            reserve,
        }
    }
}

/// Full output of one engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub derived: DerivedMetrics,
    pub debt_schedule: DebtSchedule,
    /// One row per year, 0..=project_life
    pub rows: Vec<YearRow>,
}

impl Simulation {
    pub fn project_fcf(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.project_fcf).collect()
    }

    pub fn equity_cf(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.equity_cf).collect()
    }
}

/// Compute one year's row from the pre-built schedules and the state
/// entering the year. Returns the row and the state for the next year.
pub fn assemble_year(
    inputs: &ModelInputs,
    schedules: &Schedules,
    year: Year,
    state: YearState,
) -> (YearRow, YearState) {
    let derived = &schedules.derived;
    let fp = &inputs.financial;
    let life = inputs.project.project_life;
    let idx = year as usize;

    let revenue = schedules.revenue.get(idx).copied().unwrap_or_default();
    let revenue_total = revenue.total();

    let opex = if year == 0 {
        Decimal::ZERO
    } else {
        derived.opex_per_year
    };
    let royalty_yearly = schedules.royalties.yearly_at(idx);
    let royalty_upfront = if year == 0 {
        schedules.royalties.upfront
    } else {
        Decimal::ZERO
    };

    let ebitda = revenue_total - opex - royalty_yearly;
    let depreciation = schedules.depreciation.get(idx).copied().unwrap_or_default();
    let debt = schedules.debt.row(year);
    let ebt = ebitda - depreciation - debt.interest;

    let (tax, loss_carryforward) = if year == 0 {
        (
            TaxLine {
                loss_cf_end: state.loss_carryforward,
                ..TaxLine::default()
            },
            state.loss_carryforward,
        )
    } else {
        compute_taxes(
            ebitda,
            depreciation,
            debt.interest,
            state.loss_carryforward,
            TaxRates {
                ires: fp.ires,
                irap: fp.irap,
            },
        )
    };
    let taxes = tax.total();

    let capex = if year == 0 {
        derived.total_capex + derived.land_cost
    } else {
        Decimal::ZERO
    };
    let augmentation = if derived.augmentation_years.contains(&year) {
        derived.augmentation_cost_per_event
    } else {
        Decimal::ZERO
    };
    let decommissioning = if year == life && year != 0 {
        derived.decommissioning_cost
    } else {
        Decimal::ZERO
    };

    let (reserve, reserve_balance) = schedules.reserve.step(year, state.reserve_balance);
    let cash_reserve = reserve.net_cash();

    let cfads = ebitda - taxes;
    let dscr = if debt.debt_service > Decimal::ZERO {
        Some(cfads / debt.debt_service)
    } else {
        None
    };

    let project_fcf =
        ebitda - taxes - capex - augmentation - royalty_upfront + cash_reserve - decommissioning;
    let equity_cf = if year == 0 {
        -(capex - derived.debt_amount) - derived.debt_upfront_fees - royalty_upfront
    } else {
        project_fcf - debt.debt_service
    };

    let row = YearRow {
        year,
        revenue_floor: revenue.floor,
        revenue_tolling: revenue.tolling,
        revenue_merchant: revenue.merchant,
        revenue_total,
        municipality_royalty: royalty_yearly + royalty_upfront,
        municipality_royalty_upfront: royalty_upfront,
        opex,
        ebitda,
        depreciation,
        interest: debt.interest,
        ebt,
        taxable_ires: tax.taxable_ires,
        loss_cf_end: tax.loss_cf_end,
        loss_used: tax.loss_used,
        ires: tax.ires,
        irap_base: tax.irap_base,
        irap: tax.irap,
        taxes,
        capex,
        augmentation,
        reserve_contribution: reserve.contribution,
        reserve_interest: reserve.interest,
        reserve_release: reserve.release,
        reserve_balance: reserve.balance,
        cash_reserve,
        decommissioning,
        principal: debt.principal,
        debt_close: debt.closing_balance,
        debt_service: debt.debt_service,
        cfads,
        dscr,
        project_fcf,
        equity_cf,
        debt_amount: derived.debt_amount,
        debt_fees: derived.debt_upfront_fees,
        discount_rate_equity: fp.discount_rate_equity,
        discount_rate_project: derived.discount_rate_project,
        total_tax_rate: derived.total_corporate_tax_rate,
    };

    let next = YearState {
        loss_carryforward,
        reserve_balance,
    };
    (row, next)
}

/// Run the deterministic waterfall for years 0..=project_life.
///
/// The year loop is a fold over [`YearState`]; it never fails on validated
/// inputs.
#[tracing::instrument(level = "debug", skip_all, fields(project_life = inputs.project.project_life))]
pub fn simulate(inputs: &ValidatedInputs) -> Simulation {
    let schedules = Schedules::build(inputs);

    let mut rows = Vec::with_capacity(inputs.project.project_life as usize + 1);
    let end_state = (0..=inputs.project.project_life).fold(YearState::default(), |state, year| {
        let (row, next) = assemble_year(inputs, &schedules, year, state);
        rows.push(row);
        next
    });

    tracing::debug!(
        rows = rows.len(),
        loss_carryforward = %end_state.loss_carryforward,
        debt_amount = %schedules.derived.debt_amount,
        "simulation complete"
    );

    Simulation {
        derived: schedules.derived,
        debt_schedule: schedules.debt,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn run(inputs: ModelInputs) -> Simulation {
        simulate(&inputs.validate().unwrap())
    }

    #[test]
    fn test_one_row_per_year() {
        let sim = run(ModelInputs::default());
        assert_eq!(sim.rows.len(), 21);
        for (i, row) in sim.rows.iter().enumerate() {
            assert_eq!(row.year as usize, i);
        }
    }

    #[test]
    fn test_year_zero_holds_only_investment() {
        let mut inputs = ModelInputs::default();
        inputs.capex_opex.land_cost = dec!(1_000_000);
        let sim = run(inputs);
        let y0 = &sim.rows[0];
        assert_eq!(y0.revenue_total, Decimal::ZERO);
        assert_eq!(y0.opex, Decimal::ZERO);
        assert_eq!(y0.taxes, Decimal::ZERO);
        assert_eq!(y0.capex, dec!(51_000_000));
        assert_eq!(y0.debt_close, dec!(30_000_000));
        assert_eq!(y0.dscr, None);
        assert_eq!(y0.project_fcf, dec!(-51_000_000));
        // Equity funds land, the unlevered share and the arrangement fee
        assert_eq!(y0.equity_cf, dec!(-21_300_000));
    }

    #[test]
    fn test_equity_cf_is_fcf_less_debt_service() {
        let sim = run(ModelInputs::default());
        for row in &sim.rows[1..] {
            assert_eq!(row.equity_cf, row.project_fcf - row.debt_service);
        }
    }

    #[test]
    fn test_dscr_undefined_after_tenor() {
        let sim = run(ModelInputs::default());
        assert!(sim.rows[1..=10].iter().all(|r| r.dscr.is_some()));
        assert!(sim.rows[11..].iter().all(|r| r.dscr.is_none()));
    }

    #[test]
    fn test_augmentation_event_outflow() {
        let mut inputs = ModelInputs::default();
        inputs.capex_opex.augmentation_year_1 = 10;
        let sim = run(inputs);
        assert_eq!(sim.rows[10].augmentation, dec!(7_500_000));
        assert!(sim.rows.iter().filter(|r| r.augmentation > Decimal::ZERO).count() == 1);
        // Initial 50m over 15 years plus 7.5m over 15 years from year 10
        assert_eq!(sim.rows[10].depreciation, dec!(50_000_000) / dec!(15) + dec!(500_000));
    }

    #[test]
    fn test_decommissioning_offset_by_reserve_release() {
        let sim = run(ModelInputs::default());
        let last = sim.rows.last().unwrap();
        assert_eq!(last.decommissioning, dec!(750_000));
        assert_eq!(last.reserve_release, dec!(750_000));
        assert_eq!(last.cash_reserve, dec!(750_000));
        let contributed: Decimal = sim.rows.iter().map(|r| r.reserve_contribution).sum();
        assert_eq!(contributed, dec!(-750_000));
    }

    #[test]
    fn test_reserve_outside_ebitda() {
        let sim = run(ModelInputs::default());
        let row = &sim.rows[3];
        assert_eq!(row.ebitda, row.revenue_total - row.opex - row.municipality_royalty);
        assert_eq!(
            row.project_fcf,
            row.ebitda - row.taxes + row.cash_reserve
        );
    }

    #[test]
    fn test_scalar_columns_broadcast() {
        let sim = run(ModelInputs::default());
        assert!(sim.rows.iter().all(|r| r.debt_amount == dec!(30_000_000)
            && r.debt_fees == dec!(300_000)
            && r.total_tax_rate == dec!(0.279)));
    }
}
