use bess_finance_core::cashflow::simulate;
use bess_finance_core::inputs::{AmortizationType, FloorType, ModelInputs, TollingTranche};
use bess_finance_core::time_value::{npv, IrrNote};
use bess_finance_core::{calculate_kpis, run_financial_model, BessFinanceError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A project with every cost and revenue switched off.
fn bare_project(project_life: u32) -> ModelInputs {
    let mut inputs = ModelInputs::default();
    inputs.project.project_life = project_life;
    inputs.project.degradation_rate = Decimal::ZERO;
    inputs.capex_opex.initial_capex_per_mwh = Decimal::ZERO;
    inputs.capex_opex.fixed_om_per_mw_year = Decimal::ZERO;
    inputs.capex_opex.insurance_grid_per_mw_year = Decimal::ZERO;
    inputs.capex_opex.decommissioning_per_mw = Decimal::ZERO;
    inputs.financial.debt_pct_on_capex = Decimal::ZERO;
    inputs.financial.debt_upfront_fees_pct = Decimal::ZERO;
    inputs.financial.ires = Decimal::ZERO;
    inputs.financial.irap = Decimal::ZERO;
    inputs.revenues.cm.price = Decimal::ZERO;
    inputs.revenues.tolling_tranches.clear();
    inputs
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_floor_only_single_year_project() {
    let mut inputs = bare_project(1);
    // 50 MW * 0.5 share * 4 = 100
    inputs.revenues.cm.price = dec!(4);

    let out = run_financial_model(&inputs).unwrap();
    let rows = &out.result.rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].revenue_floor, dec!(100));
    assert_eq!(rows[1].taxes, Decimal::ZERO);
    assert_eq!(rows[1].project_fcf, dec!(100));
    assert_eq!(rows[0].project_fcf, Decimal::ZERO);

    let kpis = &out.result.kpis;
    // NPV at 0% over [0, 100]
    let series = [rows[0].project_fcf, rows[1].project_fcf];
    assert_eq!(npv(Decimal::ZERO, &series), Some(dec!(100)));
    assert_eq!(kpis.project_irr, None);
    assert_eq!(kpis.project_irr_note, Some(IrrNote::NoSignChange));
    assert!(out.warnings.iter().any(|w| w == "Project IRR: no_sign_change"));
}

#[test]
fn test_single_year_annuity_loan() {
    let mut inputs = bare_project(1);
    inputs.project.nominal_energy_mwh = dec!(1);
    inputs.capex_opex.initial_capex_per_mwh = dec!(1000);
    inputs.financial.debt_pct_on_capex = Decimal::ONE;
    inputs.financial.interest_rate = dec!(0.10);
    inputs.financial.debt_tenor_years = 1;
    inputs.financial.amortization_type = AmortizationType::Annuity;

    let sim = simulate(&inputs.validate().unwrap());
    let y1 = &sim.rows[1];
    assert_eq!(sim.derived.debt_amount, dec!(1000));
    assert_eq!(y1.debt_service, dec!(1100));
    assert_eq!(y1.interest, dec!(100));
    assert_eq!(y1.principal, dec!(1000));
    assert_eq!(y1.debt_close, Decimal::ZERO);
}

#[test]
fn test_discounted_upfront_royalty() {
    let mut inputs = bare_project(2);
    inputs.revenues.cm.price = dec!(4);
    inputs.municipality.enabled = true;
    inputs.municipality.royalty_pct = dec!(0.05);
    inputs.municipality.discounted_upfront = true;
    inputs.municipality.discount_rate_wacc = Decimal::ZERO;

    let sim = simulate(&inputs.validate().unwrap());
    let totals: Vec<Decimal> = sim.rows.iter().map(|r| r.revenue_total).collect();
    assert_eq!(totals, vec![dec!(0), dec!(100), dec!(100)]);
    assert_eq!(sim.rows[0].municipality_royalty_upfront, dec!(10));
    assert_eq!(sim.rows[0].project_fcf, dec!(-10));
    assert!(sim.rows[1..].iter().all(|r| r.municipality_royalty.is_zero()));
}

// ===========================================================================
// Waterfall properties
// ===========================================================================

#[test]
fn test_ebt_identity_holds_every_year() {
    let mut inputs = ModelInputs::default();
    inputs.capex_opex.augmentation_year_1 = 8;
    inputs.municipality.enabled = true;
    let sim = simulate(&inputs.validate().unwrap());
    for row in &sim.rows {
        assert_eq!(row.ebt, row.ebitda - row.depreciation - row.interest, "year {}", row.year);
    }
}

#[test]
fn test_loss_carryforward_never_negative() {
    let mut inputs = ModelInputs::default();
    // Thin revenues so early years run at a loss
    inputs.revenues.cm.price = dec!(10000);
    inputs.revenues.cm.duration_years = 20;
    let sim = simulate(&inputs.validate().unwrap());
    assert!(sim.rows.iter().any(|r| r.loss_cf_end > Decimal::ZERO));
    assert!(sim.rows.iter().all(|r| r.loss_cf_end >= Decimal::ZERO));
    assert!(sim.rows.iter().all(|r| r.loss_used >= Decimal::ZERO));
}

#[test]
fn test_principal_repaid_within_tenor() {
    for amortization in [AmortizationType::Annuity, AmortizationType::EqualPrincipal] {
        let mut inputs = ModelInputs::default();
        inputs.financial.amortization_type = amortization;
        let sim = simulate(&inputs.validate().unwrap());
        let repaid: Decimal = sim.rows.iter().map(|r| r.principal).sum();
        assert!((repaid - dec!(30_000_000)).abs() < dec!(0.000001));
        assert_eq!(sim.rows[10].debt_close, Decimal::ZERO);
        assert!(sim.rows[11..].iter().all(|r| r.debt_service.is_zero()));
    }
}

#[test]
fn test_reserve_reaches_target_and_releases_in_final_year() {
    let sim = simulate(&ModelInputs::default().validate().unwrap());
    let life = sim.rows.len() - 1;

    assert_eq!(sim.rows[0].reserve_contribution, Decimal::ZERO);
    assert_eq!(sim.rows[life].reserve_contribution, Decimal::ZERO);
    assert_eq!(sim.rows[life].reserve_balance, dec!(750_000));
    assert_eq!(sim.rows[life].reserve_release, dec!(750_000));
    assert!(sim.rows[..life].iter().all(|r| r.reserve_release.is_zero()));
}

#[test]
fn test_reserve_interest_reduces_contributions() {
    let mut inputs = ModelInputs::default();
    inputs.capex_opex.reserve_interest_rate = dec!(0.02);
    let sim = simulate(&inputs.validate().unwrap());
    let life = sim.rows.len() - 1;

    let paid_in: Decimal = sim.rows.iter().map(|r| -r.reserve_contribution).sum();
    assert!(paid_in < dec!(750_000));
    assert!(sim.rows[life - 1].reserve_balance >= dec!(750_000));
    // Final-year interest accrues on the opening balance before release
    let expected = sim.rows[life - 1].reserve_balance * dec!(1.02);
    assert!((sim.rows[life].reserve_release - expected).abs() < dec!(0.000001));
}

#[test]
fn test_merchant_suppresses_every_tolling_tranche() {
    let mut inputs = ModelInputs::default();
    inputs.revenues.tolling_tranches.push(TollingTranche {
        base_price_per_mw_year: dec!(40000),
        start_year: 6,
        end_year: 12,
        booked_cycles: dec!(1),
    });
    let without_merchant = simulate(&inputs.clone().validate().unwrap());
    assert!(without_merchant.rows[3].revenue_tolling > Decimal::ZERO);
    assert!(without_merchant.rows[9].revenue_tolling > Decimal::ZERO);
    assert!(without_merchant.rows[15].revenue_tolling.is_zero());

    inputs.revenues.merchant.enabled = true;
    let with_merchant = simulate(&inputs.validate().unwrap());
    assert!(with_merchant.rows.iter().all(|r| r.revenue_tolling.is_zero()));
    assert!(with_merchant.rows[1].revenue_merchant > Decimal::ZERO);
}

#[test]
fn test_macse_floor_priced_on_energy() {
    let mut inputs = bare_project(3);
    inputs.revenues.floor_type = FloorType::Macse;
    inputs.revenues.macse.price = dec!(90);
    inputs.revenues.macse.share = dec!(0.5);
    let sim = simulate(&inputs.validate().unwrap());
    // 200 MWh * 0.5 * 90
    assert_eq!(sim.rows[1].revenue_floor, dec!(9000));
}

#[test]
fn test_terminal_value_added_in_final_year() {
    let mut inputs = bare_project(4);
    inputs.revenues.terminal_value.enabled = true;
    inputs.revenues.terminal_value.per_mw = dec!(1000);
    let sim = simulate(&inputs.validate().unwrap());
    assert_eq!(sim.rows[4].revenue_floor, dec!(50_000));
    assert!(sim.rows[..4].iter().all(|r| r.revenue_floor.is_zero()));
}

// ===========================================================================
// KPIs on the reference project
// ===========================================================================

#[test]
fn test_reference_project_kpis_consistent() {
    let inputs = ModelInputs::default().validate().unwrap();
    let sim = simulate(&inputs);
    let kpis = calculate_kpis(&sim.rows, &inputs.financial);

    let defined: Vec<Decimal> = sim.rows.iter().filter_map(|r| r.dscr).collect();
    assert_eq!(kpis.min_dscr, defined.iter().copied().min());
    assert_eq!(kpis.discount_rate_project, Some(sim.rows[0].discount_rate_project));
}

#[test]
fn test_equity_irr_is_root_of_equity_cash_flows() {
    let mut inputs = bare_project(5);
    // 200 MWh * 1000 = 200k all-equity, repaid by 50k a year for five years
    inputs.capex_opex.initial_capex_per_mwh = dec!(1000);
    inputs.revenues.cm.price = dec!(2000);
    let inputs = inputs.validate().unwrap();
    let sim = simulate(&inputs);
    let kpis = calculate_kpis(&sim.rows, &inputs.financial);

    assert_eq!(sim.rows[0].equity_cf, dec!(-200_000));
    assert!(sim.rows[1..].iter().all(|r| r.equity_cf == dec!(50_000)));

    let rate = kpis.equity_irr.expect("equity IRR defined");
    assert_eq!(kpis.equity_irr_note, None);
    assert!((rate - dec!(0.0793)).abs() < dec!(0.0005), "IRR = {rate}");
    let at_root = npv(rate, &sim.equity_cf()).unwrap();
    assert!(at_root.abs() < dec!(0.0001), "NPV at IRR = {at_root}");
    assert_eq!(kpis.project_irr, Some(rate));
}

#[test]
fn test_output_table_column_names() {
    let out = run_financial_model(&ModelInputs::default()).unwrap();
    let json = serde_json::to_value(&out.result.rows[1]).unwrap();
    for column in [
        "Year",
        "Revenue_Total",
        "Municipality_Royalty_Upfront",
        "Loss_CF_End",
        "Reserve_Balance",
        "Cash_Reserve",
        "Principal",
        "Debt_Close",
        "DSCR",
        "Project_FCF",
        "Equity_CF",
        "Discount_Rate_Project",
        "Total_Tax_Rate",
    ] {
        assert!(json.get(column).is_some(), "missing column {column}");
    }
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_debt_share_without_tenor_rejected() {
    let mut inputs = ModelInputs::default();
    inputs.financial.debt_tenor_years = 0;
    match run_financial_model(&inputs).unwrap_err() {
        BessFinanceError::InvalidInput { field, .. } => {
            assert_eq!(field, "financial.debt_tenor_years")
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_tenor_longer_than_life_rejected_when_drawn() {
    let mut inputs = ModelInputs::default();
    inputs.project.project_life = 8;
    match inputs.clone().validate() {
        Err(BessFinanceError::InvalidInput { field, .. }) => {
            assert_eq!(field, "financial.debt_tenor_years")
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }

    inputs.financial.debt_pct_on_capex = Decimal::ZERO;
    assert!(inputs.validate().is_ok());
}

#[test]
fn test_partial_json_uses_defaults() {
    let inputs: ModelInputs = serde_json::from_str(
        r#"{ "project": { "project_life": 12 }, "financial": { "amortization_type": "equal_principal" } }"#,
    )
    .unwrap();
    assert_eq!(inputs.project.project_life, 12);
    assert_eq!(inputs.project.nominal_power_mw, dec!(50));
    assert_eq!(inputs.financial.amortization_type, AmortizationType::EqualPrincipal);
    assert!(inputs.apply_degradation);
}
