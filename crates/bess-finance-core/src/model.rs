use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cashflow::{simulate, Simulation, YearRow};
use crate::derived::DerivedMetrics;
use crate::inputs::{ModelInputs, ValidatedInputs};
use crate::kpi::{calculate_kpis, Kpis};
use crate::schedules::debt::DebtSchedule;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::BessFinanceResult;

/// Lenders' usual covenant floor on annual DSCR.
pub const DSCR_COVENANT: Rate = dec!(1.20);

const METHODOLOGY: &str =
    "BESS project finance: annual cash-flow waterfall, sinking-fund decommissioning reserve, grid-bracketed IRR";

/// Everything one engine run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialModelOutput {
    pub derived: DerivedMetrics,
    pub debt_schedule: DebtSchedule,
    pub rows: Vec<YearRow>,
    pub kpis: Kpis,
}

/// Validate, simulate and extract KPIs in one call.
pub fn run_financial_model(
    inputs: &ModelInputs,
) -> BessFinanceResult<ComputationOutput<FinancialModelOutput>> {
    let start = Instant::now();
    let validated = inputs.clone().validate()?;

    let Simulation {
        derived,
        debt_schedule,
        rows,
    } = simulate(&validated);
    let kpis = calculate_kpis(&rows, &validated.financial);

    let mut warnings = input_warnings(&validated);
    warnings.extend(kpi_warnings(&kpis));

    let output = FinancialModelOutput {
        derived,
        debt_schedule,
        rows,
        kpis,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(METHODOLOGY, inputs, warnings, elapsed, output))
}

/// Validate and run the year loop only.
pub fn run_simulation(inputs: &ModelInputs) -> BessFinanceResult<ComputationOutput<Simulation>> {
    let start = Instant::now();
    let validated = inputs.clone().validate()?;
    let simulation = simulate(&validated);
    let warnings = input_warnings(&validated);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(METHODOLOGY, inputs, warnings, elapsed, simulation))
}

/// Validate and compute the derived metrics alone.
pub fn derive_metrics(inputs: &ModelInputs) -> BessFinanceResult<ComputationOutput<DerivedMetrics>> {
    let start = Instant::now();
    inputs.check()?;
    let derived = DerivedMetrics::compute(inputs);
    tracing::debug!(
        total_capex = %derived.total_capex,
        debt_amount = %derived.debt_amount,
        "derived metrics"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "BESS derived metrics",
        inputs,
        Vec::new(),
        elapsed,
        derived,
    ))
}

/// Diagnostics about inputs that are valid but partly ignored.
fn input_warnings(inputs: &ValidatedInputs) -> Vec<String> {
    let mut warnings = Vec::new();
    let life = inputs.project.project_life;

    for (name, year) in [
        ("augmentation_year_1", inputs.capex_opex.augmentation_year_1),
        ("augmentation_year_2", inputs.capex_opex.augmentation_year_2),
    ] {
        if year > life {
            warnings.push(format!(
                "{name} ({year}) is beyond the project life ({life}) and was ignored"
            ));
        }
    }

    let rv = &inputs.revenues;
    if rv.merchant.enabled && (1..=life).any(|y| rv.tolling_configured_in(y)) {
        warnings.push(
            "Tolling contracts are configured but merchant sales are enabled; tolling revenue set to zero"
                .to_string(),
        );
    }

    warnings
}

fn kpi_warnings(kpis: &Kpis) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(dscr) = kpis.min_dscr {
        if dscr < DSCR_COVENANT {
            warnings.push(format!(
                "Minimum DSCR {:.2}x is below the {DSCR_COVENANT}x covenant",
                dscr
            ));
        }
    }
    if let Some(note) = kpis.equity_irr_note {
        warnings.push(format!("Equity IRR: {note}"));
    }
    if let Some(note) = kpis.project_irr_note {
        warnings.push(format!("Project IRR: {note}"));
    }
    if kpis.equity_npv.is_some_and(|v| v < Decimal::ZERO) {
        warnings.push(format!(
            "Equity NPV is negative at {} discount rate",
            kpis.discount_rate_equity
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BessFinanceError;

    #[test]
    fn test_reference_project_runs() {
        let out = run_financial_model(&ModelInputs::default()).unwrap();
        assert_eq!(out.result.rows.len(), 21);
        assert_eq!(out.result.debt_schedule.rows.len(), 21);
        assert_eq!(out.result.kpis.discount_rate_equity, dec!(0.10));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut inputs = ModelInputs::default();
        inputs.project.soc_min = dec!(0.95);
        match run_financial_model(&inputs) {
            Err(BessFinanceError::InvalidInput { .. }) => {}
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_warns_on_ignored_augmentation() {
        let mut inputs = ModelInputs::default();
        inputs.capex_opex.augmentation_year_2 = 25;
        let out = run_simulation(&inputs).unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("augmentation_year_2 (25)")));
    }

    #[test]
    fn test_warns_when_merchant_overrides_tolling() {
        let mut inputs = ModelInputs::default();
        inputs.revenues.merchant.enabled = true;
        let out = run_financial_model(&inputs).unwrap();
        assert!(out.result.rows.iter().all(|r| r.revenue_tolling.is_zero()));
        assert!(out.warnings.iter().any(|w| w.contains("tolling revenue set to zero")));
    }

    #[test]
    fn test_low_dscr_warning() {
        let kpis = Kpis {
            equity_irr: None,
            project_irr: None,
            equity_npv: Some(dec!(-1)),
            project_npv: None,
            min_dscr: Some(dec!(1.05)),
            discount_rate_equity: dec!(0.10),
            discount_rate_project: None,
            equity_irr_note: None,
            project_irr_note: None,
        };
        let warnings = kpi_warnings(&kpis);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Minimum DSCR 1.05x"));
    }

    #[test]
    fn test_derive_metrics_envelope() {
        let out = derive_metrics(&ModelInputs::default()).unwrap();
        assert_eq!(out.result.total_capex, dec!(50_000_000));
        assert!(out.warnings.is_empty());
    }
}
