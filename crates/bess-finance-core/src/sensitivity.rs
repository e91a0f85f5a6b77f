use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::cashflow::simulate;
use crate::error::BessFinanceError;
use crate::inputs::{FloorType, ModelInputs};
use crate::kpi::{calculate_kpis, Kpis};
use crate::types::{with_metadata, ComputationOutput};
use crate::BessFinanceResult;

/// Largest number of values a single sweep variable may produce.
pub const MAX_SWEEP_POINTS: usize = 201;

/// Input parameter a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityDriver {
    /// CAPEX per MWh of nominal energy
    CapexPerUnit,
    InterestRate,
    DebtPctOnCapex,
    DiscountRateEquity,
    DegradationRate,
    /// Merchant selling price per MWh
    MerchantPrice,
    /// Price of the selected floor mechanism (CM or MACSE)
    FloorPrice,
    /// Base fee of the first tolling tranche
    TollingBasePrice,
    /// Fixed O&M per MW·year
    OpexFixedOm,
}

impl SensitivityDriver {
    fn field(self) -> &'static str {
        match self {
            SensitivityDriver::CapexPerUnit => "capex_opex.initial_capex_per_mwh",
            SensitivityDriver::InterestRate => "financial.interest_rate",
            SensitivityDriver::DebtPctOnCapex => "financial.debt_pct_on_capex",
            SensitivityDriver::DiscountRateEquity => "financial.discount_rate_equity",
            SensitivityDriver::DegradationRate => "project.degradation_rate",
            SensitivityDriver::MerchantPrice => "revenues.merchant.selling_price_per_mwh",
            SensitivityDriver::FloorPrice => "revenues.<floor>.price",
            SensitivityDriver::TollingBasePrice => {
                "revenues.tolling_tranches[0].base_price_per_mw_year"
            }
            SensitivityDriver::OpexFixedOm => "capex_opex.fixed_om_per_mw_year",
        }
    }

    /// Overwrite the driven field of `inputs` with `value`.
    pub fn apply(self, inputs: &mut ModelInputs, value: Decimal) -> BessFinanceResult<()> {
        match self {
            SensitivityDriver::CapexPerUnit => inputs.capex_opex.initial_capex_per_mwh = value,
            SensitivityDriver::InterestRate => inputs.financial.interest_rate = value,
            SensitivityDriver::DebtPctOnCapex => inputs.financial.debt_pct_on_capex = value,
            SensitivityDriver::DiscountRateEquity => inputs.financial.discount_rate_equity = value,
            SensitivityDriver::DegradationRate => inputs.project.degradation_rate = value,
            SensitivityDriver::MerchantPrice => {
                inputs.revenues.merchant.selling_price_per_mwh = value
            }
            SensitivityDriver::FloorPrice => match inputs.revenues.floor_type {
                FloorType::Cm => inputs.revenues.cm.price = value,
                FloorType::Macse => inputs.revenues.macse.price = value,
            },
            SensitivityDriver::TollingBasePrice => {
                let tranche = inputs.revenues.tolling_tranches.first_mut().ok_or_else(|| {
                    BessFinanceError::invalid(self.field(), "No tolling tranche to vary")
                })?;
                tranche.base_price_per_mw_year = value;
            }
            SensitivityDriver::OpexFixedOm => inputs.capex_opex.fixed_om_per_mw_year = value,
        }
        Ok(())
    }
}

impl fmt::Display for SensitivityDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// KPI read off each sweep point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
    EquityIrr,
    ProjectIrr,
    EquityNpv,
    ProjectNpv,
    MinDscr,
}

impl KpiMetric {
    pub fn extract(self, kpis: &Kpis) -> Option<Decimal> {
        match self {
            KpiMetric::EquityIrr => kpis.equity_irr,
            KpiMetric::ProjectIrr => kpis.project_irr,
            KpiMetric::EquityNpv => kpis.equity_npv,
            KpiMetric::ProjectNpv => kpis.project_npv,
            KpiMetric::MinDscr => kpis.min_dscr,
        }
    }
}

/// One swept input: values run `min..=max` by `step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepVariable {
    pub driver: SensitivityDriver,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
}

/// One- or two-way sensitivity request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    #[serde(default)]
    pub base_inputs: ModelInputs,
    pub variable_1: SweepVariable,
    #[serde(default)]
    pub variable_2: Option<SweepVariable>,
    pub output_metric: KpiMetric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1: SensitivityDriver,
    pub variable_2: Option<SensitivityDriver>,
    pub variable_1_values: Vec<Decimal>,
    /// Empty for a one-way sweep
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: KpiMetric,
    /// Matrix[i][j] = metric at variable_1_values[i], variable_2_values[j].
    /// One-way sweeps have a single column.
    pub matrix: Vec<Vec<Option<Decimal>>>,
    /// Metric on the unperturbed inputs
    pub base_case_value: Option<Decimal>,
}

/// Sweep values from min to max with step, max always included.
fn generate_sweep_values(var: &SweepVariable) -> BessFinanceResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(BessFinanceError::invalid(
            format!("sweep:{}", var.driver),
            "Step must be positive",
        ));
    }
    if var.min > var.max {
        return Err(BessFinanceError::invalid(
            format!("sweep:{}", var.driver),
            "Min must be <= max",
        ));
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        if values.len() == MAX_SWEEP_POINTS {
            return Err(BessFinanceError::invalid(
                format!("sweep:{}", var.driver),
                format!("Sweep exceeds {MAX_SWEEP_POINTS} points"),
            ));
        }
        values.push(current);
        current += var.step;
    }
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Run the engine on `inputs` and read `metric`, or explain why not.
fn evaluate_point(inputs: ModelInputs, metric: KpiMetric) -> Result<Decimal, String> {
    let validated = inputs.validate().map_err(|e| e.to_string())?;
    let simulation = simulate(&validated);
    let kpis = calculate_kpis(&simulation.rows, &validated.financial);
    metric
        .extract(&kpis)
        .ok_or_else(|| "metric undefined".to_string())
}

/// Re-run the full model across a one- or two-way grid of input values.
///
/// Points that fail validation or produce an undefined metric are `None`
/// in the matrix and reported in the warnings.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> BessFinanceResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    input.base_inputs.check()?;
    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = match &input.variable_2 {
        Some(v) => generate_sweep_values(v)?,
        None => Vec::new(),
    };

    let base_case_value = evaluate_point(input.base_inputs.clone(), input.output_metric).ok();

    let mut matrix = Vec::with_capacity(v1_values.len());
    for &v1 in &v1_values {
        let mut point = input.base_inputs.clone();
        let applied = input.variable_1.driver.apply(&mut point, v1);

        let columns: Vec<Option<Decimal>> = match &input.variable_2 {
            None => vec![applied
                .map_err(|e| e.to_string())
                .and_then(|_| evaluate_point(point, input.output_metric))
                .map_err(|e| warnings.push(format!("Point ({v1}) skipped: {e}")))
                .ok()],
            Some(var2) => v2_values
                .iter()
                .map(|&v2| {
                    let mut cell = point.clone();
                    let result = match &applied {
                        Err(e) => Err(e.to_string()),
                        Ok(()) => var2
                            .driver
                            .apply(&mut cell, v2)
                            .map_err(|e| e.to_string())
                            .and_then(|_| evaluate_point(cell, input.output_metric)),
                    };
                    result
                        .map_err(|e| warnings.push(format!("Point ({v1}, {v2}) skipped: {e}")))
                        .ok()
                })
                .collect(),
        };
        matrix.push(columns);
    }

    tracing::debug!(
        rows = matrix.len(),
        skipped = warnings.len(),
        "sensitivity sweep complete"
    );

    let output = SensitivityOutput {
        variable_1: input.variable_1.driver,
        variable_2: input.variable_2.as_ref().map(|v| v.driver),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "BESS sensitivity sweep (full model re-run per point)",
        &serde_json::json!({
            "variable_1": input.variable_1,
            "variable_2": input.variable_2,
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
