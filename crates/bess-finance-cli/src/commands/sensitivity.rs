use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use bess_finance_core::inputs::ModelInputs;
use bess_finance_core::sensitivity::{
    self, KpiMetric, SensitivityDriver, SensitivityInput, SweepVariable,
};

use crate::input;

/// KPI names accepted by `--metric`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    EquityIrr,
    ProjectIrr,
    EquityNpv,
    ProjectNpv,
    MinDscr,
}

impl From<MetricArg> for KpiMetric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::EquityIrr => KpiMetric::EquityIrr,
            MetricArg::ProjectIrr => KpiMetric::ProjectIrr,
            MetricArg::EquityNpv => KpiMetric::EquityNpv,
            MetricArg::ProjectNpv => KpiMetric::ProjectNpv,
            MetricArg::MinDscr => KpiMetric::MinDscr,
        }
    }
}

/// Arguments for a sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Full sweep definition (JSON or YAML); overrides the flags below
    #[arg(long)]
    pub input: Option<String>,

    /// Base case model inputs (JSON or YAML); defaults to the reference project
    #[arg(long)]
    pub base_inputs: Option<String>,

    /// First variable as driver:min:max:step (e.g. "interest_rate:0.03:0.07:0.01")
    #[arg(long)]
    pub var1: Option<String>,

    /// Second variable, same format (creates a 2D table)
    #[arg(long)]
    pub var2: Option<String>,

    /// KPI to tabulate
    #[arg(long, value_enum, default_value = "equity-irr")]
    pub metric: MetricArg,
}

fn parse_sweep(spec: &str) -> Result<SweepVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sweep variable must be driver:min:max:step, got '{}'",
            spec
        )
        .into());
    }
    let driver: SensitivityDriver = serde_json::from_value(Value::String(parts[0].to_string()))
        .map_err(|_| format!("Unknown sensitivity driver '{}'", parts[0]))?;
    Ok(SweepVariable {
        driver,
        min: parts[1].parse::<Decimal>()?,
        max: parts[2].parse::<Decimal>()?,
        step: parts[3].parse::<Decimal>()?,
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sweep_input: SensitivityInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else {
        let spec = args
            .var1
            .as_deref()
            .ok_or("--var1 is required (or provide --input)")?;
        let base_inputs: ModelInputs = match args.base_inputs {
            Some(ref path) => input::file::read_document(path)?,
            None => ModelInputs::default(),
        };
        SensitivityInput {
            base_inputs,
            variable_1: parse_sweep(spec)?,
            variable_2: args.var2.as_deref().map(parse_sweep).transpose()?,
            output_metric: args.metric.into(),
        }
    };

    let result = sensitivity::run_sensitivity(&sweep_input)?;
    Ok(serde_json::to_value(result)?)
}
