use clap::Args;
use serde_json::Value;

use bess_finance_core::inputs::ModelInputs;
use bess_finance_core::types::with_metadata;
use bess_finance_core::{derive_metrics, run_financial_model, run_simulation};

use crate::input;

/// Arguments shared by every model subcommand
#[derive(Args)]
pub struct ModelArgs {
    /// Path to a JSON or YAML input file (stdin JSON is read when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Override project life in years
    #[arg(long)]
    pub project_life: Option<u32>,

    /// Keep power and energy at nameplate every year
    #[arg(long)]
    pub no_degradation: bool,

    /// Enable merchant sales (suppresses tolling)
    #[arg(long)]
    pub merchant: bool,
}

/// Inputs from file or stdin, falling back to the reference project, with
/// flag overrides applied on top.
fn load_inputs(args: &ModelArgs) -> Result<ModelInputs, Box<dyn std::error::Error>> {
    let mut inputs: ModelInputs = input::load(args.input.as_deref())?.unwrap_or_default();
    if let Some(life) = args.project_life {
        inputs.project.project_life = life;
    }
    if args.no_degradation {
        inputs.apply_degradation = false;
    }
    if args.merchant {
        inputs.revenues.merchant.enabled = true;
    }
    Ok(inputs)
}

pub fn run_model(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args)?;
    let result = run_financial_model(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_simulate(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args)?;
    let result = run_simulation(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_kpis(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args)?;
    let out = run_financial_model(&inputs)?;
    let result = with_metadata(
        &out.methodology,
        &out.assumptions,
        out.warnings,
        out.metadata.computation_time_us,
        out.result.kpis,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_derived(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args)?;
    let result = derive_metrics(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_debt_schedule(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args)?;
    let out = run_simulation(&inputs)?;
    let result = with_metadata(
        &out.methodology,
        &out.assumptions,
        out.warnings,
        out.metadata.computation_time_us,
        out.result.debt_schedule,
    );
    Ok(serde_json::to_value(result)?)
}
