use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use bess_finance_core::time_value::{irr, npv, IrrNote};

/// Arguments for an ad-hoc IRR/NPV calculation
#[derive(Args)]
pub struct IrrArgs {
    /// Yearly cash flows from year 0 (comma-separated, e.g. "-100,30,30,60")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<Decimal>,

    /// Discount rate for NPV (e.g. 0.08)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<Decimal>,
}

#[derive(Serialize)]
struct IrrOutput {
    irr: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    irr_note: Option<IrrNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    npv: Option<Option<Decimal>>,
    cash_flows: Vec<Decimal>,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = irr(&args.cash_flows);
    let output = IrrOutput {
        irr: result.irr,
        irr_note: result.note,
        npv: args.rate.map(|r| npv(r, &args.cash_flows)),
        cash_flows: args.cash_flows,
    };
    Ok(serde_json::json!({ "result": output }))
}
