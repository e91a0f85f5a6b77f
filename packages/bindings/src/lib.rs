use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use bess_finance_core::cashflow::YearRow;
use bess_finance_core::inputs::{FinancialParameters, ModelInputs};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[napi]
pub fn run_financial_model(input_json: String) -> NapiResult<String> {
    let input: ModelInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bess_finance_core::run_financial_model(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate(input_json: String) -> NapiResult<String> {
    let input: ModelInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bess_finance_core::run_simulation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn derive_metrics(input_json: String) -> NapiResult<String> {
    let input: ModelInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bess_finance_core::derive_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct KpiRequest {
    rows: Vec<YearRow>,
    #[serde(default)]
    financial: FinancialParameters,
}

/// KPIs of an existing year table, e.g. one edited on the JS side.
#[napi]
pub fn calculate_kpis(input_json: String) -> NapiResult<String> {
    let input: KpiRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let kpis = bess_finance_core::calculate_kpis(&input.rows, &input.financial);
    serde_json::to_string(&kpis).map_err(to_napi_error)
}

/// IRR of a JSON array of yearly cash flows.
#[napi]
pub fn irr(cash_flows_json: String) -> NapiResult<String> {
    let cash_flows: Vec<Decimal> =
        serde_json::from_str(&cash_flows_json).map_err(to_napi_error)?;
    let result = bess_finance_core::time_value::irr(&cash_flows);
    serde_json::to_string(&result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: bess_finance_core::sensitivity::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        bess_finance_core::sensitivity::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
