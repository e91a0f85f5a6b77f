use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate, Year};

/// One row of the output table. Column names are the wire names consumed by
/// reporting front ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    #[serde(rename = "Year")]
    pub year: Year,

    #[serde(rename = "Revenue_Floor")]
    pub revenue_floor: Money,
    #[serde(rename = "Revenue_Tolling")]
    pub revenue_tolling: Money,
    #[serde(rename = "Revenue_Merchant")]
    pub revenue_merchant: Money,
    #[serde(rename = "Revenue_Total")]
    pub revenue_total: Money,

    /// Yearly royalty plus, in year 0, the upfront settlement
    #[serde(rename = "Municipality_Royalty")]
    pub municipality_royalty: Money,
    #[serde(rename = "Municipality_Royalty_Upfront")]
    pub municipality_royalty_upfront: Money,

    #[serde(rename = "OPEX")]
    pub opex: Money,
    #[serde(rename = "EBITDA")]
    pub ebitda: Money,
    #[serde(rename = "Depreciation")]
    pub depreciation: Money,
    #[serde(rename = "Interest")]
    pub interest: Money,
    #[serde(rename = "EBT")]
    pub ebt: Money,

    #[serde(rename = "Taxable_IRES")]
    pub taxable_ires: Money,
    #[serde(rename = "Loss_CF_End")]
    pub loss_cf_end: Money,
    #[serde(rename = "Loss_Used")]
    pub loss_used: Money,
    #[serde(rename = "IRES")]
    pub ires: Money,
    #[serde(rename = "IRAP_Base")]
    pub irap_base: Money,
    #[serde(rename = "IRAP")]
    pub irap: Money,
    #[serde(rename = "Taxes")]
    pub taxes: Money,

    /// Initial build plus land, year 0 only
    #[serde(rename = "CAPEX")]
    pub capex: Money,
    #[serde(rename = "Augmentation")]
    pub augmentation: Money,

    #[serde(rename = "Reserve_Contribution")]
    pub reserve_contribution: Money,
    #[serde(rename = "Reserve_Interest")]
    pub reserve_interest: Money,
    #[serde(rename = "Reserve_Release")]
    pub reserve_release: Money,
    /// Accrued balance before any release in the year
    #[serde(rename = "Reserve_Balance")]
    pub reserve_balance: Money,
    #[serde(rename = "Cash_Reserve")]
    pub cash_reserve: Money,
    #[serde(rename = "Decommissioning")]
    pub decommissioning: Money,

    #[serde(rename = "Principal")]
    pub principal: Money,
    #[serde(rename = "Debt_Close")]
    pub debt_close: Money,
    #[serde(rename = "Debt_Service")]
    pub debt_service: Money,
    #[serde(rename = "CFADS")]
    pub cfads: Money,
    /// `None` when no debt service falls due
    #[serde(rename = "DSCR")]
    pub dscr: Option<Decimal>,

    #[serde(rename = "Project_FCF")]
    pub project_fcf: Money,
    #[serde(rename = "Equity_CF")]
    pub equity_cf: Money,

    #[serde(rename = "Debt_Amount")]
    pub debt_amount: Money,
    #[serde(rename = "Debt_Fees")]
    pub debt_fees: Money,
    #[serde(rename = "Discount_Rate_Equity")]
    pub discount_rate_equity: Rate,
    #[serde(rename = "Discount_Rate_Project")]
    pub discount_rate_project: Rate,
    #[serde(rename = "Total_Tax_Rate")]
    pub total_tax_rate: Rate,
}
