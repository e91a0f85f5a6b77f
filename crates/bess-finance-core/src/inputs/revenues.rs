use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{check_non_negative, check_range, check_years};
use crate::error::BessFinanceError;
use crate::types::{Money, Rate, Year};
use crate::BessFinanceResult;

/// Maximum number of tolling contracts a project can carry.
pub const MAX_TOLLING_TRANCHES: usize = 2;

/// Regulatory floor mechanism.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorType {
    /// Capacity market, priced per MW·year on a share of power
    #[default]
    #[serde(rename = "CM", alias = "cm")]
    Cm,
    /// Storage capacity auction, priced per MWh on a share of energy
    #[serde(rename = "MACSE", alias = "macse")]
    Macse,
}

/// Price, volume share and duration of one floor mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorTerms {
    /// Per MW·year for CM, per MWh for MACSE
    pub price: Money,
    /// Share of power (CM) or nominal energy (MACSE) under the floor
    pub share: Rate,
    /// Floor revenue is earned in years 1..=duration_years
    pub duration_years: Year,
    pub escalation: Rate,
}

impl FloorTerms {
    fn capacity_market() -> Self {
        FloorTerms {
            price: dec!(60000),
            share: dec!(0.50),
            duration_years: 5,
            escalation: Decimal::ZERO,
        }
    }

    fn macse() -> Self {
        FloorTerms {
            price: dec!(90),
            share: dec!(0.50),
            duration_years: 10,
            escalation: Decimal::ZERO,
        }
    }

    fn validate(&self, prefix: &str) -> BessFinanceResult<()> {
        check_non_negative(&format!("{prefix}.price"), self.price)?;
        check_range(&format!("{prefix}.share"), self.share, dec!(0), dec!(1))?;
        check_years(&format!("{prefix}.duration_years"), self.duration_years, 0)?;
        check_range(&format!("{prefix}.escalation"), self.escalation, dec!(0), dec!(0.50))?;
        Ok(())
    }
}

impl Default for FloorTerms {
    fn default() -> Self {
        FloorTerms::capacity_market()
    }
}

/// One fixed-fee tolling contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TollingTranche {
    /// Year-1 fee per MW·year
    pub base_price_per_mw_year: Money,
    /// First contracted year, 0 = not contracted
    pub start_year: Year,
    /// Last contracted year (inclusive), 0 = not contracted
    pub end_year: Year,
    /// Cycles per day reserved by the offtaker
    pub booked_cycles: Decimal,
}

impl TollingTranche {
    /// Whether the contract covers `year`.
    pub fn is_active(&self, year: Year) -> bool {
        self.start_year > 0 && self.end_year > 0 && (self.start_year..=self.end_year).contains(&year)
    }

    fn validate(&self, prefix: &str) -> BessFinanceResult<()> {
        check_non_negative(
            &format!("{prefix}.base_price_per_mw_year"),
            self.base_price_per_mw_year,
        )?;
        check_years(&format!("{prefix}.start_year"), self.start_year, 0)?;
        check_years(&format!("{prefix}.end_year"), self.end_year, 0)?;
        check_range(&format!("{prefix}.booked_cycles"), self.booked_cycles, dec!(0), dec!(10))?;
        if (self.start_year == 0) != (self.end_year == 0) {
            return Err(BessFinanceError::invalid(
                format!("{prefix}.end_year"),
                "Start and end year must both be set or both be 0",
            ));
        }
        if self.end_year < self.start_year {
            return Err(BessFinanceError::invalid(
                format!("{prefix}.end_year"),
                format!(
                    "End year ({}) must be >= start year ({})",
                    self.end_year, self.start_year
                ),
            ));
        }
        Ok(())
    }
}

/// Market sales of cycled energy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantTerms {
    /// Takes precedence over every tolling contract when true
    pub enabled: bool,
    pub selling_price_per_mwh: Money,
    pub price_escalation: Rate,
}

impl Default for MerchantTerms {
    fn default() -> Self {
        MerchantTerms {
            enabled: false,
            selling_price_per_mwh: dec!(120),
            price_escalation: dec!(0.02),
        }
    }
}

/// Residual value credited in the final year.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalValue {
    pub enabled: bool,
    pub per_mw: Money,
}

/// Contracted and merchant revenue assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Revenues {
    pub floor_type: FloorType,
    pub cm: FloorTerms,
    pub macse: FloorTerms,
    /// Up to two tolling contracts
    pub tolling_tranches: Vec<TollingTranche>,
    /// Annual escalation shared by all tolling contracts
    pub tolling_escalation: Rate,
    /// Premium on top of the tolling fee (0.10 = +10%)
    pub tolling_profit_sharing_pct: Rate,
    pub merchant: MerchantTerms,
    pub terminal_value: TerminalValue,
}

impl Default for Revenues {
    fn default() -> Self {
        Revenues {
            floor_type: FloorType::Cm,
            cm: FloorTerms::capacity_market(),
            macse: FloorTerms::macse(),
            tolling_tranches: vec![TollingTranche {
                base_price_per_mw_year: dec!(60000),
                start_year: 1,
                end_year: 5,
                booked_cycles: dec!(1),
            }],
            tolling_escalation: Decimal::ZERO,
            tolling_profit_sharing_pct: Decimal::ZERO,
            merchant: MerchantTerms::default(),
            terminal_value: TerminalValue::default(),
        }
    }
}

impl Revenues {
    pub fn validate(&self) -> BessFinanceResult<()> {
        self.cm.validate("revenues.cm")?;
        self.macse.validate("revenues.macse")?;

        if self.tolling_tranches.len() > MAX_TOLLING_TRANCHES {
            return Err(BessFinanceError::invalid(
                "revenues.tolling_tranches",
                format!(
                    "At most {MAX_TOLLING_TRANCHES} tolling tranches are supported, got {}",
                    self.tolling_tranches.len()
                ),
            ));
        }
        for (i, tranche) in self.tolling_tranches.iter().enumerate() {
            tranche.validate(&format!("revenues.tolling_tranches[{i}]"))?;
        }
        check_range(
            "revenues.tolling_escalation",
            self.tolling_escalation,
            dec!(0),
            dec!(1),
        )?;
        check_range(
            "revenues.tolling_profit_sharing_pct",
            self.tolling_profit_sharing_pct,
            dec!(0),
            dec!(2),
        )?;

        check_non_negative(
            "revenues.merchant.selling_price_per_mwh",
            self.merchant.selling_price_per_mwh,
        )?;
        check_range(
            "revenues.merchant.price_escalation",
            self.merchant.price_escalation,
            dec!(0),
            dec!(1),
        )?;
        check_non_negative("revenues.terminal_value.per_mw", self.terminal_value.per_mw)?;
        Ok(())
    }

    /// Terms of the selected floor mechanism.
    pub fn active_floor(&self) -> &FloorTerms {
        match self.floor_type {
            FloorType::Cm => &self.cm,
            FloorType::Macse => &self.macse,
        }
    }

    /// Whether any tolling contract would pay in `year` ignoring merchant precedence.
    pub fn tolling_configured_in(&self, year: Year) -> bool {
        self.tolling_tranches.iter().any(|t| t.is_active(year))
    }
}
