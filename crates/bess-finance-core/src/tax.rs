use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Share of a year's positive EBT that carried-forward losses may offset.
pub const LOSS_OFFSET_CAP: Rate = dec!(0.80);

/// Tax lines for one operating year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    pub taxable_ires: Money,
    pub loss_used: Money,
    /// Carryforward balance after this year
    pub loss_cf_end: Money,
    pub ires: Money,
    pub irap_base: Money,
    pub irap: Money,
}

impl TaxLine {
    pub fn total(&self) -> Money {
        self.ires + self.irap
    }
}

/// Statutory rates applied by [`compute_taxes`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TaxRates {
    pub ires: Rate,
    pub irap: Rate,
}

/// Tax for one year given the carryforward balance entering it.
///
/// IRES: a loss adds to the carryforward; a profit is offset by at most
/// [`LOSS_OFFSET_CAP`] of itself from the carryforward. IRAP is levied on
/// EBITDA − depreciation, floored at zero, with no loss relief and no
/// interest deduction. Returns the tax line and the new carryforward.
pub fn compute_taxes(
    ebitda: Money,
    depreciation: Money,
    interest: Money,
    loss_carryforward: Money,
    rates: TaxRates,
) -> (TaxLine, Money) {
    let ebt = ebitda - depreciation - interest;

    let (taxable_ires, loss_used, carry) = if ebt < Decimal::ZERO {
        (Decimal::ZERO, Decimal::ZERO, loss_carryforward - ebt)
    } else {
        let used = loss_carryforward.min(LOSS_OFFSET_CAP * ebt);
        (ebt - used, used, loss_carryforward - used)
    };

    let irap_base = (ebitda - depreciation).max(Decimal::ZERO);

    let line = TaxLine {
        taxable_ires,
        loss_used,
        loss_cf_end: carry,
        ires: taxable_ires * rates.ires,
        irap_base,
        irap: irap_base * rates.irap,
    };
    (line, carry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: TaxRates = TaxRates {
        ires: dec!(0.24),
        irap: dec!(0.039),
    };

    #[test]
    fn test_loss_accumulates() {
        let (line, carry) = compute_taxes(dec!(100), dec!(150), dec!(50), dec!(20), RATES);
        assert_eq!(carry, dec!(120));
        assert_eq!(line.taxable_ires, Decimal::ZERO);
        assert_eq!(line.ires, Decimal::ZERO);
        // IRAP ignores interest and losses: base is max(0, 100 - 150)
        assert_eq!(line.irap_base, Decimal::ZERO);
    }

    #[test]
    fn test_offset_capped_at_eighty_percent() {
        let (line, carry) = compute_taxes(dec!(300), dec!(100), dec!(0), dec!(1000), RATES);
        // EBT 200, offset min(1000, 160)
        assert_eq!(line.loss_used, dec!(160));
        assert_eq!(line.taxable_ires, dec!(40));
        assert_eq!(carry, dec!(840));
        assert_eq!(line.ires, dec!(9.6));
        assert_eq!(line.irap_base, dec!(200));
        assert_eq!(line.irap, dec!(7.8));
        assert_eq!(line.total(), dec!(17.4));
    }

    #[test]
    fn test_small_carryforward_fully_used() {
        let (line, carry) = compute_taxes(dec!(300), dec!(100), dec!(0), dec!(50), RATES);
        assert_eq!(line.loss_used, dec!(50));
        assert_eq!(line.taxable_ires, dec!(150));
        assert_eq!(carry, Decimal::ZERO);
    }

    #[test]
    fn test_interest_reduces_ires_not_irap() {
        let (line, _) = compute_taxes(dec!(300), dec!(100), dec!(100), Decimal::ZERO, RATES);
        assert_eq!(line.taxable_ires, dec!(100));
        assert_eq!(line.irap_base, dec!(200));
    }
}
