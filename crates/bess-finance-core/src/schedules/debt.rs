use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::inputs::{AmortizationType, FinancialParameters};
use crate::types::{Money, Rate, Year};

/// A single amortising loan drawn in full at year 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtTranche {
    pub amount: Money,
    pub interest_rate: Rate,
    pub tenor_years: u32,
    pub amortization: AmortizationType,
}

impl DebtTranche {
    pub fn new(amount: Money, financial: &FinancialParameters) -> Self {
        DebtTranche {
            amount,
            interest_rate: financial.interest_rate,
            tenor_years: financial.debt_tenor_years,
            amortization: financial.amortization_type,
        }
    }

    fn is_drawn(&self) -> bool {
        self.amount > Decimal::ZERO && self.tenor_years > 0
    }
}

/// A single year in the debt schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtScheduleRow {
    pub year: Year,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    pub debt_service: Money,
    pub closing_balance: Money,
}

impl DebtScheduleRow {
    fn idle(year: Year, closing_balance: Money) -> Self {
        DebtScheduleRow {
            year,
            opening_balance: Decimal::ZERO,
            interest: Decimal::ZERO,
            principal: Decimal::ZERO,
            debt_service: Decimal::ZERO,
            closing_balance,
        }
    }
}

/// Year-indexed schedule covering years 0..=project_life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSchedule {
    pub rows: Vec<DebtScheduleRow>,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
}

impl DebtSchedule {
    /// Row for `year`, or an all-zero row past the horizon.
    pub fn row(&self, year: Year) -> DebtScheduleRow {
        self.rows
            .get(year as usize)
            .cloned()
            .unwrap_or_else(|| DebtScheduleRow::idle(year, Decimal::ZERO))
    }
}

/// Level payment that retires `principal` over `periods` at `rate`.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> Money {
    if periods == 0 {
        return Decimal::ZERO;
    }
    if rate <= Decimal::ZERO {
        return principal / Decimal::from(periods);
    }
    let growth = (Decimal::ONE + rate).powu(periods as u64);
    principal * rate * growth / (growth - Decimal::ONE)
}

/// Build the year-by-year schedule for one tranche.
///
/// Year 0 only records the drawn balance. Years 1..=tenor carry interest on
/// the opening balance and the principal of the selected amortisation style;
/// the last tenor year repays whatever is left so the loan closes at exactly
/// zero. Later years are all zero.
pub fn build_debt_schedule(tranche: &DebtTranche, project_life: Year) -> DebtSchedule {
    let mut rows = Vec::with_capacity(project_life as usize + 1);
    let mut total_interest_paid = Decimal::ZERO;
    let mut total_principal_paid = Decimal::ZERO;

    if !tranche.is_drawn() {
        rows.extend((0..=project_life).map(|y| DebtScheduleRow::idle(y, Decimal::ZERO)));
        return DebtSchedule {
            rows,
            total_interest_paid,
            total_principal_paid,
        };
    }

    let tenor = tranche.tenor_years;
    let rate = tranche.interest_rate;
    let payment = annuity_payment(tranche.amount, rate, tenor);
    let level_principal = tranche.amount / Decimal::from(tenor);
    let mut balance = tranche.amount;

    rows.push(DebtScheduleRow::idle(0, balance));

    for year in 1..=project_life {
        if year > tenor {
            rows.push(DebtScheduleRow::idle(year, Decimal::ZERO));
            continue;
        }

        let opening = balance;
        let interest = opening * rate;
        let principal = if year == tenor {
            opening
        } else {
            match tranche.amortization {
                AmortizationType::Annuity => (payment - interest).max(Decimal::ZERO).min(opening),
                AmortizationType::EqualPrincipal => level_principal.min(opening),
            }
        };
        balance = opening - principal;

        total_interest_paid += interest;
        total_principal_paid += principal;

        rows.push(DebtScheduleRow {
            year,
            opening_balance: opening,
            interest,
            principal,
            debt_service: interest + principal,
            closing_balance: balance,
        });
    }

    DebtSchedule {
        rows,
        total_interest_paid,
        total_principal_paid,
    }
}
