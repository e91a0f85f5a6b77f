use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Money, Rate};

/// Bisection stops once |NPV| falls below this residual.
const NPV_TOLERANCE: Decimal = dec!(0.00000001);
const MAX_BISECTION_ITERATIONS: u32 = 120;

/// Candidate rates scanned for NPV sign changes, ascending.
///
/// Dense between -99% and 100%, then widening out to 5000%.
pub const IRR_RATE_GRID: [Rate; 33] = [
    dec!(-0.99),
    dec!(-0.9),
    dec!(-0.8),
    dec!(-0.7),
    dec!(-0.6),
    dec!(-0.5),
    dec!(-0.4),
    dec!(-0.3),
    dec!(-0.2),
    dec!(-0.1),
    dec!(0.0),
    dec!(0.01),
    dec!(0.02),
    dec!(0.05),
    dec!(0.08),
    dec!(0.10),
    dec!(0.15),
    dec!(0.20),
    dec!(0.30),
    dec!(0.40),
    dec!(0.50),
    dec!(0.75),
    dec!(1.0),
    dec!(1.5),
    dec!(2.0),
    dec!(3.0),
    dec!(5.0),
    dec!(8.0),
    dec!(10.0),
    dec!(15.0),
    dec!(20.0),
    dec!(30.0),
    dec!(50.0),
];

/// Why an IRR is missing or should be read with care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrNote {
    /// Empty series or every flow is zero
    NoCashflows,
    /// Flows are all non-negative or all non-positive
    NoSignChange,
    /// NPV never changes sign on the rate grid
    NoBracketFound,
    /// Several sign changes on the grid; the lowest-rate root was returned
    MultipleIrrPossible,
    /// The chosen bracket did not straddle zero when re-evaluated
    BracketInvalid,
}

impl fmt::Display for IrrNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IrrNote::NoCashflows => "no_cashflows",
            IrrNote::NoSignChange => "no_sign_change",
            IrrNote::NoBracketFound => "no_bracket_found",
            IrrNote::MultipleIrrPossible => "multiple_irr_possible",
            IrrNote::BracketInvalid => "bracket_invalid",
        };
        f.write_str(s)
    }
}

/// Outcome of an IRR search. `irr` is *a* root of the NPV polynomial, the
/// lowest one found on the grid, not necessarily the economically relevant one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrResult {
    pub irr: Option<Rate>,
    pub note: Option<IrrNote>,
}

impl IrrResult {
    fn none(note: IrrNote) -> Self {
        IrrResult {
            irr: None,
            note: Some(note),
        }
    }
}

/// Net Present Value of a series of yearly cash flows, first flow at t = 0.
///
/// Returns `None` for rates at or below -100% or when a term cannot be
/// represented. Once the discount factor outgrows `Decimal` the remaining
/// terms are below its resolution and are dropped.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> Option<Money> {
    if rate <= dec!(-1) {
        return None;
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            match discount.checked_mul(one_plus_r) {
                Some(d) => discount = d,
                None => break,
            }
        }
        if discount.is_zero() {
            return None;
        }
        result = result.checked_add(cf.checked_div(discount)?)?;
    }

    Some(result)
}

/// A value with the same sign as NPV at `rate`, used to locate roots.
///
/// Below 0% this is the terminal value Σ cf_t·(1+r)^(N−1−t) by Horner's rule,
/// which stays on the scale of the flows where the discount factor of a long
/// series would underflow. At or above 0% it is the NPV itself.
fn npv_sign_value(rate: Rate, cash_flows: &[Money]) -> Option<Decimal> {
    if rate >= Decimal::ZERO {
        return npv(rate, cash_flows);
    }
    if rate <= dec!(-1) {
        return None;
    }

    let one_plus_r = Decimal::ONE + rate;
    cash_flows
        .iter()
        .try_fold(Decimal::ZERO, |acc, cf| acc.checked_mul(one_plus_r)?.checked_add(*cf))
}

fn opposite_signs(a: Decimal, b: Decimal) -> bool {
    (a < Decimal::ZERO && b > Decimal::ZERO) || (a > Decimal::ZERO && b < Decimal::ZERO)
}

/// Scan [`IRR_RATE_GRID`] and return every interval where NPV changes sign.
///
/// Grid points whose NPV sign cannot be determined are skipped. An exact zero
/// at a grid point yields a degenerate `(r, r)` bracket.
pub fn find_irr_brackets(cash_flows: &[Money]) -> Vec<(Rate, Rate)> {
    if cash_flows.is_empty() {
        return Vec::new();
    }

    let points: Vec<(Rate, Money)> = IRR_RATE_GRID
        .iter()
        .filter_map(|&r| npv_sign_value(r, cash_flows).map(|v| (r, v)))
        .collect();

    points
        .windows(2)
        .filter_map(|w| {
            let (r0, v0) = w[0];
            let (r1, v1) = w[1];
            if v0.is_zero() {
                Some((r0, r0))
            } else if opposite_signs(v0, v1) {
                Some((r0, r1))
            } else {
                None
            }
        })
        .collect()
}

/// IRR by grid bracketing and bisection of the lowest-rate bracket.
///
/// Handles non-conventional series: when more than one bracket exists the
/// first root is returned with [`IrrNote::MultipleIrrPossible`].
pub fn irr(cash_flows: &[Money]) -> IrrResult {
    if cash_flows.iter().all(|cf| cf.is_zero()) {
        return IrrResult::none(IrrNote::NoCashflows);
    }

    let has_pos = cash_flows.iter().any(|cf| *cf > Decimal::ZERO);
    let has_neg = cash_flows.iter().any(|cf| *cf < Decimal::ZERO);
    if !(has_pos && has_neg) {
        return IrrResult::none(IrrNote::NoSignChange);
    }

    let brackets = find_irr_brackets(cash_flows);
    let Some(&(lo, hi)) = brackets.first() else {
        return IrrResult::none(IrrNote::NoBracketFound);
    };
    let note = (brackets.len() > 1).then_some(IrrNote::MultipleIrrPossible);
    tracing::debug!(brackets = brackets.len(), %lo, %hi, "IRR bracket search");

    match bisect(cash_flows, lo, hi) {
        Some(root) => IrrResult {
            irr: Some(root),
            note,
        },
        None => IrrResult::none(IrrNote::BracketInvalid),
    }
}

/// Bisect on `[lo, hi]`. `None` when the endpoints do not straddle zero.
///
/// Halving follows the sign of [`npv_sign_value`]; convergence is judged on
/// the NPV residual.
fn bisect(cash_flows: &[Money], mut lo: Rate, mut hi: Rate) -> Option<Rate> {
    if lo == hi {
        return Some(lo);
    }

    let mut f_lo = npv_sign_value(lo, cash_flows)?;
    let f_hi = npv_sign_value(hi, cash_flows)?;
    if f_lo.is_zero() {
        return Some(lo);
    }
    if f_hi.is_zero() {
        return Some(hi);
    }
    if !opposite_signs(f_lo, f_hi) {
        return None;
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = npv_sign_value(mid, cash_flows)?;
        if f_mid.is_zero() || npv(mid, cash_flows).is_some_and(|v| v.abs() < NPV_TOLERANCE) {
            return Some(mid);
        }
        if opposite_signs(f_lo, f_mid) {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    Some((lo + hi) / dec!(2))
}
