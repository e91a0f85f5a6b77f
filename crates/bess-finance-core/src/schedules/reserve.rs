use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate, Year};

/// Cash movements of the decommissioning reserve in one year.
///
/// Signs follow project cash: contributions are negative, interest and the
/// final release are positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReserveFlows {
    pub contribution: Money,
    pub interest: Money,
    pub release: Money,
    /// Accrued balance before any release in the year
    pub balance: Money,
}

impl ReserveFlows {
    /// Net effect on project cash: contribution plus release.
    ///
    /// `interest` is a positive reserve flow but is not part of this sum. It
    /// stays inside the fund and reaches the project within `release`.
    pub fn net_cash(&self) -> Money {
        self.contribution + self.release
    }
}

/// Sinking fund that accrues the decommissioning cost over the operating
/// years and pays it out in the final year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkingFund {
    pub target: Money,
    pub annual_contribution: Money,
    pub interest_rate: Rate,
    pub project_life: Year,
}

impl SinkingFund {
    pub fn new(target: Money, interest_rate: Rate, project_life: Year) -> Self {
        let annual_contribution = if target > Decimal::ZERO && project_life > 1 {
            target / Decimal::from(project_life - 1)
        } else {
            Decimal::ZERO
        };
        SinkingFund {
            target,
            annual_contribution,
            interest_rate,
            project_life,
        }
    }

    pub fn is_active(&self) -> bool {
        self.annual_contribution > Decimal::ZERO
    }

    /// Advance the fund by one year from `opening_balance`.
    ///
    /// The last accrual year tops the balance up to exactly the target.
    /// Returns the year's flows and the balance carried into the next year.
    pub fn step(&self, year: Year, opening_balance: Money) -> (ReserveFlows, Money) {
        if !self.is_active() || year == 0 || year > self.project_life {
            return (ReserveFlows::default(), Decimal::ZERO);
        }

        let interest = opening_balance * self.interest_rate;
        let mut balance = opening_balance + interest;

        let mut contribution = Decimal::ZERO;
        if year < self.project_life && balance < self.target {
            let shortfall = self.target - balance;
            let paid_in = if year == self.project_life - 1 {
                shortfall
            } else {
                self.annual_contribution.min(shortfall)
            };
            balance += paid_in;
            contribution = -paid_in;
        }

        if year == self.project_life {
            let flows = ReserveFlows {
                contribution,
                interest,
                release: balance,
                balance,
            };
            return (flows, Decimal::ZERO);
        }

        let flows = ReserveFlows {
            contribution,
            interest,
            release: Decimal::ZERO,
            balance,
        };
        (flows, balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn run(fund: &SinkingFund) -> Vec<ReserveFlows> {
        let mut carried = Decimal::ZERO;
        (0..=fund.project_life)
            .map(|y| {
                let (flows, next) = fund.step(y, carried);
                carried = next;
                flows
            })
            .collect()
    }

    #[test]
    fn test_accrues_to_target_and_releases() {
        let fund = SinkingFund::new(dec!(900), Decimal::ZERO, 10);
        let flows = run(&fund);
        assert_eq!(flows[0], ReserveFlows::default());
        for f in &flows[1..10] {
            assert_eq!(f.contribution, dec!(-100));
        }
        assert_eq!(flows[9].balance, dec!(900));
        assert_eq!(flows[10].contribution, Decimal::ZERO);
        assert_eq!(flows[10].balance, dec!(900));
        assert_eq!(flows[10].release, dec!(900));
        let net: Decimal = flows.iter().map(ReserveFlows::net_cash).sum();
        assert_eq!(net, Decimal::ZERO);
    }

    #[test]
    fn test_last_contribution_clipped() {
        // 1000 / 3 does not divide evenly; the fund never overshoots
        let fund = SinkingFund::new(dec!(1000), Decimal::ZERO, 4);
        let flows = run(&fund);
        assert_eq!(flows[3].balance, dec!(1000));
        assert_eq!(flows[4].release, dec!(1000));
        assert!(flows.iter().all(|f| f.balance <= dec!(1000)));
    }

    #[test]
    fn test_interest_reduces_contributions() {
        let fund = SinkingFund::new(dec!(300), dec!(0.10), 4);
        let flows = run(&fund);
        assert_eq!(flows[1].interest, Decimal::ZERO);
        assert_eq!(flows[1].contribution, dec!(-100));
        assert_eq!(flows[2].interest, dec!(10));
        assert_eq!(flows[2].contribution, dec!(-100));
        // 210 * 1.1 = 231, topped up by 69
        assert_eq!(flows[3].interest, dec!(21));
        assert_eq!(flows[3].contribution, dec!(-69));
        assert_eq!(flows[3].balance, dec!(300));
        // Final year still earns on the opening balance
        assert_eq!(flows[4].release, dec!(330));
        // Project cash sees the interest once, through the release
        let interest: Decimal = flows.iter().map(|f| f.interest).sum();
        let net: Decimal = flows.iter().map(ReserveFlows::net_cash).sum();
        assert_eq!(interest, dec!(61));
        assert_eq!(net, interest);
    }

    #[test]
    fn test_inactive_for_single_year_project() {
        let fund = SinkingFund::new(dec!(500), Decimal::ZERO, 1);
        assert!(!fund.is_active());
        assert!(run(&fund).iter().all(|f| *f == ReserveFlows::default()));
    }
}
