use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{check_positive, check_range, check_years};
use crate::error::BessFinanceError;
use crate::types::Rate;
use crate::BessFinanceResult;

/// Technical description of the storage plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    /// Operating life in years (1..=60)
    pub project_life: u32,
    /// Nameplate power (MW)
    pub nominal_power_mw: Decimal,
    /// Nameplate energy (MWh)
    pub nominal_energy_mwh: Decimal,
    /// Capacity fade per year (decimal)
    pub degradation_rate: Rate,
    /// Full equivalent cycles per operating day
    pub cycles_per_day: Decimal,
    /// Lower state-of-charge bound (fraction of energy)
    pub soc_min: Decimal,
    /// Upper state-of-charge bound, strictly above `soc_min`
    pub soc_max: Decimal,
    /// Share of the year the grid connection or plant is unavailable
    pub grid_system_unavailability: Rate,
}

impl Default for ProjectData {
    fn default() -> Self {
        ProjectData {
            project_life: 20,
            nominal_power_mw: dec!(50),
            nominal_energy_mwh: dec!(200),
            degradation_rate: dec!(0.01),
            cycles_per_day: dec!(1),
            soc_min: dec!(0.10),
            soc_max: dec!(0.90),
            grid_system_unavailability: dec!(0.02),
        }
    }
}

impl ProjectData {
    pub fn validate(&self) -> BessFinanceResult<()> {
        check_years("project.project_life", self.project_life, 1)?;
        check_positive("project.nominal_power_mw", self.nominal_power_mw)?;
        check_positive("project.nominal_energy_mwh", self.nominal_energy_mwh)?;
        check_range("project.degradation_rate", self.degradation_rate, dec!(0), dec!(0.20))?;
        check_positive("project.cycles_per_day", self.cycles_per_day)?;
        check_range("project.cycles_per_day", self.cycles_per_day, dec!(0), dec!(10))?;
        check_range("project.soc_min", self.soc_min, dec!(0), dec!(1))?;
        check_range("project.soc_max", self.soc_max, dec!(0), dec!(1))?;
        if self.soc_max <= self.soc_min {
            return Err(BessFinanceError::invalid(
                "project.soc_max",
                format!(
                    "SOC max ({}) must be greater than SOC min ({})",
                    self.soc_max, self.soc_min
                ),
            ));
        }
        check_range(
            "project.grid_system_unavailability",
            self.grid_system_unavailability,
            dec!(0),
            dec!(0.50),
        )?;
        Ok(())
    }

    /// Usable depth of discharge.
    pub fn soc_window(&self) -> Decimal {
        self.soc_max - self.soc_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soc_max_must_exceed_soc_min() {
        let pd = ProjectData {
            soc_min: dec!(0.5),
            soc_max: dec!(0.5),
            ..ProjectData::default()
        };
        let err = pd.validate().unwrap_err();
        assert!(err.to_string().contains("project.soc_max"));
    }

    #[test]
    fn test_zero_life_rejected() {
        let pd = ProjectData {
            project_life: 0,
            ..ProjectData::default()
        };
        assert!(pd.validate().is_err());
    }

    #[test]
    fn test_zero_cycles_rejected() {
        let pd = ProjectData {
            cycles_per_day: Decimal::ZERO,
            ..ProjectData::default()
        };
        assert!(pd.validate().is_err());
    }
}
