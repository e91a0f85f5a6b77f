use serde::{Deserialize, Serialize};

use crate::cashflow::YearRow;
use crate::inputs::FinancialParameters;
use crate::time_value::{irr, npv, IrrNote};
use crate::types::{Money, Rate};

/// Headline returns of one model run.
///
/// Degenerate results are `None`, with the reason in the matching note
/// where one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub equity_irr: Option<Rate>,
    pub project_irr: Option<Rate>,
    pub equity_npv: Option<Money>,
    pub project_npv: Option<Money>,
    pub min_dscr: Option<Rate>,
    pub discount_rate_equity: Rate,
    pub discount_rate_project: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity_irr_note: Option<IrrNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_irr_note: Option<IrrNote>,
}

/// Extract IRRs, NPVs and min DSCR from a year table.
///
/// The project discount rate is read from the table itself (it is broadcast
/// on every row); an empty table leaves it and the project NPV undefined.
pub fn calculate_kpis(rows: &[YearRow], financial: &FinancialParameters) -> Kpis {
    let equity_cf: Vec<Money> = rows.iter().map(|r| r.equity_cf).collect();
    let project_cf: Vec<Money> = rows.iter().map(|r| r.project_fcf).collect();

    let equity = irr(&equity_cf);
    let project = irr(&project_cf);

    let discount_rate_equity = financial.discount_rate_equity;
    let discount_rate_project = rows.first().map(|r| r.discount_rate_project);

    let equity_npv = npv(discount_rate_equity, &equity_cf);
    let project_npv = discount_rate_project.and_then(|r| npv(r, &project_cf));

    let min_dscr = rows.iter().filter_map(|r| r.dscr).min();

    if let Some(note) = equity.note.filter(|_| equity.irr.is_none()) {
        tracing::warn!(%note, "equity IRR undefined");
    }
    if let Some(note) = project.note.filter(|_| project.irr.is_none()) {
        tracing::warn!(%note, "project IRR undefined");
    }

    Kpis {
        equity_irr: equity.irr,
        project_irr: project.irr,
        equity_npv,
        project_npv,
        min_dscr,
        discount_rate_equity,
        discount_rate_project,
        equity_irr_note: equity.note,
        project_irr_note: project.note,
    }
}
