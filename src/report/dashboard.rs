use serde::Serialize;

use super::aggregate::{AggOp, AggregateResult, Kpis, group_aggregate};
use super::chart::{ChartKind, ChartSpec, to_chart_descriptor_with_color};
use crate::config::DisplayConfig;
use crate::data::filter::{self, FilterSelection};
use crate::data::model::{Dimension, Metric, SalesTable};
use crate::error::Result;

// ---------------------------------------------------------------------------
// DashboardView – everything derived from one selection
// ---------------------------------------------------------------------------

/// The full derived-results bundle for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Rows passing the selection, original order.
    #[serde(skip)]
    pub filtered: SalesTable,
    pub kpis: Kpis,
    pub product_line_chart: ChartSpec,
    pub hourly_chart: ChartSpec,
    /// Set when the selection matched no rows.
    pub no_data: bool,
}

/// Recompute the dashboard for `selection`.
///
/// An invalid selection is returned as an error so the caller can keep
/// its previous one.  Aggregation failures never escape: they degrade to
/// placeholder KPIs and empty charts.
pub fn compute(
    table: &SalesTable,
    selection: &FilterSelection,
    display: &DisplayConfig,
) -> Result<DashboardView> {
    filter::validate(table, selection)?;

    let filtered = filter::filter(table, selection);
    log::debug!("Selection matched {} of {} rows", filtered.len(), table.len());

    let kpis = Kpis::compute(&filtered, display.max_stars).unwrap_or_else(|e| {
        log::warn!("KPI computation failed: {e}");
        placeholder_kpis()
    });
    let product_line_chart =
        chart(&filtered, Dimension::ProductLine, ChartKind::SalesByProductLine, display);
    let hourly_chart = chart(&filtered, Dimension::Hour, ChartKind::SalesByHour, display);

    Ok(DashboardView {
        no_data: filtered.is_empty(),
        filtered,
        kpis,
        product_line_chart,
        hourly_chart,
    })
}

fn chart(table: &SalesTable, dimension: Dimension, kind: ChartKind, display: &DisplayConfig) -> ChartSpec {
    let result = match group_aggregate(table, dimension, Metric::Total, AggOp::Sum) {
        Ok(grouped) => AggregateResult::Grouped(grouped),
        Err(e) => {
            log::warn!("Grouping by {dimension} failed: {e}");
            AggregateResult::Grouped(Default::default())
        }
    };
    to_chart_descriptor_with_color(&result, kind, &display.bar_color)
}

fn placeholder_kpis() -> Kpis {
    Kpis {
        total_sales: 0,
        average_rating: None,
        stars: None,
        average_sale: None,
        transactions: 0,
    }
}
