use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{CellValue, Dimension, Metric, SalesTable};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Aggregation primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggOp {
    Sum,
    Mean,
    Count,
}

/// Fold a run of metric values. Only `Mean` can fail (on zero values).
fn fold(values: impl Iterator<Item = f64>, op: AggOp, what: impl FnOnce() -> String) -> Result<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    match op {
        AggOp::Sum => Ok(sum),
        AggOp::Count => Ok(n as f64),
        AggOp::Mean if n == 0 => Err(DashboardError::EmptyInput { what: what() }),
        AggOp::Mean => Ok(sum / n as f64),
    }
}

/// Sum / mean / count of `metric` over the whole table.
pub fn scalar_aggregate(table: &SalesTable, metric: Metric, op: AggOp) -> Result<f64> {
    fold(table.rows().iter().map(|r| r.metric(metric)), op, || {
        format!("mean of {}", metric.column_name())
    })
}

/// `(group key, value)` pairs ascending by value; ties ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedAggregate {
    pub dimension: Option<Dimension>,
    pub metric: Option<Metric>,
    pub entries: Vec<(CellValue, f64)>,
}

impl GroupedAggregate {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all group values.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

/// Group rows by `dimension` and apply `op` to `metric` within each group.
pub fn group_aggregate(
    table: &SalesTable,
    dimension: Dimension,
    metric: Metric,
    op: AggOp,
) -> Result<GroupedAggregate> {
    let mut groups: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        groups.entry(row.value(dimension)).or_default().push(row.metric(metric));
    }

    let mut entries = groups
        .into_iter()
        .map(|(key, values)| {
            let value = fold(values.into_iter(), op, || format!("mean of {metric:?} for {key}"))?;
            Ok((key, value))
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by(|(ka, va), (kb, vb)| va.total_cmp(vb).then_with(|| ka.cmp(kb)));

    Ok(GroupedAggregate {
        dimension: Some(dimension),
        metric: Some(metric),
        entries,
    })
}

/// What to compute, for callers that pick the shape at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateRequest {
    Scalar {
        metric: Metric,
        op: AggOp,
    },
    Grouped {
        dimension: Dimension,
        metric: Metric,
        op: AggOp,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AggregateResult {
    Scalar(f64),
    Grouped(GroupedAggregate),
}

pub fn aggregate(table: &SalesTable, request: AggregateRequest) -> Result<AggregateResult> {
    match request {
        AggregateRequest::Scalar { metric, op } => {
            scalar_aggregate(table, metric, op).map(AggregateResult::Scalar)
        }
        AggregateRequest::Grouped {
            dimension,
            metric,
            op,
        } => group_aggregate(table, dimension, metric, op).map(AggregateResult::Grouped),
    }
}

// ---------------------------------------------------------------------------
// Star rating
// ---------------------------------------------------------------------------

/// Whole-star count shown next to the average rating.
///
/// Rounds half-up (4.5 → 5, 4.49 → 4) and clamps to `0..=max_stars`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarRating {
    pub stars: u8,
    pub max_stars: u8,
}

impl StarRating {
    pub fn from_mean(mean: f64, max_stars: u8) -> Self {
        let stars = if mean.is_nan() {
            0
        } else {
            // `f64::round` rounds half away from zero, i.e. half-up for
            // the non-negative values that survive the clamp.
            mean.round().clamp(0.0, f64::from(max_stars)) as u8
        };
        StarRating { stars, max_stars }
    }

    pub fn glyphs(&self) -> String {
        "★".repeat(usize::from(self.stars))
    }
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// The three headline figures plus the row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    /// Total sales truncated to whole currency units.
    pub total_sales: i64,
    /// Mean rating to one decimal; `None` when there are no rows.
    pub average_rating: Option<f64>,
    pub stars: Option<StarRating>,
    /// Mean transaction value to two decimals; `None` when there are no rows.
    pub average_sale: Option<f64>,
    pub transactions: usize,
}

impl Kpis {
    /// Compute the headline figures. Undefined means surface as `None`
    /// instead of failing the whole set.
    pub fn compute(table: &SalesTable, max_stars: u8) -> Result<Self> {
        let total_sales = scalar_aggregate(table, Metric::Total, AggOp::Sum)?.trunc() as i64;
        let transactions = scalar_aggregate(table, Metric::Total, AggOp::Count)? as usize;

        let mean_rating = optional(scalar_aggregate(table, Metric::Rating, AggOp::Mean))?;
        let mean_sale = optional(scalar_aggregate(table, Metric::Total, AggOp::Mean))?;

        Ok(Kpis {
            total_sales,
            average_rating: mean_rating.map(|m| round_to(m, 1)),
            stars: mean_rating.map(|m| StarRating::from_mean(m, max_stars)),
            average_sale: mean_sale.map(|m| round_to(m, 2)),
            transactions,
        })
    }

    pub fn has_data(&self) -> bool {
        self.transactions > 0
    }
}

/// Turn `EmptyInput` into `None`; any other error still propagates.
fn optional(result: Result<f64>) -> Result<Option<f64>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(DashboardError::EmptyInput { what }) => {
            log::debug!("No data for {what}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
