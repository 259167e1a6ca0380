use serde::Serialize;

use super::aggregate::{AggregateResult, GroupedAggregate};

// ---------------------------------------------------------------------------
// ChartSpec – what to draw, not how
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartType {
    /// Bars grow left → right; categories on the vertical axis.
    HorizontalBar,
    /// Bars grow bottom → top; categories on the horizontal axis.
    VerticalBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CategoryOrder {
    /// Keep the aggregate's ascending-by-value order.
    ByValue,
    /// Natural order of the group keys (e.g. hours 0 → 23).
    ByKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisBinding {
    pub field: String,
    pub label: String,
}

/// Renderer-neutral chart description.
///
/// `categories`, `positions`, `values` and `colors` are parallel vectors in
/// render order.  `positions` places each bar on the category axis: the
/// render index for ordinal axes, the key itself for linear ones (hours).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub chart_type: ChartType,
    pub category_axis: AxisBinding,
    pub value_axis: AxisBinding,
    pub category_order: CategoryOrder,
    pub categories: Vec<String>,
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
    pub show_value_grid: bool,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The dashboard's chart presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    SalesByProductLine,
    SalesByHour,
}

impl ChartKind {
    /// Whether the category axis is numeric, so absent keys leave gaps.
    fn linear_axis(self) -> bool {
        matches!(self, ChartKind::SalesByHour)
    }

    fn shape(self) -> (ChartType, CategoryOrder, &'static str, AxisBinding) {
        match self {
            ChartKind::SalesByProductLine => (
                ChartType::HorizontalBar,
                CategoryOrder::ByValue,
                "Sales by Product Line",
                AxisBinding {
                    field: "Product_line".to_string(),
                    label: "Product line".to_string(),
                },
            ),
            ChartKind::SalesByHour => (
                ChartType::VerticalBar,
                CategoryOrder::ByKey,
                "Sales by hour",
                AxisBinding {
                    field: "hour".to_string(),
                    label: "Hour".to_string(),
                },
            ),
        }
    }
}

pub const DEFAULT_BAR_COLOR: &str = "#0083B8";

/// Shape an aggregate into a chart description.  A scalar has no
/// categories and yields an empty chart.
pub fn to_chart_descriptor(result: &AggregateResult, kind: ChartKind) -> ChartSpec {
    to_chart_descriptor_with_color(result, kind, DEFAULT_BAR_COLOR)
}

pub fn to_chart_descriptor_with_color(
    result: &AggregateResult,
    kind: ChartKind,
    color: &str,
) -> ChartSpec {
    let (chart_type, category_order, title, category_axis) = kind.shape();

    let empty = GroupedAggregate::default();
    let grouped = match result {
        AggregateResult::Grouped(g) => g,
        AggregateResult::Scalar(_) => &empty,
    };

    let mut entries: Vec<_> = grouped.entries.iter().collect();
    if category_order == CategoryOrder::ByKey {
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    }

    let positions = entries
        .iter()
        .enumerate()
        .map(|(i, (key, _))| match key.as_f64() {
            Some(x) if kind.linear_axis() => x,
            _ => i as f64,
        })
        .collect();

    ChartSpec {
        title: title.to_string(),
        chart_type,
        category_axis,
        value_axis: AxisBinding {
            field: grouped.metric.map_or("Total", |m| m.column_name()).to_string(),
            label: "Total".to_string(),
        },
        category_order,
        categories: entries.iter().map(|(k, _)| k.to_string()).collect(),
        positions,
        values: entries.iter().map(|(_, v)| *v).collect(),
        colors: vec![color.to_string(); entries.len()],
        // Grid lines are drawn on the category axis only.
        show_value_grid: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Dimension, Metric};

    fn grouped(entries: Vec<(CellValue, f64)>, dimension: Dimension) -> AggregateResult {
        AggregateResult::Grouped(GroupedAggregate {
            dimension: Some(dimension),
            metric: Some(Metric::Total),
            entries,
        })
    }

    #[test]
    fn product_line_chart_keeps_value_order() {
        let result = grouped(
            vec![("Sports".into(), 5.0), ("Food".into(), 7.0), ("Fashion".into(), 9.0)],
            Dimension::ProductLine,
        );
        let spec = to_chart_descriptor(&result, ChartKind::SalesByProductLine);
        assert_eq!(spec.chart_type, ChartType::HorizontalBar);
        assert_eq!(spec.categories, ["Sports", "Food", "Fashion"]);
        assert_eq!(spec.values, [5.0, 7.0, 9.0]);
        assert_eq!(spec.colors, vec![DEFAULT_BAR_COLOR; 3]);
        assert_eq!(spec.positions, [0.0, 1.0, 2.0]);
        assert_eq!(spec.category_axis.field, "Product_line");
    }

    #[test]
    fn hourly_chart_orders_by_hour() {
        let result = grouped(
            vec![
                (CellValue::Integer(19), 3.0),
                (CellValue::Integer(10), 4.0),
                (CellValue::Integer(13), 8.0),
            ],
            Dimension::Hour,
        );
        let spec = to_chart_descriptor_with_color(&result, ChartKind::SalesByHour, "#ff0000");
        assert_eq!(spec.chart_type, ChartType::VerticalBar);
        assert_eq!(spec.categories, ["10", "13", "19"]);
        assert_eq!(spec.values, [4.0, 8.0, 3.0]);
        assert_eq!(spec.colors[0], "#ff0000");
    }

    #[test]
    fn hourly_bars_sit_on_their_hour() {
        let result = grouped(
            vec![(CellValue::Integer(18), 2.0), (CellValue::Integer(10), 6.0)],
            Dimension::Hour,
        );
        let spec = to_chart_descriptor(&result, ChartKind::SalesByHour);
        // 11..=17 had no sales and stay empty on the axis.
        assert_eq!(spec.positions, [10.0, 18.0]);
        assert_eq!(spec.categories, ["10", "18"]);
    }

    #[test]
    fn scalar_gives_empty_chart() {
        let spec = to_chart_descriptor(&AggregateResult::Scalar(12.0), ChartKind::SalesByHour);
        assert!(spec.is_empty());
        assert!(spec.categories.is_empty());
        assert_eq!(spec.title, "Sales by hour");
    }

    #[test]
    fn serialises_for_external_renderers() {
        let result = grouped(vec![("Food".into(), 7.0)], Dimension::ProductLine);
        let json = serde_json::to_value(to_chart_descriptor(&result, ChartKind::SalesByProductLine)).unwrap();
        assert_eq!(json["chart_type"], "HorizontalBar");
        assert_eq!(json["categories"][0], "Food");
    }
}
