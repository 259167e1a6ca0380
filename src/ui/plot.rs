use std::ops::RangeInclusive;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, GridMark, Plot};

use rusty_sales::report::chart::{ChartSpec, ChartType};

use crate::color::color_from_hex;

// ---------------------------------------------------------------------------
// Bar charts (central panel)
// ---------------------------------------------------------------------------

/// Render one [`ChartSpec`] as a bar chart.
pub fn bar_chart(ui: &mut Ui, id: &str, spec: &ChartSpec) {
    ui.strong(&spec.title);

    if spec.is_empty() {
        ui.label("No data for the current selection.");
        return;
    }

    let bars: Vec<Bar> = spec
        .categories
        .iter()
        .zip(&spec.positions)
        .zip(&spec.values)
        .zip(&spec.colors)
        .map(|(((name, position), value), color)| {
            Bar::new(*position, *value)
                .name(name)
                .fill(color_from_hex(color))
                .width(0.7)
        })
        .collect();

    let horizontal = spec.chart_type == ChartType::HorizontalBar;
    let mut chart = BarChart::new(bars);
    if horizontal {
        chart = chart.horizontal();
    }

    let ticks: Vec<(f64, String)> = spec
        .positions
        .iter()
        .copied()
        .zip(spec.categories.iter().cloned())
        .collect();
    let category_label = move |mark: GridMark, _range: &RangeInclusive<f64>| -> String {
        ticks
            .iter()
            .find(|(position, _)| (mark.value - position).abs() < 1e-6)
            .map(|(_, name)| name.clone())
            .unwrap_or_default()
    };

    let plot = Plot::new(id)
        .height(280.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false);

    // Grid lines only along the category axis.
    let plot = if horizontal {
        plot.y_axis_formatter(category_label)
            .x_axis_label(spec.value_axis.label.clone())
            .include_x(0.0)
            .show_grid([spec.show_value_grid, true])
    } else {
        plot.x_axis_formatter(category_label)
            .x_axis_label(spec.category_axis.label.clone())
            .y_axis_label(spec.value_axis.label.clone())
            .include_y(0.0)
            .show_grid([true, spec.show_value_grid])
    };

    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}
