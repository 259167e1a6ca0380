use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, rows ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading("📊 Sales Dashboard");
    ui.add_space(8.0);

    let Some(view) = &state.view else {
        ui.label("Nothing to show yet.");
        return;
    };

    panels::kpi_row(ui, &view.kpis);
    ui.separator();

    if view.no_data {
        ui.label("No transactions match the current filters.");
    }

    ui.columns(2, |cols| {
        plot::bar_chart(&mut cols[0], "sales_by_product_line", &view.product_line_chart);
        plot::bar_chart(&mut cols[1], "sales_by_hour", &view.hourly_chart);
    });
    ui.separator();

    ui.strong(format!("Transactions ({})", view.filtered.len()));
    table::transactions_table(ui, &view.filtered);
}
