use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_sales::data::model::{CellValue, Dimension};
use rusty_sales::report::aggregate::Kpis;

use crate::state::AppState;

/// A sidebar interaction, applied after the widgets are drawn.
enum FilterAction {
    Toggle(Dimension, CellValue),
    All(Dimension),
    None(Dimension),
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Please Filter Here:");
    ui.separator();

    let mut action = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::SIDEBAR {
                let all_values = state.table.unique_values(dim);
                let n_selected = all_values
                    .iter()
                    .filter(|v| state.is_selected(dim, v))
                    .count();
                let header_text = format!("Select the {}:  ({n_selected}/{})", dim.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column_name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                action = Some(FilterAction::All(dim));
                            }
                            if ui.small_button("None").clicked() {
                                action = Some(FilterAction::None(dim));
                            }
                        });

                        for val in all_values {
                            let mut checked = state.is_selected(dim, val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                action = Some(FilterAction::Toggle(dim, val.clone()));
                            }
                        }
                    });
            }
        });

    // Errors are already recorded in `status_message`.
    let _ = match action {
        Some(FilterAction::Toggle(dim, val)) => state.toggle_value(dim, &val),
        Some(FilterAction::All(dim)) => state.select_all(dim),
        Some(FilterAction::None(dim)) => state.select_none(dim),
        None => Ok(()),
    };
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        let visible = state.view.as_ref().map_or(0, |v| v.filtered.len());
        ui.label(format!(
            "{}: {} transactions loaded, {visible} visible",
            state.source_path().display(),
            state.table.len(),
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.columns(3, |cols| {
        cols[0].heading("Total Sales:");
        cols[0].heading(format!("US $ {}", thousands(kpis.total_sales)));

        cols[1].heading("Average Rating:");
        cols[1].heading(match (kpis.average_rating, kpis.stars) {
            (Some(avg), Some(stars)) => format!("{avg:.1} {}", stars.glyphs()),
            _ => "no data".to_string(),
        });

        cols[2].heading("Average Sales Per Transaction:");
        cols[2].heading(match kpis.average_sale {
            Some(avg) => format!("US $ {avg:.2}"),
            None => "no data".to_string(),
        });
    });
}

/// `322966` → `"322,966"`.
fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(path);
    }
}
