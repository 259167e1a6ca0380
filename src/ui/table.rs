use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use rusty_sales::data::model::{SalesTable, Transaction};

/// Typed columns shown before the pass-through ones.
const TYPED_HEADERS: [&str; 9] = [
    "City",
    "Customer_type",
    "Gender",
    "Product_line",
    "Payment",
    "Total",
    "Rating",
    "Time",
    "hour",
];

// ---------------------------------------------------------------------------
// Transactions table
// ---------------------------------------------------------------------------

/// Render the rows of `table` (typically the filtered view).
pub fn transactions_table(ui: &mut Ui, table: &SalesTable) {
    let headers = headers(table);

    TableBuilder::new(ui)
        .id_salt("transactions")
        .striped(true)
        .resizable(true)
        .max_scroll_height(260.0)
        .columns(Column::auto().at_least(60.0), headers.len())
        .header(20.0, |mut header| {
            for h in &headers {
                header.col(|ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, table.len(), |mut row| {
                let cells = row_cells(&table.rows()[row.index()], table.extra_columns());
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

fn headers(table: &SalesTable) -> Vec<String> {
    TYPED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(table.extra_columns().iter().cloned())
        .collect()
}

/// Display strings for one row, parallel to [`headers`].
fn row_cells(txn: &Transaction, extra_columns: &[String]) -> Vec<String> {
    let mut cells = vec![
        txn.city.clone(),
        txn.customer_type.to_string(),
        txn.gender.to_string(),
        txn.product_line.clone(),
        txn.payment.to_string(),
        format!("{:.2}", txn.total),
        format!("{:.1}", txn.rating),
        txn.time.to_string(),
        txn.hour.to_string(),
    ];
    cells.extend(
        extra_columns
            .iter()
            .map(|col| txn.extra.get(col).map(|v| v.to_string()).unwrap_or_default()),
    );
    cells
}
