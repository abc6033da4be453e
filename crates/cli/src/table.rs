//! Plain-text rendering of the customer roster.

use std::fmt::Write as _;

use refund_desk_core::{CustomerRecord, CustomerStatus};

const HEADERS: [&str; 9] = [
    "Nome Completo",
    "Telefone",
    "CPF",
    "Quantidade",
    "Valor Total",
    "Desconto",
    "Valor Final",
    "Status",
    "Ações",
];

const MISSING: &str = "N/A";
const ACTION_SEND: &str = "Enviar";
const ACTION_SENT: &str = "Enviado";
const ACTION_DISABLED: &str = "-";

fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

fn row(record: &CustomerRecord, action_enabled: bool) -> [String; 9] {
    [
        or_missing(&record.fullname),
        or_missing(&record.phone),
        record.cpf.clone().unwrap_or_else(|| MISSING.to_string()),
        record.quantity.to_string(),
        record.total_amount.to_string(),
        record
            .discount_amount
            .map_or_else(|| MISSING.to_string(), |d| d.to_string()),
        record.final_amount.to_string(),
        record.status.label().to_string(),
        match (action_enabled, record.status) {
            (true, _) => ACTION_SEND,
            (false, CustomerStatus::Refunded) => ACTION_SENT,
            (false, _) => ACTION_DISABLED,
        }
        .to_string(),
    ]
}

/// Render `records` as an aligned table followed by the record count.
///
/// `action_enabled` decides whether a row shows the send action.
pub fn render(
    records: &[CustomerRecord],
    action_enabled: impl Fn(CustomerStatus) -> bool,
) -> String {
    let rows: Vec<[String; 9]> = records
        .iter()
        .map(|record| row(record, action_enabled(record.status)))
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_line(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(&mut out, &rule, &widths);
    for cells in &rows {
        write_line(&mut out, cells, &widths);
    }
    let _ = write!(out, "Total: {}", records.len());
    out
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize; 9]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}
