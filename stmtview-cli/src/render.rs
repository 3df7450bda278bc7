//! Plain-text output for the one-shot commands.

use std::fmt::Write;
use stmtview_core::{
    Analysis, Column, PieChart, RowId, TableState, Transaction, statement_facts, summary_cards,
};

pub fn render_table(transactions: &[Transaction], rows: &[RowId], table: &TableState) -> String {
    let headers: Vec<String> = Column::ALL.iter().map(|c| table.header_label(*c)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for id in rows {
        for (i, col) in Column::ALL.iter().enumerate() {
            widths[i] = widths[i].max(col.value(&transactions[id.0]).chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().map(String::as_str), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, rule.iter().map(String::as_str), &widths);
    for id in rows {
        let t = &transactions[id.0];
        push_row(&mut out, Column::ALL.iter().map(|c| c.value(t)), &widths);
    }
    if rows.is_empty() {
        out.push_str("(no matching transactions)\n");
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

pub fn render_dashboard(analysis: &Analysis, table: &TableState) -> String {
    let statement = &analysis.statement;
    let mut out = String::new();

    for (label, value) in statement_facts(statement) {
        let _ = writeln!(out, "{label:<16} {value}");
    }
    out.push('\n');

    for card in summary_cards(&analysis.statistics) {
        let _ = writeln!(out, "{:<18} {}", card.label, card.value);
    }

    let chart = PieChart::from_categories(&statement.top_categories);
    out.push_str("\nSpending categories\n");
    if chart.is_empty() {
        out.push_str("  (none reported)\n");
    }
    for (i, color) in chart.colors.iter().enumerate() {
        if let Some(tip) = chart.tooltip(i) {
            let _ = writeln!(out, "  {}  {}", color.hex(), tip);
        }
    }

    out.push_str("\nRecurring transactions\n");
    if statement.recurring_transactions.is_empty() {
        out.push_str("  (none detected)\n");
    }
    for r in &statement.recurring_transactions {
        let _ = writeln!(out, "  - {r}");
    }

    out.push_str("\nTransactions\n");
    let rows = table.visible_rows(&statement.transactions);
    out.push_str(&render_table(&statement.transactions, &rows, table));

    if !statement.summary.trim().is_empty() {
        let _ = writeln!(out, "\nSummary\n  {}", statement.summary.trim());
    }
    out
}
