//! CSV export of the full transaction list.
//!
//! The export ignores the table's sort and filter: it is always the list as
//! received, with every field quoted under a fixed header.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::model::Transaction;

pub const CSV_HEADER: [&str; 4] = ["Date", "Description", "Amount", "Type"];

pub fn export_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for t in transactions {
        wtr.write_record([&t.date, &t.description, &t.amount, &t.kind])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_string(transactions: &[Transaction]) -> Result<String> {
    let mut buf = Vec::new();
    export_csv(transactions, &mut buf)?;
    String::from_utf8(buf).context("csv output is not utf-8")
}

/// `transactions-YYYYMMDD-HHMMSS.csv`
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("transactions-{}.csv", now.format("%Y%m%d-%H%M%S"))
}

/// Write the export into `dir` and return the file's path.
pub fn export_to_dir(dir: &Path, transactions: &[Transaction], now: NaiveDateTime) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(export_file_name(now));
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    export_csv(transactions, file).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
