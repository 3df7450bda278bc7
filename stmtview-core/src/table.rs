//! Client-side sorting and filtering for the transactions table.
//!
//! Rows are addressed by [`RowId`], the index into the list the service
//! returned, so other views (the recurring list) can point at a row without
//! knowing how it is currently ordered or filtered.

use anyhow::{Result, bail};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::format::parse_amount;
use crate::model::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Description,
    Amount,
    Type,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Date, Column::Description, Column::Amount, Column::Type];

    pub fn title(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Description => "Description",
            Column::Amount => "Amount",
            Column::Type => "Type",
        }
    }

    pub fn value<'a>(&self, txn: &'a Transaction) -> &'a str {
        match self {
            Column::Date => &txn.date,
            Column::Description => &txn.description,
            Column::Amount => &txn.amount,
            Column::Type => &txn.kind,
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            Column::Amount => compare_amounts(&a.amount, &b.amount),
            _ => compare_text(self.value(a), self.value(b)),
        }
    }
}

impl FromStr for Column {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Column::Date),
            "description" | "desc" => Ok(Column::Description),
            "amount" => Ok(Column::Amount),
            "type" => Ok(Column::Type),
            other => bail!("unknown column '{other}' (expected date, description, amount or type)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Column,
    pub direction: SortDirection,
}

/// Index of a row in the received transaction list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub usize);

/// Sort column/direction plus the search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableState {
    sort: Option<SortSpec>,
    query: String,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn sort_by(&mut self, column: Column, direction: SortDirection) {
        self.sort = Some(SortSpec { column, direction });
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Header click: same column flips direction, a new column starts ascending.
    pub fn click_header(&mut self, column: Column) {
        self.sort = Some(match self.sort {
            Some(spec) if spec.column == column => SortSpec {
                column,
                direction: spec.direction.toggled(),
            },
            _ => SortSpec {
                column,
                direction: SortDirection::Ascending,
            },
        });
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
    }

    /// Column title with the sort arrow when it is the active column
    pub fn header_label(&self, column: Column) -> String {
        match self.sort {
            Some(spec) if spec.column == column => {
                format!("{} {}", column.title(), spec.direction.arrow())
            }
            _ => column.title().to_string(),
        }
    }

    /// Rows to render, sorted first and then filtered by the query.
    pub fn visible_rows(&self, transactions: &[Transaction]) -> Vec<RowId> {
        sort_rows(transactions, self.sort)
            .into_iter()
            .filter(|id| matches_query(&transactions[id.0], &self.query))
            .collect()
    }
}

/// Stable sort of row ids; `None` keeps the received order.
pub fn sort_rows(transactions: &[Transaction], sort: Option<SortSpec>) -> Vec<RowId> {
    let mut rows: Vec<RowId> = (0..transactions.len()).map(RowId).collect();
    if let Some(SortSpec { column, direction }) = sort {
        rows.sort_by(|a, b| {
            let ord = column.compare(&transactions[a.0], &transactions[b.0]);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
    rows
}

/// Description and type match case-insensitively; date and amount match as typed.
pub fn matches_query(txn: &Transaction, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let lowered = query.to_lowercase();
    txn.description.to_lowercase().contains(&lowered)
        || txn.date.contains(query)
        || txn.amount.contains(query)
        || txn.kind.to_lowercase().contains(&lowered)
}

/// Locale-style text order: case-insensitive, lowercase first on ties.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Numeric order of currency strings; unparseable amounts go last.
pub fn compare_amounts(a: &str, b: &str) -> Ordering {
    match (parse_amount(a), parse_amount(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Row for a recurring-transaction label, ignoring case: an exact
/// description match first, then a description that starts with the label
/// as a whole word ("Rent" finds "Rent Maple Apartments", never "Parent").
pub fn find_row(transactions: &[Transaction], description: &str) -> Option<RowId> {
    let needle = description.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    transactions
        .iter()
        .position(|t| t.description.trim().to_lowercase() == needle)
        .or_else(|| {
            transactions.iter().position(|t| {
                let desc = t.description.trim().to_lowercase();
                desc.strip_prefix(needle.as_str())
                    .is_some_and(|rest| rest.starts_with(char::is_whitespace))
            })
        })
        .map(RowId)
}
