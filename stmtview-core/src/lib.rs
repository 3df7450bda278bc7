//! stmtview-core: statement documents and the view logic of the dashboard

pub mod cards;
pub mod chart;
pub mod export;
pub mod format;
pub mod model;
pub mod table;
pub mod view;

pub use cards::{SummaryCard, statement_facts, summary_cards};
pub use chart::PieChart;
pub use export::{CSV_HEADER, export_csv, export_to_dir, export_to_string};
pub use format::{PALETTE, Rgb, format_currency, format_percent, palette_for, parse_amount};
pub use model::{
    Analysis, BankStatement, CategoryCounts, OrderedMap, PeriodSeries, StatementPeriod, Statistics,
    Transaction,
};
pub use table::{Column, RowId, SortDirection, SortSpec, TableState, find_row};
pub use view::{AnalysisTicket, DashboardState, USER_ERROR_MESSAGE};
