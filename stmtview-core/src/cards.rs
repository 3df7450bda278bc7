//! Summary cards and statement facts shown above the chart.

use crate::format::{format_currency, format_percent};
use crate::model::{BankStatement, Statistics};

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub label: &'static str,
    pub value: String,
}

/// Sum of net cash flow over every period
pub fn net_cash_flow(stats: &Statistics) -> f64 {
    stats.net_cash_flow.values().sum()
}

/// Mean expense/income ratio; an empty series divides by one.
pub fn average_expense_ratio(stats: &Statistics) -> f64 {
    let n = stats.expense_income_ratio.len().max(1);
    stats.expense_income_ratio.values().sum::<f64>() / n as f64
}

pub fn summary_cards(stats: &Statistics) -> Vec<SummaryCard> {
    vec![
        SummaryCard {
            label: "Net Cash Flow",
            value: format_currency(net_cash_flow(stats)),
        },
        SummaryCard {
            label: "Income Stability",
            value: format_percent(stats.income_stability),
        },
        SummaryCard {
            label: "Overdrafts",
            value: stats.overdraft_count.to_string(),
        },
        SummaryCard {
            label: "Avg Expense Ratio",
            value: format_percent(average_expense_ratio(stats)),
        },
    ]
}

pub fn statement_facts(statement: &BankStatement) -> Vec<(&'static str, String)> {
    let period = &statement.statement_period;
    vec![
        ("Account holder", statement.account_holder_name.clone()),
        ("Period", format!("{} to {}", period.start_date, period.end_date)),
        ("Opening balance", statement.opening_balance.clone()),
        ("Closing balance", statement.closing_balance.clone()),
    ]
}
