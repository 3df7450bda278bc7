//! Dashboard view state.
//!
//! One record holds everything the dashboard renders. Statement and
//! statistics live in a single `Option<Analysis>` so they can only be set or
//! cleared together.

use std::path::{Path, PathBuf};

use crate::model::{Analysis, BankStatement, Statistics};

/// The only error text a user ever sees; details go to the log.
pub const USER_ERROR_MESSAGE: &str = "Failed to analyze the file. Please try again.";

/// Handed out by [`DashboardState::begin_analysis`]; identifies which file
/// selection a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    selected_file: Option<PathBuf>,
    analyzing: bool,
    analysis: Option<Analysis>,
    error: Option<String>,
    // Bumped on every file selection
    generation: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn statement(&self) -> Option<&BankStatement> {
        self.analysis.as_ref().map(|a| &a.statement)
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.analysis.as_ref().map(|a| &a.statistics)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Store the file and drop whatever was shown for the previous one.
    /// An in-flight analysis keeps running; its result will be discarded.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.selected_file = Some(path.into());
        self.analysis = None;
        self.error = None;
        self.generation += 1;
    }

    /// Whether the analyze trigger is enabled
    pub fn can_analyze(&self) -> bool {
        self.selected_file.is_some() && !self.analyzing
    }

    /// Start an analysis of the selected file.
    ///
    /// Returns `None` when there is no file or an analysis is already in
    /// flight.
    pub fn begin_analysis(&mut self) -> Option<(AnalysisTicket, PathBuf)> {
        if !self.can_analyze() {
            return None;
        }
        let file = self.selected_file.clone()?;
        self.analyzing = true;
        self.analysis = None;
        self.error = None;
        Some((
            AnalysisTicket {
                generation: self.generation,
            },
            file,
        ))
    }

    /// Apply the outcome of an analysis. Returns false when the result was
    /// for an older file selection and has been dropped.
    pub fn complete_analysis<E>(&mut self, ticket: AnalysisTicket, result: Result<Analysis, E>) -> bool {
        self.analyzing = false;
        if ticket.generation != self.generation {
            return false;
        }
        match result {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.error = None;
            }
            Err(_) => {
                self.analysis = None;
                self.error = Some(USER_ERROR_MESSAGE.to_string());
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryCounts, StatementPeriod, Transaction};

    fn analysis() -> Analysis {
        Analysis {
            statement: BankStatement {
                account_holder_name: "Jane".to_string(),
                statement_period: StatementPeriod::default(),
                currency: None,
                opening_balance: "$0.00".to_string(),
                closing_balance: "$10.00".to_string(),
                transactions: vec![Transaction::new("01 Oct 2017", "Pay", "$10.00", "Credit")],
                summary: String::new(),
                recurring_transactions: vec![],
                top_categories: CategoryCounts::new(),
            },
            statistics: serde_json::from_str(
                r#"{"NCF": {}, "expense_income_ratio": {}, "overdraft_limit": 0, "income_stability": 100.0}"#,
            )
            .unwrap(),
        }
    }

    #[test]
    fn test_initial_state_is_empty() {
        let state = DashboardState::new();
        assert!(state.statement().is_none());
        assert!(state.statistics().is_none());
        assert!(!state.is_analyzing());
        assert!(!state.can_analyze());
    }

    #[test]
    fn test_begin_without_file_is_noop() {
        let mut state = DashboardState::new();
        assert!(state.begin_analysis().is_none());
        assert!(!state.is_analyzing());
    }

    #[test]
    fn test_success_populates_both() {
        let mut state = DashboardState::new();
        state.select_file("statement.pdf");
        let (ticket, file) = state.begin_analysis().unwrap();
        assert_eq!(file, PathBuf::from("statement.pdf"));
        assert!(state.is_analyzing());

        assert!(state.complete_analysis::<String>(ticket, Ok(analysis())));
        assert!(!state.is_analyzing());
        assert_eq!(state.statement(), Some(&analysis().statement));
        assert_eq!(state.statistics(), Some(&analysis().statistics));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failure_clears_both_and_sets_message() {
        let mut state = DashboardState::new();
        state.select_file("statement.pdf");
        let (ticket, _) = state.begin_analysis().unwrap();
        state.complete_analysis::<&str>(ticket, Err("upload failed"));
        assert!(state.statement().is_none());
        assert!(state.statistics().is_none());
        assert_eq!(state.error(), Some(USER_ERROR_MESSAGE));
        assert!(!state.is_analyzing());
    }

    #[test]
    fn test_reentrant_begin_is_refused() {
        let mut state = DashboardState::new();
        state.select_file("statement.pdf");
        assert!(state.begin_analysis().is_some());
        assert!(!state.can_analyze());
        assert!(state.begin_analysis().is_none());
    }

    #[test]
    fn test_new_selection_clears_results() {
        let mut state = DashboardState::new();
        state.select_file("a.pdf");
        let (ticket, _) = state.begin_analysis().unwrap();
        state.complete_analysis::<String>(ticket, Ok(analysis()));
        state.select_file("b.pdf");
        assert!(state.analysis().is_none());
        assert_eq!(state.selected_file(), Some(Path::new("b.pdf")));
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut state = DashboardState::new();
        state.select_file("a.pdf");
        let (ticket, _) = state.begin_analysis().unwrap();
        state.select_file("b.pdf");
        assert!(!state.complete_analysis::<String>(ticket, Ok(analysis())));
        assert!(state.analysis().is_none());
        assert!(state.error().is_none());
        assert!(!state.is_analyzing());
        assert!(state.can_analyze());
    }

    #[test]
    fn test_retry_after_failure_clears_error() {
        let mut state = DashboardState::new();
        state.select_file("a.pdf");
        let (ticket, _) = state.begin_analysis().unwrap();
        state.complete_analysis::<&str>(ticket, Err("boom"));
        assert!(state.error().is_some());
        state.begin_analysis().unwrap();
        assert!(state.error().is_none());
    }
}
