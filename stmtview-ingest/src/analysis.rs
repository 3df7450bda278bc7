//! Upload, wait, fetch: one analysis round trip.

use std::path::Path;
use stmtview_core::{Analysis, DashboardState};
use tracing::{debug, info, warn};

use crate::client::AnalysisService;
use crate::error::IngestError;
use crate::readiness::Readiness;

/// Fetch statement and statistics together; both must succeed.
pub async fn fetch_results<S: AnalysisService>(service: &S) -> Result<Analysis, IngestError> {
    let (statement, statistics) =
        tokio::try_join!(service.load_bank_statement(), service.get_statistics())?;
    Ok(Analysis {
        statement,
        statistics,
    })
}

/// Upload `file`, wait according to `readiness`, then fetch the results.
pub async fn analyze_file<S: AnalysisService>(
    service: &S,
    file: &Path,
    readiness: Readiness,
) -> Result<Analysis, IngestError> {
    info!(file = %file.display(), readiness = readiness.label(), "uploading statement");
    service.upload(file).await?;

    let analysis = match readiness {
        Readiness::UploadAck => fetch_results(service).await?,
        Readiness::FixedDelay(delay) => {
            debug!(delay_ms = delay.as_millis() as u64, "waiting before fetch");
            tokio::time::sleep(delay).await;
            fetch_results(service).await?
        }
        Readiness::Poll {
            interval,
            max_attempts,
        } => poll_results(service, interval, max_attempts.max(1)).await?,
    };

    info!(
        transactions = analysis.statement.transactions.len(),
        categories = analysis.statement.top_categories.len(),
        "analysis complete"
    );
    Ok(analysis)
}

async fn poll_results<S: AnalysisService>(
    service: &S,
    interval: std::time::Duration,
    max_attempts: u32,
) -> Result<Analysis, IngestError> {
    let mut attempt = 1;
    loop {
        match fetch_results(service).await {
            Ok(analysis) => return Ok(analysis),
            Err(err) if err.is_pending() => {
                if attempt >= max_attempts {
                    warn!(attempt, error = %err, "giving up on results");
                    return Err(IngestError::NotReady { attempts: attempt });
                }
                debug!(attempt, error = %err, "results not ready");
                attempt += 1;
                tokio::time::sleep(interval).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Drive one analysis through the dashboard state.
///
/// Returns false without touching the network when there is no file or an
/// analysis is already running.
pub async fn run_analysis<S: AnalysisService>(
    state: &mut DashboardState,
    service: &S,
    readiness: Readiness,
) -> bool {
    let Some((ticket, file)) = state.begin_analysis() else {
        return false;
    };

    let result = analyze_file(service, &file, readiness).await;
    if let Err(err) = &result {
        warn!(file = %file.display(), error = %err, "analysis failed");
    }
    state.complete_analysis(ticket, result);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use stmtview_core::{BankStatement, Statistics, USER_ERROR_MESSAGE};

    fn statement() -> BankStatement {
        serde_json::from_str(
            r#"{"account_holder_name": "Jane", "transactions": [
                {"date": "01 Oct 2017", "description": "Pay", "amount": "$10.00", "type": "Credit"}],
                "top_categories": {"Income": 1}}"#,
        )
        .unwrap()
    }

    fn statistics() -> Statistics {
        serde_json::from_str(
            r#"{"NCF": {"10": 10.0}, "expense_income_ratio": {"10": 0.0},
                "overdraft_limit": 0, "income_stability": 100.0}"#,
        )
        .unwrap()
    }

    /// In-memory service; results start failing until `ready_after` fetches.
    struct FakeService {
        upload_status: Option<u16>,
        statistics_status: Option<u16>,
        ready_after: u32,
        uploads: Mutex<Vec<PathBuf>>,
        statement_fetches: AtomicU32,
    }

    impl FakeService {
        fn ok() -> Self {
            Self {
                upload_status: None,
                statistics_status: None,
                ready_after: 0,
                uploads: Mutex::new(Vec::new()),
                statement_fetches: AtomicU32::new(0),
            }
        }
    }

    impl AnalysisService for FakeService {
        async fn upload(&self, file: &Path) -> Result<(), IngestError> {
            self.uploads.lock().unwrap().push(file.to_path_buf());
            match self.upload_status {
                Some(status) => Err(IngestError::Upload {
                    status,
                    body: "rejected".to_string(),
                }),
                None => Ok(()),
            }
        }

        async fn load_bank_statement(&self) -> Result<BankStatement, IngestError> {
            let n = self.statement_fetches.fetch_add(1, Ordering::SeqCst);
            if n < self.ready_after {
                let source = serde_json::from_str::<BankStatement>("\"Bank statement not found\"").unwrap_err();
                return Err(IngestError::Decode {
                    endpoint: "/load_bank_statement",
                    source,
                });
            }
            Ok(statement())
        }

        async fn get_statistics(&self) -> Result<Statistics, IngestError> {
            match self.statistics_status {
                Some(status) => Err(IngestError::Fetch {
                    endpoint: "/get_statistics",
                    status,
                    body: String::new(),
                }),
                None => Ok(statistics()),
            }
        }
    }

    #[tokio::test]
    async fn test_success_stores_server_values() {
        let svc = FakeService::ok();
        let mut state = DashboardState::new();
        state.select_file("statement.pdf");

        assert!(run_analysis(&mut state, &svc, Readiness::UploadAck).await);
        assert!(!state.is_analyzing());
        assert_eq!(state.statement(), Some(&statement()));
        assert_eq!(state.statistics(), Some(&statistics()));
        assert_eq!(svc.uploads.lock().unwrap().as_slice(), &[PathBuf::from("statement.pdf")]);
    }

    #[tokio::test]
    async fn test_failed_upload_clears_results() {
        let svc = FakeService {
            upload_status: Some(500),
            ..FakeService::ok()
        };
        let mut state = DashboardState::new();
        state.select_file("statement.pdf");

        run_analysis(&mut state, &svc, Readiness::UploadAck).await;
        assert!(state.statement().is_none());
        assert!(state.statistics().is_none());
        assert_eq!(state.error(), Some(USER_ERROR_MESSAGE));
        assert!(!state.is_analyzing());
        assert_eq!(svc.statement_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_failed_fetch_fails_whole_analysis() {
        let svc = FakeService {
            statistics_status: Some(500),
            ..FakeService::ok()
        };
        let mut state = DashboardState::new();
        state.select_file("statement.pdf");

        run_analysis(&mut state, &svc, Readiness::UploadAck).await;
        assert!(state.analysis().is_none());
        assert!(state.error().is_some());
    }

    #[tokio::test]
    async fn test_no_file_is_noop() {
        let svc = FakeService::ok();
        let mut state = DashboardState::new();
        assert!(!run_analysis(&mut state, &svc, Readiness::UploadAck).await);
        assert!(svc.uploads.lock().unwrap().is_empty());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_poll_waits_for_results() {
        let svc = FakeService {
            ready_after: 2,
            ..FakeService::ok()
        };
        let readiness = Readiness::Poll {
            interval: Duration::from_millis(1),
            max_attempts: 5,
        };
        let analysis = analyze_file(&svc, Path::new("s.pdf"), readiness).await.unwrap();
        assert_eq!(analysis.statement, statement());
        assert_eq!(svc.statement_fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_gives_up() {
        let svc = FakeService {
            ready_after: 100,
            ..FakeService::ok()
        };
        let readiness = Readiness::Poll {
            interval: Duration::from_millis(1),
            max_attempts: 3,
        };
        let err = analyze_file(&svc, Path::new("s.pdf"), readiness).await.unwrap_err();
        assert!(matches!(err, IngestError::NotReady { attempts: 3 }));
    }

    #[tokio::test]
    async fn test_poll_does_not_retry_upload_failure() {
        let svc = FakeService {
            upload_status: Some(400),
            ..FakeService::ok()
        };
        let err = analyze_file(&svc, Path::new("s.pdf"), Readiness::poll()).await.unwrap_err();
        assert!(matches!(err, IngestError::Upload { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_fixed_delay_fetches_once() {
        let svc = FakeService::ok();
        let readiness = Readiness::FixedDelay(Duration::from_millis(5));
        analyze_file(&svc, Path::new("s.pdf"), readiness).await.unwrap();
        assert_eq!(svc.statement_fetches.load(Ordering::SeqCst), 1);
    }
}
