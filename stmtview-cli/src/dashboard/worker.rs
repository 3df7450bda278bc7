use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use stmtview_core::{Analysis, AnalysisTicket};
use stmtview_ingest::{HttpAnalysisService, Readiness, analyze_file};
use tokio::runtime::Handle;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ticket: AnalysisTicket,
    pub file: PathBuf,
}

#[derive(Debug)]
pub enum AnalysisEvent {
    Finished {
        ticket: AnalysisTicket,
        result: Result<Analysis, String>,
    },
}

/// Run one analysis on the runtime and report back to the UI loop.
/// Nothing cancels it; the UI decides whether the result still applies.
pub fn spawn_analysis(
    handle: &Handle,
    service: Arc<HttpAnalysisService>,
    readiness: Readiness,
    req: AnalysisRequest,
    tx: Sender<AnalysisEvent>,
) {
    handle.spawn(async move {
        let result = analyze_file(service.as_ref(), &req.file, readiness).await;
        if let Err(e) = &result {
            warn!(file = %req.file.display(), error = %e, "analysis failed");
        }
        let _ = tx.send(AnalysisEvent::Finished {
            ticket: req.ticket,
            result: result.map_err(|e| e.to_string()),
        });
    });
}
