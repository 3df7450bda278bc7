//! When results may be fetched after an upload has been accepted.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    /// The upload response is the completion signal: the service processes
    /// the statement before answering `/upload`.
    #[default]
    UploadAck,
    /// Re-fetch results until both documents decode.
    Poll { interval: Duration, max_attempts: u32 },
    /// Sleep once, then fetch. For services that answer early and give no
    /// usable "not ready" response.
    FixedDelay(Duration),
}

impl Readiness {
    pub const LEGACY_DELAY: Duration = Duration::from_millis(2000);

    pub fn poll() -> Self {
        Readiness::Poll {
            interval: Duration::from_millis(500),
            max_attempts: 20,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Readiness::UploadAck => "upload-ack",
            Readiness::Poll { .. } => "poll",
            Readiness::FixedDelay(_) => "fixed-delay",
        }
    }
}
