use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use super::domain::DisagreementReport;
use crate::workflows::prediction::TransportError;

/// Destination of disagreement reports.
pub trait ReportGateway: Send + Sync {
    fn send(&self, report: DisagreementReport) -> BoxFuture<'_, Result<(), TransportError>>;
}

/// Stand-in for the medical team endpoint: waits, then accepts every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedReportGateway {
    latency: Duration,
}

impl SimulatedReportGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SimulatedReportGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(1_000))
    }
}

impl ReportGateway for SimulatedReportGateway {
    fn send(&self, report: DisagreementReport) -> BoxFuture<'_, Result<(), TransportError>> {
        let latency = self.latency;
        async move {
            tokio::time::sleep(latency).await;
            info!(country = report.country(), "disagreement report delivered");
            Ok(())
        }
        .boxed()
    }
}
