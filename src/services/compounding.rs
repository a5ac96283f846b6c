//! Background scheduler driving the weekly compounding batch

use crate::services::InvestmentService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

/// Periodically runs the compounding batch.
///
/// The poll interval only bounds how quickly a due investment is picked up;
/// whether an investment compounds is decided by its `next_compound_date`,
/// so polling more often than weekly is always safe.
pub struct CompoundingScheduler {
    investment_service: Arc<InvestmentService>,
    poll_interval: Duration,
}

impl CompoundingScheduler {
    pub fn new(investment_service: Arc<InvestmentService>, poll_interval: Duration) -> Self {
        Self {
            investment_service,
            poll_interval,
        }
    }

    /// Run the scheduler loop forever
    pub async fn start(self) {
        let mut interval = time::interval(self.poll_interval);
        info!(
            "Compounding scheduler started, checking every {:?}",
            self.poll_interval
        );

        loop {
            interval.tick().await;

            match self.investment_service.apply_weekly_compounding().await {
                Ok(report) => {
                    if report.processed > 0 || report.failed > 0 {
                        info!(
                            "Compounding cycle: {} processed, {} skipped, {} failed",
                            report.processed, report.skipped, report.failed
                        );
                    }
                }
                Err(e) => {
                    error!("Compounding cycle failed: {}", e);
                }
            }
        }
    }
}
