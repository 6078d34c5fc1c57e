// Alert delivery. Fire-and-forget from the cycle's point of view: a sink failure is logged by
// the caller and never changes the cycle outcome.

use std::future::Future;

use crate::error::DeliveryError;
use crate::models::AlertDraft;

pub trait AlertSink {
    fn deliver(
        &self,
        alerts: &[AlertDraft],
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Writes each alert as one warning log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    async fn deliver(&self, alerts: &[AlertDraft]) -> Result<(), DeliveryError> {
        for alert in alerts {
            tracing::warn!(
                operation = "deliver_alert",
                alert_type = %alert.alert_type,
                severity = %alert.severity,
                "[{}] {}: {}",
                alert.severity.as_str().to_uppercase(),
                alert.alert_type,
                alert.message
            );
        }
        Ok(())
    }
}
