use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Liveness report returned by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    /// ISO-8601 UTC instant, millisecond precision.
    pub timestamp: String,
}

pub fn health_check(clock: &impl Clock) -> HealthReport {
    HealthReport {
        status: "ok".to_string(),
        timestamp: clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
