//! Minimum-duration rule for quieting down.
//!
//! # Responsibilities
//! - Let escalations through immediately
//! - Hold de-escalations until the last automatic switch is old enough
//!
//! # Design Decisions
//! - The last switch instant lives in the shared store so every instance
//!   observes the same hold, whichever one switched
//! - A missing timestamp means nothing is holding

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::coordination::{CoordinationClient, StoreError};
use crate::level::Severity;

/// True when moving from `current` to `recommended` is a de-escalation.
pub fn requires_minimum_duration(current: Severity, recommended: Severity) -> bool {
    current.is_more_verbose_than(recommended)
}

/// True once `minimum` has elapsed since `last`, or when there is no `last`.
pub fn can_switch_after_minimum_time(
    last: Option<DateTime<Utc>>,
    minimum: TimeDelta,
    now: DateTime<Utc>,
) -> bool {
    match last {
        None => true,
        Some(last) => match last.checked_add_signed(minimum) {
            Some(hold_until) => now >= hold_until,
            None => false,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Apply,
    Defer { until: DateTime<Utc> },
}

#[derive(Debug, Clone)]
pub struct HysteresisGate {
    client: Arc<CoordinationClient>,
    minimum: TimeDelta,
}

impl HysteresisGate {
    pub fn new(client: Arc<CoordinationClient>, minimum: TimeDelta) -> Self {
        Self { client, minimum }
    }

    pub async fn evaluate(
        &self,
        current: Severity,
        recommended: Severity,
        now: DateTime<Utc>,
    ) -> Result<Verdict, StoreError> {
        if !requires_minimum_duration(current, recommended) {
            return Ok(Verdict::Apply);
        }

        let last = self.client.read_last_switch().await?;
        if can_switch_after_minimum_time(last, self.minimum, now) {
            return Ok(Verdict::Apply);
        }

        let until = last
            .and_then(|last| last.checked_add_signed(self.minimum))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Ok(Verdict::Defer { until })
    }
}
