//! Simulated submission lifecycle.
//!
//! There is no remote endpoint. A valid submit goes pending, and after a fixed
//! delay it succeeds with a confirmation identifier derived from the clock.

use std::fmt;

use chrono::{DateTime, Utc};

/// Label on the submit control when idle.
pub const SUBMIT_LABEL: &str = "Submit Report";

/// Label on the submit control while a submission is in flight.
pub const PENDING_LABEL: &str = "Submitting...";

/// Confirmation identifier shown after a successful submission.
///
/// Always `SR-` followed by eight digits: the last eight digits of the Unix
/// time in milliseconds at which the submission completed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportId(String);

impl ReportId {
    /// Derive the identifier for a submission completing at `now`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis().rem_euclid(100_000_000);
        Self(format!("SR-{millis:08}"))
    }

    /// The identifier as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the form is in its submission lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    /// Editable; the submit control is enabled.
    #[default]
    Idle,
    /// Submit accepted, waiting for the simulated round trip.
    Pending,
    /// Submitted; the success view replaces the form until it resets.
    Succeeded {
        /// Confirmation shown to the reporter.
        report_id: ReportId,
    },
}

impl SubmitPhase {
    /// The submit control is usable.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// A submission is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The confirmation, once submitted.
    #[must_use]
    pub fn report_id(&self) -> Option<&ReportId> {
        match self {
            Self::Succeeded { report_id } => Some(report_id),
            _ => None,
        }
    }

    /// Label for the submit control. It keeps the pending label until the
    /// form resets.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.is_idle() {
            SUBMIT_LABEL
        } else {
            PENDING_LABEL
        }
    }
}
