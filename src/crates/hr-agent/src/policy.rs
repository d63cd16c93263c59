//! Approval threshold

use crate::state::{ApprovalStatus, LeaveState};
use serde::{Deserialize, Serialize};

/// Default number of days that can be approved without a reviewer
pub const DEFAULT_THRESHOLD_DAYS: u32 = 5;

/// Decides whether a leave request needs a human reviewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Requests for more than this many days need approval
    pub threshold_days: u32,
}

/// Outcome of [`ApprovalPolicy::assess`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub requires_approval: bool,
    /// `None` for informational queries
    pub status: Option<ApprovalStatus>,
}

impl ApprovalPolicy {
    pub fn new(threshold_days: u32) -> Self {
        Self { threshold_days }
    }

    /// Informational queries and messages without a day count never need
    /// approval; otherwise the count is compared against the threshold.
    pub fn assess(&self, state: &LeaveState) -> Assessment {
        let days = match state.days_requested {
            Some(days) if !state.query_flag => days,
            _ => {
                return Assessment {
                    requires_approval: false,
                    status: None,
                }
            }
        };

        if days > self.threshold_days {
            Assessment {
                requires_approval: true,
                status: Some(ApprovalStatus::Pending),
            }
        } else {
            Assessment {
                requires_approval: false,
                status: Some(ApprovalStatus::AutoApproved),
            }
        }
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_DAYS)
    }
}
