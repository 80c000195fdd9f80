use chrono::Datelike;
use serde::Serialize;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::config::LeavePolicy;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    #[schema(example = 4)]
    pub used: i64,
    /// `None` when the type has no yearly cap
    #[schema(example = 12)]
    pub total: Option<u32>,
    #[schema(example = 8)]
    pub remaining: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub student_id: String,
    #[schema(example = 2024)]
    pub year: i32,
    pub entries: Vec<BalanceEntry>,
}

impl LeaveBalance {
    pub fn entry(&self, leave_type: LeaveType) -> Option<&BalanceEntry> {
        self.entries.iter().find(|e| e.leave_type == leave_type)
    }
}

pub fn allowance(policy: &LeavePolicy, leave_type: LeaveType) -> Option<u32> {
    match leave_type {
        LeaveType::Casual => Some(policy.casual_days),
        LeaveType::Medical => Some(policy.medical_days),
        LeaveType::Emergency => Some(policy.emergency_days),
        LeaveType::Holiday => None,
    }
}

/// Days used per type come from approved requests starting in `year`.
pub fn compute_balance(
    student_id: &str,
    requests: &[LeaveRequest],
    policy: &LeavePolicy,
    year: i32,
) -> LeaveBalance {
    let entries = LeaveType::iter()
        .map(|leave_type| {
            let used = requests
                .iter()
                .filter(|r| r.student_id == student_id)
                .filter(|r| r.status == LeaveStatus::Approved)
                .filter(|r| r.leave_type == leave_type)
                .filter(|r| r.start_date.year() == year)
                .map(|r| r.days().max(0))
                .sum();
            let total = allowance(policy, leave_type);

            BalanceEntry {
                leave_type,
                used,
                total,
                remaining: total.map(|t| (i64::from(t) - used).max(0)),
            }
        })
        .collect();

    LeaveBalance {
        student_id: student_id.to_string(),
        year,
        entries,
    }
}
