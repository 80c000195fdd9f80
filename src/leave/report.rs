use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave_request::{LeaveRequest, LeaveStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    #[schema(example = "2024-02")]
    pub month: String,
    pub requests: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "total": 4,
    "approved": 2,
    "rejected": 1,
    "pending": 1,
    "approvalRate": 50.0,
    "rejectionRate": 25.0,
    "averageResponseDays": 1.5,
    "monthly": [
        { "month": "2024-02", "requests": 4, "approved": 2, "rejected": 1, "pending": 1 }
    ]
}))]
pub struct LeaveReport {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub pending: usize,
    /// Percentage of all requests
    pub approval_rate: f64,
    pub rejection_rate: f64,
    /// Mean days from `appliedOn` to `respondedOn` over responded requests
    pub average_response_days: Option<f64>,
    pub monthly: Vec<MonthlyReport>,
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

pub fn build_report(requests: &[LeaveRequest]) -> LeaveReport {
    let mut months: BTreeMap<String, MonthlyReport> = BTreeMap::new();
    let (mut approved, mut rejected, mut pending) = (0, 0, 0);
    let mut response_secs: Vec<i64> = Vec::new();

    for request in requests {
        let month_key = request.applied_on.format("%Y-%m").to_string();
        let month = months.entry(month_key.clone()).or_insert_with(|| MonthlyReport {
            month: month_key,
            ..MonthlyReport::default()
        });
        month.requests += 1;

        match request.status {
            LeaveStatus::Approved => {
                approved += 1;
                month.approved += 1;
            }
            LeaveStatus::Rejected => {
                rejected += 1;
                month.rejected += 1;
            }
            LeaveStatus::Pending => {
                pending += 1;
                month.pending += 1;
            }
        }

        if let Some(responded_on) = request.responded_on {
            let applied_at = request.applied_on.and_time(NaiveTime::MIN).and_utc();
            response_secs.push((responded_on - applied_at).num_seconds());
        }
    }

    let average_response_days = if response_secs.is_empty() {
        None
    } else {
        let total_secs: i64 = response_secs.iter().sum();
        Some(total_secs as f64 / response_secs.len() as f64 / 86_400.0)
    };

    let total = requests.len();
    LeaveReport {
        total,
        approved,
        rejected,
        pending,
        approval_rate: percentage(approved, total),
        rejection_rate: percentage(rejected, total),
        average_response_days,
        monthly: months.into_values().collect(),
    }
}
