use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, SubsecRound, Utc};
use tracing::{info, instrument};

use crate::auth::auth::AuthUser;
use crate::config::LeavePolicy;
use crate::error::{LeaveError, LeaveResult};
use crate::leave::balance::{LeaveBalance, allowance, compute_balance};
use crate::leave::pass_token;
use crate::leave::validation::{LeaveApplication, validate_application, validate_requester};
use crate::model::leave_request::{
    Decision, LeaveRequest, LeaveStatus, NewLeaveRecord, ResponseRecord,
};
use crate::store::{LeaveFilter, LeaveStore, SortOrder};

const UNKNOWN_RESPONDER: &str = "Unknown Faculty";

/// Owns the `pending -> approved | rejected` transitions and pass issuance.
pub struct LeaveLifecycle {
    store: Arc<dyn LeaveStore>,
    policy: LeavePolicy,
}

impl LeaveLifecycle {
    pub fn new(store: Arc<dyn LeaveStore>, policy: LeavePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    pub async fn create(
        &self,
        requester: &AuthUser,
        application: LeaveApplication,
    ) -> LeaveResult<LeaveRequest> {
        self.create_on(requester, application, Utc::now().date_naive())
            .await
    }

    #[instrument(name = "leave_create", skip(self, requester, application), fields(student_id = %requester.user_id))]
    pub async fn create_on(
        &self,
        requester: &AuthUser,
        application: LeaveApplication,
        today: NaiveDate,
    ) -> LeaveResult<LeaveRequest> {
        validate_requester(requester)?;
        let leave = validate_application(&application, &self.policy)?;

        if self.policy.enforce_balance {
            if let Some(total) = allowance(&self.policy, leave.leave_type) {
                let balance = self.balance(&requester.user_id, today).await?;
                let remaining = balance
                    .entry(leave.leave_type)
                    .and_then(|e| e.remaining)
                    .unwrap_or(i64::from(total));
                let requested = (leave.end_date - leave.start_date).num_days() + 1;
                if requested > remaining {
                    return Err(LeaveError::Validation(format!(
                        "Requested {} days exceeds remaining {} {} leave days",
                        requested, remaining, leave.leave_type
                    )));
                }
            }
        }

        let created = self
            .store
            .insert(NewLeaveRecord {
                student_id: requester.user_id.clone(),
                student_name: requester.name.trim().to_string(),
                registration_number: requester.registration_number.clone().unwrap_or_default(),
                department: requester.department.clone().unwrap_or_default(),
                leave_type: leave.leave_type,
                start_date: leave.start_date,
                end_date: leave.end_date,
                reason: leave.reason,
                applied_on: today,
            })
            .await?;

        info!(leave_id = %created.id, leave_type = %created.leave_type, "Leave request submitted");
        Ok(created)
    }

    pub async fn respond(
        &self,
        id: &str,
        decision: Decision,
        responder: &AuthUser,
        remarks: Option<String>,
    ) -> LeaveResult<LeaveRequest> {
        self.respond_at(id, decision, responder, remarks, Utc::now())
            .await
    }

    #[instrument(name = "leave_respond", skip(self, responder, remarks), fields(responder = %responder.user_id))]
    pub async fn respond_at(
        &self,
        id: &str,
        decision: Decision,
        responder: &AuthUser,
        remarks: Option<String>,
        now: DateTime<Utc>,
    ) -> LeaveResult<LeaveRequest> {
        // stored timestamps keep millisecond precision
        let now = now.trunc_subsecs(3);
        let mut record = self.get(id).await?;
        if record.status.is_terminal() {
            return Err(LeaveError::InvalidState(format!(
                "Leave request already {}",
                record.status
            )));
        }

        let responded_by = match responder.name.trim() {
            "" => UNKNOWN_RESPONDER.to_string(),
            name => name.to_string(),
        };
        let pass = match decision {
            Decision::Approve => Some(pass_token::issue(
                now,
                Duration::hours(self.policy.pass_ttl_hours),
            )),
            Decision::Reject => None,
        };
        let response = ResponseRecord {
            status: decision.status(),
            responded_on: now,
            responded_by,
            remarks: remarks
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            pass,
        };

        // another responder may have won between the read and this write
        if !self.store.respond_if_pending(id, &response).await? {
            return Err(LeaveError::InvalidState(
                "Leave request already processed".to_string(),
            ));
        }

        record.apply_response(&response);
        info!(leave_id = %record.id, status = %record.status, "Leave request responded");
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> LeaveResult<LeaveRequest> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| LeaveError::NotFound("Leave request not found".to_string()))
    }

    /// Most recent first.
    pub async fn list_by_requester(&self, requester_id: &str) -> LeaveResult<Vec<LeaveRequest>> {
        self.list_ordered(LeaveFilter::Requester(requester_id.to_string()))
            .await
    }

    /// Most recent first.
    pub async fn list_by_department(&self, department: &str) -> LeaveResult<Vec<LeaveRequest>> {
        self.list_ordered(LeaveFilter::Department(department.to_string()))
            .await
    }

    pub async fn list_all(&self) -> LeaveResult<Vec<LeaveRequest>> {
        Ok(self.store.find(&LeaveFilter::All, None).await?)
    }

    pub async fn balance(&self, student_id: &str, today: NaiveDate) -> LeaveResult<LeaveBalance> {
        let requests = self
            .store
            .find(&LeaveFilter::Requester(student_id.to_string()), None)
            .await?;
        Ok(compute_balance(
            student_id,
            &requests,
            &self.policy,
            today.year(),
        ))
    }

    async fn list_ordered(&self, filter: LeaveFilter) -> LeaveResult<Vec<LeaveRequest>> {
        if self.store.capabilities().ordered_queries {
            return Ok(self
                .store
                .find(&filter, Some(SortOrder::AppliedOnDesc))
                .await?);
        }

        // backend cannot combine filter and order: sort client-side
        let mut requests = self.store.find(&filter, None).await?;
        requests.sort_by(|a, b| b.applied_on.cmp(&a.applied_on));
        Ok(requests)
    }
}

/// Filters an already ordered list by status, keeping the order.
pub fn filter_status(requests: Vec<LeaveRequest>, status: Option<LeaveStatus>) -> Vec<LeaveRequest> {
    match status {
        Some(status) => requests.into_iter().filter(|r| r.status == status).collect(),
        None => requests,
    }
}
