use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::LeavePolicy;
use crate::error::{LeaveError, LeaveResult};
use crate::leave::pass_token;
use crate::model::leave_request::LeaveType;

/// Raw leave application as submitted by a student.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplication {
    #[serde(rename = "type", default)]
    #[schema(example = "medical")]
    pub leave_type: String,
    #[serde(default)]
    #[schema(example = "2024-02-20")]
    pub start_date: String,
    #[serde(default)]
    #[schema(example = "2024-02-20")]
    pub end_date: String,
    #[serde(default)]
    #[schema(example = "Doctor appointment")]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLeave {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

pub fn require_non_empty(field: &str, value: &str) -> LeaveResult<()> {
    if value.trim().is_empty() {
        return Err(LeaveError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub fn parse_leave_type(raw: &str) -> LeaveResult<LeaveType> {
    raw.trim().to_lowercase().parse().map_err(|_| {
        LeaveError::Validation(
            "Invalid leave type. Allowed: casual, medical, emergency, holiday".to_string(),
        )
    })
}

pub fn parse_date(field: &str, raw: &str) -> LeaveResult<NaiveDate> {
    require_non_empty(field, raw)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        LeaveError::Validation(format!("{} must be a date in YYYY-MM-DD format", field))
    })
}

/// Named validation: `endDate >= startDate`.
pub fn check_date_order(start: NaiveDate, end: NaiveDate) -> LeaveResult<()> {
    if end < start {
        return Err(LeaveError::Validation(
            "endDate cannot be before startDate".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_requester(requester: &AuthUser) -> LeaveResult<()> {
    require_non_empty("studentId", &requester.user_id)?;
    require_non_empty("studentName", &requester.name)
}

pub fn validate_application(
    application: &LeaveApplication,
    policy: &LeavePolicy,
) -> LeaveResult<ValidatedLeave> {
    require_non_empty("type", &application.leave_type)?;
    let leave_type = parse_leave_type(&application.leave_type)?;
    let start_date = parse_date("startDate", &application.start_date)?;
    let end_date = parse_date("endDate", &application.end_date)?;
    require_non_empty("reason", &application.reason)?;

    if policy.enforce_date_order {
        check_date_order(start_date, end_date)?;
    }

    Ok(ValidatedLeave {
        leave_type,
        start_date,
        end_date,
        reason: application.reason.trim().to_string(),
    })
}

/// Trims a typed or scanned credential; `None` when it cannot be a pass token.
pub fn normalize_token(raw: &str) -> Option<&str> {
    let token = raw.trim();
    pass_token::is_well_formed(token).then_some(token)
}
