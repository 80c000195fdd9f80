use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::EnumString,
    strum_macros::Display,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Casual,
    Medical,
    Emergency,
    Holiday,
}

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::EnumString,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// `approved` and `rejected` accept no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(&self) -> LeaveStatus {
        match self {
            Decision::Approve => LeaveStatus::Approved,
            Decision::Reject => LeaveStatus::Rejected,
        }
    }
}

/// Stored leave-request document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "4f0c3f55-6a55-4b59-9f52-55a1a7a0e0c1",
    "studentId": "stu-123",
    "studentName": "John Doe",
    "registrationNumber": "REG2024001",
    "department": "CSE",
    "type": "medical",
    "startDate": "2024-02-20",
    "endDate": "2024-02-20",
    "reason": "Doctor appointment",
    "status": "approved",
    "appliedOn": "2024-02-18",
    "respondedOn": "2024-02-19T09:30:00Z",
    "respondedBy": "Dr. Smith",
    "qrCodeToken": "PASS-K3F9Q2Z-1708335000000",
    "qrCodeExpiresAt": "2024-02-20T09:30:00Z",
    "isScanned": false
}))]
pub struct LeaveRequest {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub registration_number: String,
    pub department: String,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(value_type = String, format = "date")]
    pub applied_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub responded_on: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub qr_code_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_scanned: Option<bool>,
}

impl LeaveRequest {
    pub fn from_draft(id: String, draft: NewLeaveRecord) -> Self {
        Self {
            id,
            student_id: draft.student_id,
            student_name: draft.student_name,
            registration_number: draft.registration_number,
            department: draft.department,
            leave_type: draft.leave_type,
            start_date: draft.start_date,
            end_date: draft.end_date,
            reason: draft.reason,
            status: LeaveStatus::Pending,
            applied_on: draft.applied_on,
            responded_on: None,
            responded_by: None,
            remarks: None,
            qr_code_token: None,
            qr_code_expires_at: None,
            is_scanned: None,
        }
    }

    /// Inclusive number of calendar days covered by the request.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn apply_response(&mut self, response: &ResponseRecord) {
        self.status = response.status;
        self.responded_on = Some(response.responded_on);
        self.responded_by = Some(response.responded_by.clone());
        self.remarks = response.remarks.clone();
        if let Some(pass) = &response.pass {
            self.qr_code_token = Some(pass.token.clone());
            self.qr_code_expires_at = Some(pass.expires_at);
            self.is_scanned = Some(false);
        }
    }
}

/// Validated record ready for insertion; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewLeaveRecord {
    pub student_id: String,
    pub student_name: String,
    pub registration_number: String,
    pub department: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub applied_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssuedPass {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Fields written when a request leaves `pending`.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: LeaveStatus,
    pub responded_on: DateTime<Utc>,
    pub responded_by: String,
    pub remarks: Option<String>,
    pub pass: Option<IssuedPass>,
}
