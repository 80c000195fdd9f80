use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};
use uuid::Uuid;

use super::{COLLECTION_NAME, LeaveFilter, LeaveStore, SortOrder, StoreCapabilities};
use crate::error::StoreError;
use crate::model::leave_request::{LeaveRequest, NewLeaveRecord, ResponseRecord};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

const SELECT_COLUMNS: &str = r#"
    SELECT id, student_id, student_name, registration_number, department,
           leave_type, start_date, end_date, reason, status, applied_on,
           responded_on, responded_by, remarks,
           qr_code_token, qr_code_expires_at, is_scanned
    FROM leave_requests
"#;

#[derive(FromRow)]
struct LeaveRow {
    id: String,
    student_id: String,
    student_name: String,
    registration_number: String,
    department: String,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: String,
    applied_on: NaiveDate,
    responded_on: Option<DateTime<Utc>>,
    responded_by: Option<String>,
    remarks: Option<String>,
    qr_code_token: Option<String>,
    qr_code_expires_at: Option<DateTime<Utc>>,
    is_scanned: Option<bool>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = row.leave_type.parse().map_err(|_| StoreError::Corrupt {
            id: row.id.clone(),
            reason: format!("unknown leave type {}", row.leave_type),
        })?;
        let status = row.status.parse().map_err(|_| StoreError::Corrupt {
            id: row.id.clone(),
            reason: format!("unknown status {}", row.status),
        })?;

        Ok(LeaveRequest {
            id: row.id,
            student_id: row.student_id,
            student_name: row.student_name,
            registration_number: row.registration_number,
            department: row.department,
            leave_type,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status,
            applied_on: row.applied_on,
            responded_on: row.responded_on,
            responded_by: row.responded_by,
            remarks: row.remarks,
            qr_code_token: row.qr_code_token,
            qr_code_expires_at: row.qr_code_expires_at,
            is_scanned: row.is_scanned,
        })
    }
}

fn into_requests(rows: Vec<LeaveRow>) -> Result<Vec<LeaveRequest>, StoreError> {
    rows.into_iter().map(LeaveRequest::try_from).collect()
}

/// MySQL-backed store. The composite indexes created with the schema let it
/// serve filtered, ordered queries directly.
pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            ordered_queries: true,
        }
    }

    async fn insert(&self, draft: NewLeaveRecord) -> Result<LeaveRequest, StoreError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO leave_requests
                (id, student_id, student_name, registration_number, department,
                 leave_type, start_date, end_date, reason, status, applied_on)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(&id)
        .bind(&draft.student_id)
        .bind(&draft.student_name)
        .bind(&draft.registration_number)
        .bind(&draft.department)
        .bind(draft.leave_type.to_string())
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.reason)
        .bind(draft.applied_on)
        .execute(&self.pool)
        .await?;

        Ok(LeaveRequest::from_draft(id, draft))
    }

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(LeaveRequest::try_from).transpose()
    }

    async fn find(
        &self,
        filter: &LeaveFilter,
        order: Option<SortOrder>,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let (where_sql, arg) = match filter {
            LeaveFilter::All => ("", None),
            LeaveFilter::Requester(id) => (" WHERE student_id = ?", Some(id.as_str())),
            LeaveFilter::Department(dept) => (" WHERE department = ?", Some(dept.as_str())),
        };
        let order_sql = match order {
            Some(SortOrder::AppliedOnDesc) => " ORDER BY applied_on DESC",
            None => "",
        };
        let sql = format!("{}{}{}", SELECT_COLUMNS, where_sql, order_sql);

        let mut query = sqlx::query_as::<_, LeaveRow>(&sql);
        if let Some(arg) = arg {
            query = query.bind(arg);
        }
        into_requests(query.fetch_all(&self.pool).await?)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let sql = format!("{} WHERE qr_code_token = ? LIMIT 1", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.map(LeaveRequest::try_from).transpose()
    }

    async fn respond_if_pending(
        &self,
        id: &str,
        response: &ResponseRecord,
    ) -> Result<bool, StoreError> {
        let mut assignments = vec![
            ("status", SqlValue::String(response.status.to_string())),
            ("responded_on", SqlValue::DateTime(response.responded_on)),
            ("responded_by", SqlValue::String(response.responded_by.clone())),
            ("remarks", SqlValue::from(response.remarks.clone())),
        ];
        if let Some(pass) = &response.pass {
            assignments.push(("qr_code_token", SqlValue::String(pass.token.clone())));
            assignments.push(("qr_code_expires_at", SqlValue::DateTime(pass.expires_at)));
            assignments.push(("is_scanned", SqlValue::Bool(false)));
        }

        let Some(update) = build_update_sql(
            COLLECTION_NAME,
            assignments,
            "id",
            id,
            Some("status = 'pending'"),
        ) else {
            return Ok(false);
        };

        Ok(execute_update(&self.pool, update).await? == 1)
    }

    async fn mark_scanned(&self, id: &str) -> Result<bool, StoreError> {
        let Some(update) = build_update_sql(
            COLLECTION_NAME,
            vec![("is_scanned", SqlValue::Bool(true))],
            "id",
            id,
            Some("is_scanned = FALSE"),
        ) else {
            return Ok(false);
        };

        Ok(execute_update(&self.pool, update).await? == 1)
    }
}
