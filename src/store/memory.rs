use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::{LeaveFilter, LeaveStore, SortOrder, StoreCapabilities};
use crate::error::StoreError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeaveRecord, ResponseRecord};

/// In-process store. Each operation holds the lock for its full read-modify-write.
pub struct MemoryLeaveStore {
    records: RwLock<HashMap<String, LeaveRequest>>,
    ordered_queries: bool,
}

impl MemoryLeaveStore {
    pub fn new(ordered_queries: bool) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ordered_queries,
        }
    }

    /// Seed or overwrite a record verbatim.
    #[cfg(test)]
    pub fn put(&self, request: LeaveRequest) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        records.insert(request.id.clone(), request);
        Ok(())
    }
}

impl Default for MemoryLeaveStore {
    fn default() -> Self {
        Self::new(false)
    }
}

#[async_trait]
impl LeaveStore for MemoryLeaveStore {
    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities {
            ordered_queries: self.ordered_queries,
        }
    }

    async fn insert(&self, draft: NewLeaveRecord) -> Result<LeaveRequest, StoreError> {
        let request = LeaveRequest::from_draft(Uuid::new_v4().to_string(), draft);
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        records.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(id).cloned())
    }

    async fn find(
        &self,
        filter: &LeaveFilter,
        order: Option<SortOrder>,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut found: Vec<LeaveRequest> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        if let Some(SortOrder::AppliedOnDesc) = order {
            found.sort_by(|a, b| b.applied_on.cmp(&a.applied_on));
        }
        Ok(found)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<LeaveRequest>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .values()
            .find(|r| r.qr_code_token.as_deref() == Some(token))
            .cloned())
    }

    async fn respond_if_pending(
        &self,
        id: &str,
        response: &ResponseRecord,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        match records.get_mut(id) {
            Some(record) if record.status == LeaveStatus::Pending => {
                record.apply_response(response);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_scanned(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        match records.get_mut(id) {
            Some(record) if record.is_scanned == Some(false) => {
                record.is_scanned = Some(true);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
