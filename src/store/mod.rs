//! Document-store abstraction over the `leave_requests` collection.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::leave_request::{LeaveRequest, NewLeaveRecord, ResponseRecord};

pub use memory::MemoryLeaveStore;
pub use mysql::MySqlLeaveStore;

pub const COLLECTION_NAME: &str = "leave_requests";

/// Field filter for collection queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveFilter {
    All,
    Requester(String),
    Department(String),
}

impl LeaveFilter {
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        match self {
            LeaveFilter::All => true,
            LeaveFilter::Requester(id) => &request.student_id == id,
            LeaveFilter::Department(dept) => &request.department == dept,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    AppliedOnDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// Backend can combine a field filter with an ordering in one query
    pub ordered_queries: bool,
}

/// Persistence seam for leave requests. Every write is atomic per document.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    fn capabilities(&self) -> StoreCapabilities;

    async fn insert(&self, draft: NewLeaveRecord) -> Result<LeaveRequest, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError>;

    /// Callers must only pass `Some(order)` when `capabilities().ordered_queries` holds.
    async fn find(
        &self,
        filter: &LeaveFilter,
        order: Option<SortOrder>,
    ) -> Result<Vec<LeaveRequest>, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<LeaveRequest>, StoreError>;

    /// Applies `response` only while the record is still pending.
    /// Returns `false` when the record was missing or already terminal.
    async fn respond_if_pending(
        &self,
        id: &str,
        response: &ResponseRecord,
    ) -> Result<bool, StoreError>;

    /// Compare-and-set of `isScanned` from `false` to `true`.
    async fn mark_scanned(&self, id: &str) -> Result<bool, StoreError>;
}
