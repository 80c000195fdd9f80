use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::LeaveResult;
use crate::leave::validation::normalize_token;
use crate::model::leave_request::LeaveRequest;
use crate::store::LeaveStore;

pub const INVALID_CODE: &str = "Invalid QR Code";
pub const ALREADY_SCANNED: &str = "QR Code already used/scanned";
pub const EXPIRED: &str = "QR Code expired";
pub const VERIFIED: &str = "Verified Successfully";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub success: bool,
    #[schema(example = "Verified Successfully")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<LeaveRequest>,
}

impl VerificationResult {
    pub fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            request: None,
        }
    }
}

/// Validates exit-pass tokens and consumes them on success.
pub struct PassVerifier {
    store: Arc<dyn LeaveStore>,
}

impl PassVerifier {
    pub fn new(store: Arc<dyn LeaveStore>) -> Self {
        Self { store }
    }

    pub async fn verify(&self, token: &str) -> LeaveResult<VerificationResult> {
        self.verify_at(token, Utc::now()).await
    }

    /// Checks run in a fixed order: unknown, already scanned, expired.
    /// Replay is therefore reported ahead of staleness.
    pub async fn verify_at(&self, raw: &str, now: DateTime<Utc>) -> LeaveResult<VerificationResult> {
        let Some(token) = normalize_token(raw) else {
            return Ok(VerificationResult::rejected(INVALID_CODE));
        };
        let Some(mut request) = self.store.find_by_token(token).await? else {
            warn!("Unknown pass token presented");
            return Ok(VerificationResult::rejected(INVALID_CODE));
        };

        if request.is_scanned == Some(true) {
            warn!(leave_id = %request.id, "Pass replay rejected");
            return Ok(VerificationResult::rejected(ALREADY_SCANNED));
        }

        if request.qr_code_expires_at.is_some_and(|expires_at| expires_at < now) {
            info!(leave_id = %request.id, "Expired pass rejected");
            return Ok(VerificationResult::rejected(EXPIRED));
        }

        // a concurrent scan can win between the lookup and here
        if !self.store.mark_scanned(&request.id).await? {
            warn!(leave_id = %request.id, "Pass consumed by a concurrent scan");
            return Ok(VerificationResult::rejected(ALREADY_SCANNED));
        }

        request.is_scanned = Some(true);
        info!(leave_id = %request.id, student_id = %request.student_id, "Pass verified");
        Ok(VerificationResult {
            success: true,
            message: VERIFIED.to_string(),
            request: Some(request),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::AuthUser;
    use crate::config::LeavePolicy;
    use crate::leave::lifecycle::LeaveLifecycle;
    use crate::leave::validation::LeaveApplication;
    use crate::model::leave_request::{Decision, LeaveStatus};
    use crate::model::role::Role;
    use crate::error::StoreError;
    use crate::model::leave_request::{NewLeaveRecord, ResponseRecord};
    use crate::store::{LeaveFilter, MemoryLeaveStore, SortOrder, StoreCapabilities};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixture {
        store: Arc<MemoryLeaveStore>,
        lifecycle: LeaveLifecycle,
        verifier: PassVerifier,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryLeaveStore::default());
        Fixture {
            lifecycle: LeaveLifecycle::new(store.clone(), LeavePolicy::default()),
            verifier: PassVerifier::new(store.clone()),
            store,
        }
    }

    fn user(id: &str, name: &str, role: Role) -> AuthUser {
        AuthUser {
            user_id: id.to_string(),
            name: name.to_string(),
            role,
            department: Some("CSE".to_string()),
            registration_number: Some("REG2024001".to_string()),
        }
    }

    async fn approved_token(fx: &Fixture, approved_at: DateTime<Utc>) -> String {
        let created = fx
            .lifecycle
            .create_on(
                &user("stu-123", "John Doe", Role::Student),
                LeaveApplication {
                    leave_type: "medical".to_string(),
                    start_date: "2024-02-20".to_string(),
                    end_date: "2024-02-20".to_string(),
                    reason: "Doctor appointment".to_string(),
                },
                approved_at.date_naive(),
            )
            .await
            .unwrap();
        assert_eq!(created.status, LeaveStatus::Pending);

        fx.lifecycle
            .respond_at(
                &created.id,
                Decision::Approve,
                &user("fac-1", "Dr. Smith", Role::Faculty),
                None,
                approved_at,
            )
            .await
            .unwrap()
            .qr_code_token
            .unwrap()
    }

    #[actix_web::test]
    async fn pass_is_single_use() {
        let fx = fixture();
        let approved_at = Utc.with_ymd_and_hms(2024, 2, 19, 9, 0, 0).unwrap();
        let token = approved_token(&fx, approved_at).await;

        let first = fx
            .verifier
            .verify_at(&token, approved_at + Duration::hours(1))
            .await
            .unwrap();
        assert!(first.success);
        assert_eq!(first.message, VERIFIED);
        assert_eq!(first.request.unwrap().is_scanned, Some(true));

        let second = fx
            .verifier
            .verify_at(&token, approved_at + Duration::hours(2))
            .await
            .unwrap();
        assert!(!second.success);
        assert_eq!(second.message, ALREADY_SCANNED);
        assert!(second.request.is_none());
    }

    #[actix_web::test]
    async fn unknown_tokens_are_invalid_and_mutate_nothing() {
        let fx = fixture();
        let approved_at = Utc.with_ymd_and_hms(2024, 2, 19, 9, 0, 0).unwrap();
        let token = approved_token(&fx, approved_at).await;
        let before = fx.lifecycle.list_all().await.unwrap();

        for raw in ["PASS-ZZZZZZZ-1708333200000", "LEAVE-1-TOKEN", "", "   "] {
            let result = fx.verifier.verify_at(raw, approved_at).await.unwrap();
            assert!(!result.success);
            assert_eq!(result.message, INVALID_CODE);
        }

        assert_eq!(fx.lifecycle.list_all().await.unwrap(), before);
        assert_ne!(before[0].qr_code_token.as_deref(), Some("PASS-ZZZZZZZ-1708333200000"));
        assert_eq!(before[0].qr_code_token.as_deref(), Some(token.as_str()));
    }

    #[actix_web::test]
    async fn expired_pass_is_rejected_without_consuming_it() {
        let fx = fixture();
        let approved_at = Utc.with_ymd_and_hms(2024, 2, 19, 9, 0, 0).unwrap();
        let token = approved_token(&fx, approved_at).await;

        // exactly at expiry the pass is still good
        let at_expiry = approved_at + Duration::hours(24);
        let late = fx
            .verifier
            .verify_at(&token, at_expiry + Duration::milliseconds(1))
            .await
            .unwrap();
        assert!(!late.success);
        assert_eq!(late.message, EXPIRED);

        let record = fx.store.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(record.is_scanned, Some(false));

        let on_time = fx.verifier.verify_at(&token, at_expiry).await.unwrap();
        assert!(on_time.success);
    }

    #[actix_web::test]
    async fn replay_is_reported_before_expiry() {
        let fx = fixture();
        let approved_at = Utc.with_ymd_and_hms(2024, 2, 19, 9, 0, 0).unwrap();
        let token = approved_token(&fx, approved_at).await;

        let mut record = fx.store.find_by_token(&token).await.unwrap().unwrap();
        record.is_scanned = Some(true);
        fx.store.put(record).unwrap();

        let result = fx
            .verifier
            .verify_at(&token, approved_at + Duration::days(3))
            .await
            .unwrap();
        assert_eq!(result.message, ALREADY_SCANNED);
    }

    /// Lets a competing gate scan consume the pass right after the lookup,
    /// before the verifier under test reaches its compare-and-set.
    struct RacingStore {
        inner: Arc<MemoryLeaveStore>,
        raced: AtomicBool,
        rival: Mutex<Option<VerificationResult>>,
    }

    #[async_trait]
    impl LeaveStore for RacingStore {
        fn capabilities(&self) -> StoreCapabilities {
            self.inner.capabilities()
        }

        async fn insert(&self, draft: NewLeaveRecord) -> Result<LeaveRequest, StoreError> {
            self.inner.insert(draft).await
        }

        async fn get(&self, id: &str) -> Result<Option<LeaveRequest>, StoreError> {
            self.inner.get(id).await
        }

        async fn find(
            &self,
            filter: &LeaveFilter,
            order: Option<SortOrder>,
        ) -> Result<Vec<LeaveRequest>, StoreError> {
            self.inner.find(filter, order).await
        }

        async fn find_by_token(&self, token: &str) -> Result<Option<LeaveRequest>, StoreError> {
            let found = self.inner.find_by_token(token).await?;
            if !self.raced.swap(true, Ordering::SeqCst) {
                let gate = PassVerifier::new(self.inner.clone());
                let result = gate
                    .verify_at(token, Utc.with_ymd_and_hms(2024, 2, 19, 9, 5, 0).unwrap())
                    .await
                    .unwrap();
                *self.rival.lock().unwrap() = Some(result);
            }
            Ok(found)
        }

        async fn respond_if_pending(
            &self,
            id: &str,
            response: &ResponseRecord,
        ) -> Result<bool, StoreError> {
            self.inner.respond_if_pending(id, response).await
        }

        async fn mark_scanned(&self, id: &str) -> Result<bool, StoreError> {
            self.inner.mark_scanned(id).await
        }
    }

    #[actix_web::test]
    async fn losing_a_concurrent_scan_reports_already_used() {
        let fx = fixture();
        let approved_at = Utc.with_ymd_and_hms(2024, 2, 19, 9, 0, 0).unwrap();
        let token = approved_token(&fx, approved_at).await;

        let racing = Arc::new(RacingStore {
            inner: fx.store.clone(),
            raced: AtomicBool::new(false),
            rival: Mutex::new(None),
        });
        let verifier = PassVerifier::new(racing.clone());

        let result = verifier
            .verify_at(&token, approved_at + Duration::minutes(5))
            .await
            .unwrap();
        let rival = racing.rival.lock().unwrap().take().unwrap();

        // the lookup saw an unscanned pass, but the other gate got there first
        assert!(rival.success);
        assert_eq!(rival.message, VERIFIED);
        assert!(!result.success);
        assert_eq!(result.message, ALREADY_SCANNED);
        assert!(result.request.is_none());

        let record = fx.store.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(record.is_scanned, Some(true));
    }
}
