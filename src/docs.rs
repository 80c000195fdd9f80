use crate::api::leave_request::{LeaveListResponse, RespondLeave};
use crate::api::pass::VerifyPass;
use crate::api::report::SettingsResponse;
use crate::config::LeavePolicy;
use crate::leave::VerificationResult;
use crate::leave::balance::{BalanceEntry, LeaveBalance};
use crate::leave::report::{LeaveReport, MonthlyReport};
use crate::leave::validation::LeaveApplication;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "College Leave & Exit Pass API",
        version = "1.0.0",
        description = r#"
## College Leave Management

Students apply for leave, faculty approve or reject, and security staff verify
single-use QR exit passes at the gate.

### Lifecycle
- A request starts **pending** and moves exactly once to **approved** or **rejected**
- Approval issues an exit pass `PASS-XXXXXXX-<millis>` valid for 24 hours
- A pass verifies successfully exactly once

### Security
All endpoints require a JWT bearer token from the identity provider.
Roles: `student`, `faculty`, `admin`, `security_guard`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::leave_balance,

        crate::api::pass::verify_pass,

        crate::api::report::report_summary,
        crate::api::report::settings
    ),
    components(
        schemas(
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            LeaveApplication,
            LeaveListResponse,
            RespondLeave,
            LeaveBalance,
            BalanceEntry,
            VerifyPass,
            VerificationResult,
            LeaveReport,
            MonthlyReport,
            LeavePolicy,
            SettingsResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave request lifecycle APIs"),
        (name = "Pass", description = "Exit pass verification APIs"),
        (name = "Admin", description = "Reports and settings APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
