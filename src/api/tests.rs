use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web::Data};
use serde_json::{Value, json};

use crate::auth::jwt::generate_access_token;
use crate::config::Config;
use crate::leave::{LeaveLifecycle, PassVerifier};
use crate::model::role::Role;
use crate::routes;
use crate::store::{LeaveStore, MemoryLeaveStore};

macro_rules! request {
    ($builder:expr, $auth:expr $(,)?) => {
        $builder
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .insert_header($auth)
            .to_request()
    };
}

macro_rules! test_app {
    () => {{
        let config = Config::for_tests();
        let store: Arc<dyn LeaveStore> = Arc::new(MemoryLeaveStore::default());
        let lifecycle = Data::new(LeaveLifecycle::new(store.clone(), config.policy.clone()));
        let verifier = Data::new(PassVerifier::new(store));
        let cfg = config.clone();
        test::init_service(
            App::new()
                .app_data(Data::new(config))
                .app_data(lifecycle)
                .app_data(verifier)
                .configure(move |c| routes::configure(c, cfg.clone())),
        )
        .await
    }};
}

fn bearer(user_id: &str, name: &str, role: Role, department: Option<&str>) -> (String, String) {
    let token = generate_access_token(
        user_id,
        name,
        role,
        department,
        &Config::for_tests().jwt_secret,
        900,
    );
    ("Authorization".to_string(), format!("Bearer {}", token))
}

fn student(id: &str) -> (String, String) {
    bearer(id, "John Doe", Role::Student, Some("CSE"))
}

fn faculty() -> (String, String) {
    bearer("fac-1", "Dr. Smith", Role::Faculty, Some("CSE"))
}

fn guard() -> (String, String) {
    bearer("sec-1", "Gate Officer", Role::SecurityGuard, None)
}

fn admin() -> (String, String) {
    bearer("adm-1", "Registrar", Role::Admin, None)
}

fn doctor_visit() -> Value {
    json!({
        "type": "medical",
        "startDate": "2024-02-20",
        "endDate": "2024-02-20",
        "reason": "Doctor appointment"
    })
}

#[actix_web::test]
async fn exit_pass_scenario() {
    let app = test_app!();

    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::post().uri("/api/leave").set_json(doctor_visit()),
            student("stu-123"),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["status"], "pending");
    assert!(created.get("qrCodeToken").is_none());
    let id = created["id"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::put().uri(&format!("/api/leave/{}/approve", id)),
            faculty(),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let approved: Value = test::read_body_json(resp).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["respondedBy"], "Dr. Smith");
    assert_eq!(approved["isScanned"], false);
    let token = approved["qrCodeToken"].as_str().unwrap().to_string();
    assert!(crate::leave::pass_token::is_well_formed(&token));

    let verify = |token: String| {
        request!(
            test::TestRequest::post()
                .uri("/api/pass/verify")
                .set_json(json!({ "token": token })),
            guard(),
        )
    };

    let first: Value = test::read_body_json(test::call_service(&app, verify(token.clone())).await).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["message"], "Verified Successfully");
    assert_eq!(first["request"]["isScanned"], true);

    let second: Value = test::read_body_json(test::call_service(&app, verify(token)).await).await;
    assert_eq!(second["success"], false);
    assert_eq!(second["message"], "QR Code already used/scanned");

    let unknown: Value = test::read_body_json(
        test::call_service(&app, verify("PASS-0000000-1".to_string())).await,
    )
    .await;
    assert_eq!(unknown["message"], "Invalid QR Code");
}

#[actix_web::test]
async fn second_response_conflicts() {
    let app = test_app!();

    let created: Value = test::read_body_json(
        test::call_service(
            &app,
            request!(
                test::TestRequest::post().uri("/api/leave").set_json(doctor_visit()),
                student("stu-123"),
            ),
        )
        .await,
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let reject = test::call_service(
        &app,
        request!(
            test::TestRequest::put()
                .uri(&format!("/api/leave/{}/reject", id))
                .set_json(json!({ "remarks": "Exams that week" })),
            faculty(),
        ),
    )
    .await;
    assert_eq!(reject.status(), StatusCode::OK);
    let rejected: Value = test::read_body_json(reject).await;
    assert_eq!(rejected["remarks"], "Exams that week");

    let again = test::call_service(
        &app,
        request!(
            test::TestRequest::put().uri(&format!("/api/leave/{}/approve", id)),
            admin(),
        ),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let missing = test::call_service(
        &app,
        request!(test::TestRequest::put().uri("/api/leave/nope/approve"), faculty()),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn enforces_roles() {
    let app = test_app!();

    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::post().uri("/api/leave").set_json(doctor_visit()),
            guard(),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::post()
                .uri("/api/pass/verify")
                .set_json(json!({ "token": "PASS-0000000-1" })),
            student("stu-123"),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        request!(test::TestRequest::get().uri("/api/reports/summary"), faculty()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let anonymous = test::TestRequest::get()
        .uri("/api/leave")
        .peer_addr("127.0.0.1:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, anonymous).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn validation_errors_are_bad_requests() {
    let app = test_app!();

    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::post().uri("/api/leave").set_json(json!({
                "type": "medical",
                "startDate": "2024-02-21",
                "endDate": "2024-02-20",
                "reason": "Doctor appointment"
            })),
            student("stu-123"),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "endDate cannot be before startDate");

    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::post()
                .uri("/api/leave")
                .set_json(json!({ "type": "medical", "startDate": "2024-02-20", "endDate": "2024-02-20" })),
            student("stu-123"),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "reason is required");
}

#[actix_web::test]
async fn listings_are_scoped_by_role() {
    let app = test_app!();

    for who in ["stu-1", "stu-2"] {
        let resp = test::call_service(
            &app,
            request!(
                test::TestRequest::post().uri("/api/leave").set_json(doctor_visit()),
                student(who),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::post().uri("/api/leave").set_json(doctor_visit()),
            bearer("stu-3", "Jane Roe", Role::Student, Some("EEE")),
        ),
    )
    .await;
    let other_dept: Value = test::read_body_json(resp).await;

    let list = |auth: (String, String)| request!(test::TestRequest::get().uri("/api/leave"), auth);

    let mine: Value = test::read_body_json(test::call_service(&app, list(student("stu-1"))).await).await;
    assert_eq!(mine["total"], 1);
    assert_eq!(mine["data"][0]["studentId"], "stu-1");

    let dept: Value = test::read_body_json(test::call_service(&app, list(faculty())).await).await;
    assert_eq!(dept["total"], 2);

    let all: Value = test::read_body_json(test::call_service(&app, list(admin())).await).await;
    assert_eq!(all["total"], 3);

    let approved: Value = test::read_body_json(
        test::call_service(
            &app,
            request!(test::TestRequest::get().uri("/api/leave?status=approved"), admin()),
        )
        .await,
    )
    .await;
    assert_eq!(approved["total"], 0);

    // students cannot read each other's requests
    let resp = test::call_service(
        &app,
        request!(
            test::TestRequest::get().uri(&format!("/api/leave/{}", other_dept["id"].as_str().unwrap())),
            student("stu-1"),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_views_report_and_settings() {
    let app = test_app!();

    test::call_service(
        &app,
        request!(
            test::TestRequest::post().uri("/api/leave").set_json(doctor_visit()),
            student("stu-1"),
        ),
    )
    .await;

    let report: Value = test::read_body_json(
        test::call_service(
            &app,
            request!(test::TestRequest::get().uri("/api/reports/summary"), admin()),
        )
        .await,
    )
    .await;
    assert_eq!(report["total"], 1);
    assert_eq!(report["pending"], 1);

    let settings: Value = test::read_body_json(
        test::call_service(&app, request!(test::TestRequest::get().uri("/api/settings"), admin())).await,
    )
    .await;
    assert_eq!(settings["policy"]["casualDays"], 12);
    assert_eq!(settings["policy"]["passTtlHours"], 24);

    let balance: Value = test::read_body_json(
        test::call_service(
            &app,
            request!(test::TestRequest::get().uri("/api/leave/balance"), student("stu-1")),
        )
        .await,
    )
    .await;
    assert_eq!(balance["studentId"], "stu-1");
    assert_eq!(balance["entries"].as_array().unwrap().len(), 4);
}
