// Integration test for the installment ledger lifecycle:
// 1. Generate a schedule for a plan
// 2. Mark lines paid and annotate them
// 3. Regenerate, replacing the old lines
// 4. Read the overdue, active and per-client reports

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{test, App};
use chrono::NaiveDate;
use helpers::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use showroom_finance::config::FinancePolicy;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[actix_web::test]
#[ignore = "Requires test database configuration"]
async fn test_generate_schedule_defaults_from_plan() {
    let pool = create_test_pool().await;
    let client_id = seed_client(&pool, &TestDataFactory::client_name()).await;
    let tx_id = seed_transaction(&pool, client_id, Some(date(2024, 1, 1)), "cicilan", dec!(120000000)).await;
    let plan_id = seed_plan(&pool, tx_id, dec!(120000000), Some(12)).await;

    let app = test::init_service(App::new().configure(configure_test_app(pool.clone(), FinancePolicy::default()))).await;

    let req = test::TestRequest::post()
        .uri("/finance/cicilan/schedule/generate")
        .set_json(json!({"kd_cicilan": plan_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    let lines = body["schedules"].as_array().unwrap();
    assert_eq!(lines.len(), 12);
    assert_eq!(money(&lines[0]["jumlah"]), dec!(10000000));
    // first due date: sale + 30 (start) + 30
    assert_eq!(lines[0]["tgl_jatuh_tempo"], "2024-03-01");
    assert_eq!(lines[11]["nomor_cicilan"], 12);
    assert!(lines.iter().all(|l| l["status"] == "pending"));
}

#[actix_web::test]
#[ignore = "Requires test database configuration"]
async fn test_mark_paid_note_and_regenerate() {
    let pool = create_test_pool().await;
    let client_id = seed_client(&pool, &TestDataFactory::client_name()).await;
    let tx_id = seed_transaction(&pool, client_id, Some(date(2024, 1, 1)), "cicilan", dec!(60000000)).await;
    let plan_id = seed_plan(&pool, tx_id, dec!(60000000), Some(6)).await;

    let app = test::init_service(App::new().configure(configure_test_app(pool.clone(), FinancePolicy::default()))).await;

    let req = test::TestRequest::post()
        .uri("/finance/cicilan/schedule/generate")
        .set_json(json!({"kd_cicilan": plan_id, "tgl_mulai": "2024-02-01"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let first_line = body["schedules"][0]["kd_schedule"].as_i64().unwrap();
    assert_eq!(body["schedules"][0]["tgl_jatuh_tempo"], "2024-03-02");

    // Pay the first line
    let req = test::TestRequest::post()
        .uri(&format!("/finance/cicilan/schedule/{}/mark-paid", first_line))
        .set_json(json!({"tgl_pembayaran": "2024-03-01"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "paid");
    assert_eq!(body["data"]["tgl_pembayaran"], "2024-03-01");
    assert_eq!(body["data"]["is_overdue"], false);

    // Two notes accumulate
    for note in ["Called client", "Promised transfer"] {
        let req = test::TestRequest::post()
            .uri(&format!("/finance/cicilan/schedule/{}/note", first_line))
            .set_json(json!({"note": note}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }
    let req = test::TestRequest::get()
        .uri(&format!("/finance/cicilan/schedule/{}", plan_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let notes = body["schedules"][0]["catatan"].as_str().unwrap();
    assert_eq!(notes.lines().count(), 2);
    assert!(notes.lines().all(|l| l.starts_with('[')));
    assert!(notes.ends_with("Promised transfer"));

    // Regenerating discards payment state and notes
    let req = test::TestRequest::post()
        .uri("/finance/cicilan/schedule/generate")
        .set_json(json!({"kd_cicilan": plan_id, "tenor": 3}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let lines = body["schedules"].as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l["status"] == "pending" && l["catatan"].is_null()));
    assert_eq!(money(&lines[0]["jumlah"]), dec!(20000000));
}

#[actix_web::test]
#[ignore = "Requires test database configuration"]
async fn test_unknown_plan_and_line() {
    let pool = create_test_pool().await;
    let app = test::init_service(App::new().configure(configure_test_app(pool.clone(), FinancePolicy::default()))).await;

    let req = test::TestRequest::post()
        .uri("/finance/cicilan/schedule/generate")
        .set_json(json!({"kd_cicilan": i64::MAX}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // Unknown plan lists as empty
    let req = test::TestRequest::get()
        .uri(&format!("/finance/cicilan/schedule/{}", i64::MAX))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["schedules"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::post()
        .uri(&format!("/finance/cicilan/schedule/{}/mark-paid", i64::MAX))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
#[ignore = "Requires test database configuration"]
async fn test_overdue_active_and_summary_reports() {
    let pool = create_test_pool().await;
    let client_id = seed_client(&pool, &TestDataFactory::client_name()).await;
    let tx_id = seed_transaction(&pool, client_id, Some(date(2024, 1, 1)), "cicilan", dec!(3000000)).await;
    let plan_id = seed_plan(&pool, tx_id, dec!(3000000), Some(3)).await;

    let app = test::init_service(App::new().configure(configure_test_app(pool.clone(), FinancePolicy::default()))).await;

    let req = test::TestRequest::post()
        .uri("/finance/cicilan/schedule/generate")
        .set_json(json!({"kd_cicilan": plan_id}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let first_line = body["schedules"][0]["kd_schedule"].as_i64().unwrap();

    // All three lines fell due in 2024
    assert!(body["schedules"].as_array().unwrap().iter().all(|l| l["is_overdue"] == true));

    let req = test::TestRequest::post()
        .uri(&format!("/finance/cicilan/schedule/{}/mark-paid", first_line))
        .set_json(json!({"tgl_pembayaran": "2024-03-01"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/finance/cicilan/summary/{}", client_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let summary = &body["data"];
    assert_eq!(summary["kd_client"], client_id);
    assert_eq!(money(&summary["total_outstanding"]), dec!(2000000));
    assert_eq!(summary["total_pending_cicilan"], 2);
    assert_eq!(summary["total_overdue"], 2);
    assert_eq!(summary["total_paid"], 1);

    let req = test::TestRequest::get()
        .uri("/finance/cicilan/overdue?limit=1000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let mine: Vec<&Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["kd_cicilan"] == plan_id)
        .collect();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|l| l["days_overdue"].as_i64().unwrap() > 0));

    let req = test::TestRequest::get()
        .uri("/finance/cicilan/active?limit=1000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let plan = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["kd_cicilan"] == plan_id)
        .cloned()
        .expect("plan with pending lines is active");
    assert_eq!(plan["paid_count"], 1);
    assert_eq!(plan["pending_count"], 2);
    assert_eq!(plan["progress_percentage"], 33);
}

#[actix_web::test]
#[ignore = "Requires test database configuration"]
async fn test_summary_of_unknown_client_is_zero() {
    let pool = create_test_pool().await;
    let app = test::init_service(App::new().configure(configure_test_app(pool.clone(), FinancePolicy::default()))).await;

    let req = test::TestRequest::get()
        .uri(&format!("/finance/cicilan/summary/{}", i64::MAX))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(money(&body["data"]["total_outstanding"]), dec!(0));
    assert_eq!(body["data"]["total_paid"], 0);
}
