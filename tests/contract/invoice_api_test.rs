// Contract tests for /finance/invoices, /finance/payments and /finance/payment endpoints.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{test, App};
use helpers::*;
use serde_json::{json, Value};
use showroom_finance::config::FinancePolicy;

macro_rules! app {
    () => {
        test::init_service(App::new().configure(configure_test_app(lazy_pool(), FinancePolicy::default()))).await
    };
}

#[actix_web::test]
async fn test_payment_amount_must_be_positive() {
    let app = app!();

    for jumlah in ["0", "-10000"] {
        let req = test::TestRequest::post()
            .uri("/finance/invoices/1/pay")
            .set_json(json!({"jumlah": jumlah, "jenis": "cash"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400, "jumlah {}", jumlah);
        let body: Value = test::read_body_json(resp).await;
        assert_error_envelope(&body, 400);
    }
}

#[actix_web::test]
async fn test_payment_amount_must_fit_ledger_column() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/finance/invoices/1/pay")
        .set_json(json!({"jumlah": "100000000000000", "jenis": "transfer"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_error_mentions(&body, "jumlah");
}

#[actix_web::test]
async fn test_payment_type_must_be_known() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/finance/invoices/1/pay")
        .set_json(json!({"jumlah": "1000", "jenis": "giro"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_error_mentions(&body, "jenis");
}

#[actix_web::test]
async fn test_malformed_body_uses_error_envelope() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/finance/invoices/1/pay")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"jumlah\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_error_envelope(&body, 400);
}

#[actix_web::test]
async fn test_manual_invoice_validation() {
    let app = app!();

    let cases = [
        json!({"kd_client": 1, "tanggal": "2024/01/01", "total_amount": "1000"}),
        json!({"kd_client": 1, "tanggal": "2024-01-01", "total_amount": "-1"}),
        json!({"kd_client": 1, "tanggal": "2024-01-01", "total_amount": "1000", "due_days": -1}),
        json!({"kd_client": 1, "tanggal": "2024-01-01", "total_amount": "1000", "due_days": 1_000_000_000i64}),
        json!({"kd_client": 1, "tanggal": "2024-01-01", "total_amount": "100000000000000"}),
    ];

    for payload in cases {
        let req = test::TestRequest::post()
            .uri("/finance/invoices/manual")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", payload);
    }
}

#[actix_web::test]
async fn test_open_invoice_paging_is_validated() {
    let app = app!();

    for uri in ["/finance/invoices?limit=0", "/finance/invoices?offset=-1"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);
    }
}

#[actix_web::test]
async fn test_approval_requires_approver() {
    let app = app!();

    for action in ["approve", "reject"] {
        let req = test::TestRequest::post()
            .uri(&format!("/finance/payment/1/{}", action))
            .set_json(json!({"approved_by": " "}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400, "{}", action);
        let body: Value = test::read_body_json(resp).await;
        assert_error_mentions(&body, "approved_by");
    }
}

#[actix_web::test]
async fn test_approver_name_is_bounded() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/finance/payment/1/approve")
        .set_json(json!({"approved_by": "x".repeat(101)}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_pending_limit_is_bounded() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/finance/payment/pending?limit=0")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_ledger_payment_validation() {
    let app = app!();

    let cases = [
        json!({"jumlah": "0", "jenis": "cash"}),
        json!({"jumlah": "1000", "jenis": "giro"}),
        json!({"jumlah": "1000", "jenis": "cash", "tanggal": "01-06-2024"}),
        json!({"jumlah": "100000000000000", "jenis": "transfer"}),
    ];

    for payload in cases {
        let req = test::TestRequest::post()
            .uri("/finance/payments")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400, "{}", payload);
        let body: Value = test::read_body_json(resp).await;
        assert_error_envelope(&body, 400);
    }
}

#[actix_web::test]
async fn test_payment_ledger_paging_is_validated() {
    let app = app!();

    for uri in ["/finance/payments?limit=0", "/finance/payments?offset=-5"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);
    }
}
