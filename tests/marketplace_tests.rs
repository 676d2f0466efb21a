//! Tool calls against a mocked marketplace API.
//!
//! Every test mounts its mocks under its own path prefix so tests can share the
//! mock server while running in parallel.

mod common;

use common::{Harness, UNREACHABLE_API};
use mockito::{mock, Matcher};
use serde_json::json;

fn api_base(prefix: &str) -> String {
    format!("{}/{}/api/v1", mockito::server_url(), prefix)
}

#[tokio::test]
async fn search_humans_forwards_only_present_filters_in_order() {
    let body = json!([{"id": "h-1", "name": "Ada", "rate": 18}]);
    let m = mock("GET", "/search/api/v1/humans/search")
        .match_query(Matcher::Exact("skill=writing&maxRate=20".into()))
        .match_header("x-api-key", "k-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create();

    let h = Harness::new(&api_base("search"), Some("k-1"));
    let (text, is_error) = h
        .call("search_humans", json!({"skill": "writing", "maxRate": 20}))
        .await;

    m.assert();
    assert!(!is_error);
    assert_eq!(text, serde_json::to_string_pretty(&body).unwrap());
}

#[tokio::test]
async fn search_humans_drops_falsy_filters() {
    let m = mock("GET", "/search-falsy/api/v1/humans/search")
        .match_query(Matcher::Exact("skill=writing".into()))
        .with_status(200)
        .with_body("[]")
        .create();

    let h = Harness::new(&api_base("search-falsy"), Some("k"));
    let (_, is_error) = h
        .call("search_humans", json!({"skill": "writing", "maxRate": 0, "location": ""}))
        .await;
    m.assert();
    assert!(!is_error);
}

#[tokio::test]
async fn register_saves_credentials_and_provisions_a_wallet() {
    let m = mock("POST", "/register/api/v1/register")
        .match_body(Matcher::Json(json!({"email": "bot@example.com", "name": "Bot"})))
        .with_status(201)
        .with_body(json!({"api_key": "mm_live_1", "ai_id": "ai-42"}).to_string())
        .create();

    let h = Harness::new(&api_base("register"), None);
    let (body, is_error) = h
        .call_json("register", json!({"email": "bot@example.com", "name": "Bot"}))
        .await;

    m.assert();
    assert!(!is_error);
    assert_eq!(body["api_key"], json!("mm_live_1"));
    let wallet = body["wallet_address"].as_str().unwrap();
    assert!(wallet.starts_with("0x"));

    let doc = h.state_file();
    assert_eq!(doc["api_key"], json!("mm_live_1"));
    assert_eq!(doc["ai_id"], json!("ai-42"));
    assert_eq!(doc["wallet_address"], json!(wallet));

    let session = h.state.session.lock().await;
    assert_eq!(session.api_key(), Some("mm_live_1"));
    assert_eq!(session.agent_id(), Some("ai-42"));
}

#[tokio::test]
async fn failed_registration_leaves_state_untouched() {
    let _m = mock("POST", "/register-fail/api/v1/register")
        .with_status(409)
        .with_body(json!({"error": "email already registered"}).to_string())
        .create();

    let h = Harness::new(&api_base("register-fail"), None);
    let (body, is_error) = h
        .call_json("register", json!({"email": "bot@example.com", "name": "Bot"}))
        .await;

    assert!(is_error);
    assert_eq!(body["error"], json!("email already registered"));
    assert!(!h.state.session.lock().await.has_credentials());
    assert!(!h.state.config.state_path().exists());
}

#[tokio::test]
async fn remote_errors_are_tool_errors_not_protocol_errors() {
    let _m = mock("GET", "/missing/api/v1/humans/nobody")
        .with_status(404)
        .with_body("no such human")
        .create();

    let h = Harness::new(&api_base("missing"), Some("k"));
    let (text, is_error) = h.call("get_human_profile", json!({"human_id": "nobody"})).await;
    assert!(is_error);
    assert_eq!(text, "no such human");
}

#[tokio::test]
async fn network_failure_is_a_protocol_error() {
    let h = Harness::new(UNREACHABLE_API, Some("k"));
    let resp = h
        .rpc(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "get_messages", "arguments": {}}
        }))
        .await
        .unwrap();
    assert_eq!(resp["id"], json!(5));
    assert_eq!(resp["error"]["code"], json!(-32000));
    assert!(resp.get("result").is_none());
}

#[tokio::test]
async fn path_ids_are_escaped() {
    let m = mock("DELETE", "/escape/api/v1/jobs/a%2Fb")
        .with_status(200)
        .with_body("{}")
        .create();

    let h = Harness::new(&api_base("escape"), Some("k"));
    let (_, is_error) = h.call("delete_job", json!({"job_id": "a/b"})).await;
    m.assert();
    assert!(!is_error);
}

#[tokio::test]
async fn accept_applicant_activates_the_job() {
    let m = mock("PATCH", "/accept/api/v1/jobs/j-1")
        .match_body(Matcher::Json(json!({"status": "active", "human_id": "h-7"})))
        .with_status(200)
        .with_body(json!({"ok": true}).to_string())
        .create();

    let h = Harness::new(&api_base("accept"), Some("k"));
    let (_, is_error) = h
        .call("accept_applicant", json!({"job_id": "j-1", "human_id": "h-7"}))
        .await;
    m.assert();
    assert!(!is_error);
}

#[tokio::test]
async fn accept_applicant_without_human_sends_no_null() {
    let m = mock("PATCH", "/accept-bare/api/v1/jobs/j-1")
        .match_body(Matcher::Json(json!({"status": "active"})))
        .with_status(200)
        .with_body("{}")
        .create();

    let h = Harness::new(&api_base("accept-bare"), Some("k"));
    let (_, is_error) = h.call("accept_applicant", json!({"job_id": "j-1"})).await;
    m.assert();
    assert!(!is_error);
}

#[tokio::test]
async fn mark_payment_sent_omits_a_missing_link() {
    let m = mock("PATCH", "/paid-bare/api/v1/jobs/j-1")
        .match_body(Matcher::Json(json!({"status": "payment_sent"})))
        .with_status(200)
        .with_body("{}")
        .create();

    let h = Harness::new(&api_base("paid-bare"), Some("k"));
    let (_, is_error) = h.call("mark_payment_sent", json!({"job_id": "j-1"})).await;
    m.assert();
    assert!(!is_error);
}

#[tokio::test]
async fn submit_review_omits_missing_rating_and_reviewee() {
    let m = mock("POST", "/review-bare/api/v1/reviews")
        .match_body(Matcher::Json(json!({
            "job_id": "j-1",
            "reviewer_id": "agent-1",
            "comment": "late"
        })))
        .with_status(201)
        .with_body("{}")
        .create();

    let h = Harness::new(&api_base("review-bare"), Some("k"));
    let (_, is_error) = h
        .call("submit_review", json!({"job_id": "j-1", "comment": "late"}))
        .await;
    m.assert();
    assert!(!is_error);
}

#[tokio::test]
async fn submit_review_names_the_agent_as_reviewer() {
    let m = mock("POST", "/review/api/v1/reviews")
        .match_body(Matcher::Json(json!({
            "job_id": "j-1",
            "reviewer_id": "agent-1",
            "reviewee_id": "h-7",
            "rating": 5,
            "comment": ""
        })))
        .with_status(201)
        .with_body("{}")
        .create();

    let h = Harness::new(&api_base("review"), Some("k"));
    let (_, is_error) = h
        .call("submit_review", json!({"job_id": "j-1", "human_id": "h-7", "rating": 5}))
        .await;
    m.assert();
    assert!(!is_error);
}

#[tokio::test]
async fn post_job_sends_arguments_verbatim() {
    let job = json!({
        "title": "Photograph a storefront",
        "description": "Two photos of the front door",
        "skills": ["photography"],
        "pay_amount": 15,
        "blockchain": "base",
        "time_limit_hours": 24
    });
    let m = mock("POST", "/post-job/api/v1/jobs")
        .match_body(Matcher::Json(job.clone()))
        .with_status(201)
        .with_body(json!({"id": "j-9"}).to_string())
        .create();

    let h = Harness::new(&api_base("post-job"), Some("k"));
    let (body, is_error) = h.call_json("post_job", job).await;
    m.assert();
    assert!(!is_error);
    assert_eq!(body["id"], json!("j-9"));
}

#[tokio::test]
async fn my_jobs_reads_inspect_state() {
    let m = mock("GET", "/inspect/api/v1/inspect")
        .with_status(200)
        .with_body(json!({"jobs": []}).to_string())
        .expect(2)
        .create();

    let h = Harness::new(&api_base("inspect"), Some("k"));
    let (a, _) = h.call("inspect_state", json!({})).await;
    let (b, _) = h.call("my_jobs", json!({})).await;
    m.assert();
    assert_eq!(a, b);
}

#[tokio::test]
async fn cancel_offer_patches_status() {
    let m = mock("PATCH", "/cancel/api/v1/offers/o-3")
        .match_body(Matcher::Json(json!({"status": "canceled"})))
        .with_status(200)
        .with_body("{}")
        .create();

    let h = Harness::new(&api_base("cancel"), Some("k"));
    h.call("cancel_offer", json!({"offer_id": "o-3"})).await;
    m.assert();
}
