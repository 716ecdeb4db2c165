mod common;

use axum::http::StatusCode;
use common::{get, json, seeded_app, send};
use serde_json::json;

#[tokio::test]
async fn lists_postings_by_status() {
    let app = seeded_app();

    let (status, all) = send(&app, get("/api/postings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, closed) = send(&app, get("/api/postings?status=closed")).await;
    let closed = closed.as_array().unwrap();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0]["title"], "Solar technician");
}

#[tokio::test]
async fn creates_a_valid_posting() {
    let app = seeded_app();
    let body = json!({
        "title": "Wireman",
        "city": "Ajmer",
        "state": "Rajasthan",
        "salary_min": 12000,
        "salary_max": 16000,
        "required_skills": ["electrical wiring"]
    });

    let (status, created) = send(&app, json("POST", "/api/postings", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 4);
    assert_eq!(created["status"], "active");

    let (status, fetched) = send(&app, get("/api/postings/4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Wireman");
}

#[tokio::test]
async fn rejects_posting_with_inverted_salary() {
    let app = seeded_app();
    let body = json!({
        "title": "Wireman",
        "city": "Ajmer",
        "state": "Rajasthan",
        "salary_min": 20000,
        "salary_max": 16000
    });

    let (status, error) = send(&app, json("POST", "/api/postings", body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "invalid_posting");
}

#[tokio::test]
async fn status_changes_follow_allowed_transitions() {
    let app = seeded_app();

    let (status, updated) = send(
        &app,
        json("PATCH", "/api/postings/1/status", json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "inactive");

    let (status, _) = send(
        &app,
        json("PATCH", "/api/postings/3/status", json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn candidate_listing_filters_and_paginates() {
    let app = seeded_app();

    let (status, page) = send(&app, get("/api/candidates?state=RJ&limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["id"], 1);

    let (_, by_name) = send(&app, get("/api/candidates?search=patil")).await;
    assert_eq!(by_name["total"], 1);
    assert_eq!(by_name["items"][0]["city"], "Pune");
}

#[tokio::test]
async fn lists_postings_by_employer() {
    let app = seeded_app();

    let (status, own) = send(&app, get("/api/postings?employer_id=10")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = own
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let (_, active_other) = send(&app, get("/api/postings?employer_id=11&status=active")).await;
    assert!(active_other.as_array().unwrap().is_empty());
}

fn edited_electrician(employer_id: i64) -> serde_json::Value {
    json!({
        "employer_id": employer_id,
        "title": "Senior Electrician",
        "city": "Jaipur",
        "state": "Rajasthan",
        "salary_min": 20000,
        "salary_max": 30000,
        "experience_required": 3,
        "required_skills": ["electrical wiring", "safety"]
    })
}

#[tokio::test]
async fn owning_employer_edits_posting() {
    let app = seeded_app();

    let (status, updated) = send(&app, json("PUT", "/api/postings/1", edited_electrician(10))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Senior Electrician");
    assert_eq!(updated["salary_min"], 20000);
    assert_eq!(updated["status"], "active");

    let (_, fetched) = send(&app, get("/api/postings/1")).await;
    assert_eq!(fetched["experience_required"], 3);
}

#[tokio::test]
async fn other_employers_cannot_edit_posting() {
    let app = seeded_app();

    let (status, error) = send(&app, json("PUT", "/api/postings/1", edited_electrician(11))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["code"], "forbidden");

    let (_, fetched) = send(&app, get("/api/postings/1")).await;
    assert_eq!(fetched["title"], "Electrician");
}

#[tokio::test]
async fn edits_are_validated_and_closed_postings_are_frozen() {
    let app = seeded_app();

    let mut inverted = edited_electrician(10);
    inverted["salary_min"] = json!(40000);
    let (status, error) = send(&app, json("PUT", "/api/postings/1", inverted)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "invalid_posting");

    let (status, _) = send(&app, json("PUT", "/api/postings/3", edited_electrician(11))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, json("PUT", "/api/postings/99", edited_electrician(10))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
