#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sm_common::store::MemoryStore;
use sm_common::{Candidate, Category, JobPosting, PlacementStatus, PostingStatus};
use tower::ServiceExt;

fn skills(items: &[&str]) -> std::collections::BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn candidates() -> Vec<Candidate> {
    vec![
        Candidate {
            id: 1,
            name: "Asha Verma".into(),
            city: "Jaipur".into(),
            state: "Rajasthan".into(),
            diploma_score: 80.0,
            experience_years: 3,
            category: Category::Obc,
            gender: Some("F".into()),
            skills: skills(&["electrical wiring", "safety"]),
            preferred_salary_min: Some(15_000),
            preferred_salary_max: Some(20_000),
            ..Candidate::default()
        },
        Candidate {
            id: 2,
            name: "Ravi Meena".into(),
            city: "Kota".into(),
            state: "Rajasthan".into(),
            diploma_score: 65.0,
            experience_years: 1,
            category: Category::General,
            gender: Some("M".into()),
            skills: skills(&["electrical wiring"]),
            ..Candidate::default()
        },
        Candidate {
            id: 3,
            name: "Meena Patil".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            diploma_score: 90.0,
            experience_years: 5,
            category: Category::Sc,
            skills: skills(&["electrical wiring", "safety"]),
            placement_status: PlacementStatus::Placed,
            ..Candidate::default()
        },
    ]
}

fn postings() -> Vec<JobPosting> {
    vec![
        JobPosting {
            id: 1,
            employer_id: 10,
            title: "Electrician".into(),
            city: "Jaipur".into(),
            state: "Rajasthan".into(),
            salary_min: Some(15_000),
            salary_max: Some(25_000),
            experience_required: 2,
            minimum_diploma_score: Some(60.0),
            required_skills: skills(&["electrical wiring", "safety"]),
            status: PostingStatus::Active,
            ..JobPosting::default()
        },
        JobPosting {
            id: 2,
            employer_id: 10,
            title: "Broken posting".into(),
            city: "Jaipur".into(),
            state: "Rajasthan".into(),
            salary_min: Some(30_000),
            salary_max: Some(10_000),
            status: PostingStatus::Active,
            ..JobPosting::default()
        },
        JobPosting {
            id: 3,
            employer_id: 11,
            title: "Solar technician".into(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            salary_min: Some(12_000),
            salary_max: Some(18_000),
            status: PostingStatus::Closed,
            ..JobPosting::default()
        },
    ]
}

/// Router over three candidates (one already placed) and three postings:
/// a valid active one, one with inverted salary bounds, and a closed one.
pub fn seeded_app() -> Router {
    let store = MemoryStore::with_data(candidates(), postings());
    sm_api::create_router(sm_api::test_state_with(Arc::new(store)))
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
