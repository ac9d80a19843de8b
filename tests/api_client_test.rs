//! Tests for the HTTP client tooling: seeding, the load-test scenario and stats.
//!
//! Failure paths use a mock server; the happy paths run against a real
//! in-memory server.

mod common;

use common::TestServer;
use mockito::{Matcher, Server};
use reqwest::StatusCode;
use reviewer_assign::cli::client::{ApiClient, ApiResponse};
use reviewer_assign::cli::commands::loadtest::{create_and_merge, run, LoadtestArgs};
use reviewer_assign::cli::commands::seed::{build_teams, seed};
use reviewer_assign::{AssignmentConfig, ServiceContext};
use serde_json::json;

fn error_body(code: &str, message: &str) -> String {
    json!({ "error": { "code": code, "message": message } }).to_string()
}

#[tokio::test]
async fn test_seed_skips_existing_team() {
    let mut server = Server::new_async().await;
    let created = server
        .mock("POST", "/team/add")
        .match_body(Matcher::PartialJson(json!({ "team_name": "team-01" })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "team": {
                    "team_name": "team-01",
                    "members": [
                        { "user_id": "u1", "username": "User1", "is_active": true },
                        { "user_id": "u2", "username": "User2", "is_active": true }
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let existing = server
        .mock("POST", "/team/add")
        .match_body(Matcher::PartialJson(json!({ "team_name": "team-02" })))
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(error_body("TEAM_EXISTS", "team team-02 already exists"))
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    let summary = seed(&client, &build_teams(2)).await.unwrap();

    assert_eq!(summary.teams_created, 1);
    assert_eq!(summary.teams_skipped, 1);
    assert_eq!(summary.users, 2);
    created.assert_async().await;
    existing.assert_async().await;
}

#[tokio::test]
async fn test_seed_aborts_on_server_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/team/add")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(error_body("INTERNAL", "internal error"))
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    let err = seed(&client, &build_teams(3)).await.unwrap_err();
    assert!(err.to_string().contains("team-01"), "{err}");
}

#[tokio::test]
async fn test_create_conflict_skips_merge() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/pullRequest/create")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(error_body("NO_CANDIDATE", "author u7 is inactive"))
        .create_async()
        .await;
    let merge = server
        .mock("POST", "/pullRequest/merge")
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    create_and_merge(&client, "lt-pr-1", "u7").await.unwrap();
    merge.assert_async().await;
}

#[tokio::test]
async fn test_create_not_found_fails_scenario() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/pullRequest/create")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(error_body("NOT_FOUND", "user u999 not found"))
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    let err = create_and_merge(&client, "lt-pr-1", "u999").await.unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
}

#[tokio::test]
async fn test_non_json_error_body_is_reported() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/stats/assignments")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let client = ApiClient::new(server.url()).unwrap();
    let response = client.assignment_stats().await.unwrap();
    assert_eq!(response.failure_status(), Some(StatusCode::BAD_GATEWAY));
    match response {
        ApiResponse::Failure { error, .. } => assert_eq!(error.code, "UNKNOWN"),
        ApiResponse::Success(_) => panic!("expected failure"),
    }
}

#[tokio::test]
async fn test_seed_then_loadtest_against_server() {
    let server = TestServer::start(ServiceContext::in_memory(&AssignmentConfig {
        seed: Some(7),
        ..AssignmentConfig::default()
    }))
    .await;
    let client = ApiClient::new(&server.base_url).unwrap();

    let summary = seed(&client, &build_teams(2)).await.unwrap();
    assert_eq!(summary.teams_created, 2);
    assert_eq!(summary.users, 11);

    // Second run finds both teams.
    let again = seed(&client, &build_teams(2)).await.unwrap();
    assert_eq!(again.teams_skipped, 2);

    let args = LoadtestArgs {
        base_url: server.base_url.clone(),
        duration_secs: 1,
        rps: 10,
        authors: 11,
    };
    let outcome = run(&client, &args).await.unwrap();
    assert!(outcome.launched > 0);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.succeeded, outcome.launched);

    let stats = client.assignment_stats().await.unwrap().into_result().unwrap();
    assert!(!stats.stats.is_empty());
    assert!(stats.stats.iter().all(|s| s.assigned_count > 0));

    server.stop().await;
}
