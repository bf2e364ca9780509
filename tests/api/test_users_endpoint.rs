// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/v1/users end-to-end tests
//!
//! The router runs against a local stub directory and avatar host, with the
//! real reqwest clients and a deterministic detector.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use crate::common::{build_app, person_and_cat, StubDetector, StubServer};

async fn post_users(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/users")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

fn assert_detection_invariant(results: &Value) {
    for entry in results.as_array().unwrap() {
        let boxes = entry["bounding_boxes"].as_array().unwrap();
        assert_eq!(
            entry["object_detected"].as_bool().unwrap(),
            !boxes.is_empty(),
            "object_detected must mirror bounding_boxes for {}",
            entry
        );
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    async fn assert_rejected(body: &str, message: &str) {
        let server = StubServer::start().await;
        let detector = Arc::new(StubDetector::new(person_and_cat()));
        let app = build_app(&server, detector.clone());

        let (status, json) = post_users(app, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json, json!({ "error": message }), "body: {}", body);
        assert!(server.users_requests().is_empty(), "directory must not be called");
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_query_rejected() {
        assert_rejected("{}", "Query parameter 'query' is required").await;
        assert_rejected(r#"{"other": 1}"#, "Query parameter 'query' is required").await;
    }

    #[tokio::test]
    async fn test_missing_object_rejected() {
        assert_rejected(r#"{"query": {}}"#, "Field 'object' not found in the query").await;
        assert_rejected(r#"{"query": null}"#, "Field 'object' not found in the query").await;
        assert_rejected(
            r#"{"query": {"object": null}}"#,
            "Field 'object' not found in the query",
        )
        .await;
        assert_rejected(
            r#"{"query": {"object": ""}}"#,
            "Field 'object' not found in the query",
        )
        .await;
    }

    #[tokio::test]
    async fn test_non_string_object_rejected() {
        assert_rejected(r#"{"query": {"object": 42}}"#, "Field 'object' is not a string").await;
        assert_rejected(
            r#"{"query": {"object": ["person"]}}"#,
            "Field 'object' is not a string",
        )
        .await;
    }

    #[tokio::test]
    async fn test_whitespace_object_rejected() {
        assert_rejected(
            r#"{"query": {"object": "   "}}"#,
            "Field 'object' is white space",
        )
        .await;
        assert_rejected(
            r#"{"query": {"object": "\t\n"}}"#,
            "Field 'object' is white space",
        )
        .await;
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        assert_rejected("{not json", "Request body must be valid JSON").await;
    }
}

#[cfg(test)]
mod directory_failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_error_status_surfaces_as_500() {
        for upstream in [
            StatusCode::BAD_REQUEST,
            StatusCode::NOT_FOUND,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let server = StubServer::start().await;
            server.fail_users(upstream);
            let app = build_app(&server, Arc::new(StubDetector::new(person_and_cat())));

            let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            let message = json["error"].as_str().unwrap();
            assert!(
                message.contains(&upstream.as_u16().to_string()),
                "message '{}' should mention {}",
                message,
                upstream
            );
        }
    }

    #[tokio::test]
    async fn test_directory_garbage_body_is_generic_500() {
        let server = StubServer::start().await;
        server.set_users_body(json!("not an envelope"));
        let app = build_app(&server, Arc::new(StubDetector::new(Vec::new())));

        let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": "Internal server error" }));
    }
}

#[cfg(test)]
mod detection_tests {
    use super::*;

    #[tokio::test]
    async fn test_user_without_profile_image_skips_fetch() {
        let server = StubServer::start().await;
        server.set_users(json!([
            { "user_id": 7, "display_name": "No Avatar", "reputation": 1000 }
        ]));
        let detector = Arc::new(StubDetector::new(person_and_cat()));
        let app = build_app(&server, detector.clone());

        let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json.as_array().unwrap().len(), 1);
        let entry = &json[0];
        assert_eq!(entry["user_id"], 7);
        assert_eq!(entry["object_detected"], false);
        assert_eq!(entry["bounding_boxes"], json!([]));
        assert_eq!(entry["detection_time_ms"], 0.0);
        assert_eq!(server.avatar_requests(), 0);
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test]
    async fn test_matching_label_is_detected() {
        let server = StubServer::start().await;
        server.set_users(json!([{
            "user_id": 22656,
            "display_name": "Jon Skeet",
            "profile_image": server.avatar_url("avatar.png")
        }]));
        let detector = Arc::new(StubDetector::new(vec![crate::common::detection(
            "person",
            0.97,
            [1, 2, 30, 40],
        )]));
        let app = build_app(&server, detector.clone());

        let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

        assert_eq!(status, StatusCode::CREATED);
        let entry = &json[0];
        assert_eq!(entry["display_name"], "Jon Skeet");
        assert_eq!(entry["object_detected"], true);
        let boxes = entry["bounding_boxes"].as_array().unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0]["label"], "person");
        assert_eq!(
            boxes[0]["box"],
            json!({ "xmin": 1, "ymin": 2, "xmax": 30, "ymax": 40 })
        );
        assert!(entry["detection_time_ms"].as_f64().unwrap() >= 0.0);
        assert_eq!(server.avatar_requests(), 1);
        assert_eq!(detector.calls(), 1);
    }

    #[tokio::test]
    async fn test_label_filter_is_exact() {
        let server = StubServer::start().await;
        server.set_users(json!([{
            "user_id": 1,
            "display_name": "A",
            "profile_image": server.avatar_url("avatar.png")
        }]));
        let app = build_app(&server, Arc::new(StubDetector::new(person_and_cat())));

        let (_, persons) = post_users(app.clone(), r#"{"query": {"object": "person"}}"#).await;
        assert_eq!(persons[0]["bounding_boxes"].as_array().unwrap().len(), 2);

        let (_, cats) = post_users(app.clone(), r#"{"query": {"object": "cat"}}"#).await;
        assert_eq!(cats[0]["bounding_boxes"].as_array().unwrap().len(), 1);

        let (_, upper) = post_users(app, r#"{"query": {"object": "Person"}}"#).await;
        assert_eq!(upper[0]["object_detected"], false);
    }

    #[tokio::test]
    async fn test_missing_avatar_reports_empty_result_with_timing() {
        let server = StubServer::start().await;
        server.set_users(json!([{
            "user_id": 3,
            "display_name": "Gone",
            "profile_image": server.avatar_url("missing.png")
        }]));
        let detector = Arc::new(StubDetector::new(person_and_cat()));
        let app = build_app(&server, detector.clone());

        let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

        assert_eq!(status, StatusCode::CREATED);
        let entry = &json[0];
        assert_eq!(entry["object_detected"], false);
        assert_eq!(entry["bounding_boxes"], json!([]));
        assert!(entry["detection_time_ms"].as_f64().unwrap() > 0.0);
        assert_eq!(server.avatar_requests(), 1);
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_avatar_is_generic_500() {
        let server = StubServer::start().await;
        server.set_users(json!([{
            "user_id": 4,
            "display_name": "Broken",
            "profile_image": server.avatar_url("corrupt.png")
        }]));
        let app = build_app(&server, Arc::new(StubDetector::new(person_and_cat())));

        let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_results_follow_directory_order() {
        let server = StubServer::start().await;
        server.set_users(json!([
            { "user_id": 10, "display_name": "First", "profile_image": server.avatar_url("avatar.png") },
            { "user_id": 20, "display_name": "Second" },
            { "user_id": 30, "display_name": "Third", "profile_image": server.avatar_url("unavailable.png") },
            { "user_id": 40, "display_name": "Fourth", "profile_image": "   " }
        ]));
        let app = build_app(&server, Arc::new(StubDetector::new(person_and_cat())));

        let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

        assert_eq!(status, StatusCode::CREATED);
        let ids: Vec<i64> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["user_id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![10, 20, 30, 40]);

        let detected: Vec<bool> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["object_detected"].as_bool().unwrap())
            .collect();
        assert_eq!(detected, vec![true, false, false, false]);
        assert_detection_invariant(&json);
        // Second and Fourth never hit the avatar host
        assert_eq!(server.avatar_requests(), 2);
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let server = StubServer::start().await;
        server.set_users(json!([
            { "user_id": 1, "display_name": "A", "profile_image": server.avatar_url("avatar.png") },
            { "user_id": 2, "display_name": "B", "profile_image": server.avatar_url("missing.png") },
            { "user_id": 3, "display_name": "C" }
        ]));
        let app = build_app(&server, Arc::new(StubDetector::new(person_and_cat())));
        let body = r#"{"query": {"object": "person"}}"#;

        let (_, first) = post_users(app.clone(), body).await;
        let (_, second) = post_users(app, body).await;

        let strip = |results: &Value| -> Vec<(Value, Value)> {
            results
                .as_array()
                .unwrap()
                .iter()
                .map(|entry| {
                    (
                        entry["object_detected"].clone(),
                        entry["bounding_boxes"].clone(),
                    )
                })
                .collect()
        };
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(
            serde_json::to_vec(&strip(&first)).unwrap(),
            serde_json::to_vec(&strip(&second)).unwrap()
        );
    }

    #[tokio::test]
    async fn test_directory_receives_default_query() {
        let server = StubServer::start().await;
        let app = build_app(&server, Arc::new(StubDetector::new(Vec::new())));

        let (status, json) = post_users(app, r#"{"query": {"object": "person"}}"#).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json, json!([]));

        let requests = server.users_requests();
        assert_eq!(requests.len(), 1);
        let params = &requests[0];
        assert_eq!(params.get("site").map(String::as_str), Some("stackoverflow"));
        assert_eq!(params.get("page").map(String::as_str), Some("1"));
        assert_eq!(params.get("pagesize").map(String::as_str), Some("10"));
        assert_eq!(params.get("order").map(String::as_str), Some("desc"));
        assert_eq!(params.get("sort").map(String::as_str), Some("reputation"));
    }
}
