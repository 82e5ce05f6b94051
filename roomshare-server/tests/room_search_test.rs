//! Tests for GET /api/rooms

mod common;

use common::{create_room, create_test_app, room_body, seed_user, send_request, session_cookie};
use roomshare_core::Role;
use serde_json::Value;

fn titles(body: &Value) -> Vec<String> {
    body["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

/// Test: 13 matching rooms paged six at a time
#[tokio::test]
async fn test_pagination_over_thirteen_rooms() {
    let app = create_test_app();
    let (_owner, token) = seed_user(&app, "Owner", Role::Owner);
    for i in 0..13 {
        create_room(&app, &token, room_body(&format!("Room {}", i), "Pune", 9000 + i, 1)).await;
    }

    let response = app.server.get("/api/rooms?limit=6&page=1").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["rooms"].as_array().unwrap().len(), 6);
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["totalItems"], 13);
    assert_eq!(body["pagination"]["hasNext"], true);
    assert_eq!(body["pagination"]["hasPrev"], false);

    let response = app.server.get("/api/rooms?limit=6&page=3").await;
    let body: Value = response.json();
    assert_eq!(body["rooms"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["hasNext"], false);
    assert_eq!(body["pagination"]["hasPrev"], true);

    // Newest first by default, so the last page holds the first room listed
    assert_eq!(titles(&body), vec!["Room 0"]);
}

/// Test: price bounds select exactly the room inside the range
#[tokio::test]
async fn test_price_range() {
    let app = create_test_app();
    let (_owner, token) = seed_user(&app, "Owner", Role::Owner);
    for price in [5000, 15000, 25000] {
        create_room(&app, &token, room_body(&format!("Rs {}", price), "Pune", price, 1)).await;
    }

    let response = app
        .server
        .get("/api/rooms?minPrice=10000&maxPrice=20000")
        .await;
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Rs 15000"]);
}

/// Test: every requested amenity must be present
#[tokio::test]
async fn test_amenities_are_conjunctive() {
    let app = create_test_app();
    let (_owner, token) = seed_user(&app, "Owner", Role::Owner);

    let mut wifi_only = room_body("Wifi only", "Pune", 10000, 1);
    wifi_only["amenities"] = serde_json::json!(["wifi"]);
    create_room(&app, &token, wifi_only).await;

    let mut everything = room_body("Everything", "Pune", 10000, 1);
    everything["amenities"] = serde_json::json!(["wifi", "parking", "ac"]);
    create_room(&app, &token, everything).await;

    let response = app.server.get("/api/rooms?amenities=wifi,parking").await;
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Everything"]);
}

/// Test: free-text search, city filter and the city suggestion list
#[tokio::test]
async fn test_search_and_cities() {
    let app = create_test_app();
    let (_owner, token) = seed_user(&app, "Owner", Role::Owner);
    create_room(&app, &token, room_body("Sea view", "Mumbai", 20000, 1)).await;
    create_room(&app, &token, room_body("Garden flat", "Pune", 12000, 1)).await;
    create_room(&app, &token, room_body("Hill top", "Navi Mumbai", 14000, 1)).await;

    let response = app.server.get("/api/rooms?city=mumbai&sortBy=price-low").await;
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Hill top", "Sea view"]);
    assert_eq!(
        body["filters"]["cities"],
        serde_json::json!(["Mumbai", "Navi Mumbai", "Pune"])
    );

    let response = app.server.get("/api/rooms?search=GARDEN").await;
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Garden flat"]);

    // Regex metacharacters are matched literally
    let response = app.server.get("/api/rooms?search=.*").await;
    let body: Value = response.json();
    assert!(titles(&body).is_empty());
}

/// Test: shared rooms need at least two beds
#[tokio::test]
async fn test_room_type() {
    let app = create_test_app();
    let (_owner, token) = seed_user(&app, "Owner", Role::Owner);
    create_room(&app, &token, room_body("Single", "Pune", 10000, 1)).await;
    create_room(&app, &token, room_body("Shared", "Pune", 10000, 3)).await;

    let response = app.server.get("/api/rooms?roomType=Shared%20Room").await;
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Shared"]);

    let response = app.server.get("/api/rooms?roomType=1%20BHK").await;
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Single"]);
}

/// Test: occupied rooms drop out of search
#[tokio::test]
async fn test_occupied_rooms_hidden() {
    let app = create_test_app();
    let (_owner, token) = seed_user(&app, "Owner", Role::Owner);
    let (_tenant, tenant_token) = seed_user(&app, "Tenant", Role::Tenant);

    let taken = create_room(&app, &token, room_body("Taken", "Pune", 10000, 1)).await;
    create_room(&app, &token, room_body("Free", "Delhi", 10000, 1)).await;

    let body: Value = send_request(&app, &tenant_token, &taken, "Hi").await.json();
    let response = app
        .server
        .post(&format!(
            "/api/rooms/requests/{}/accept",
            body["data"]["id"].as_str().unwrap()
        ))
        .add_cookie(session_cookie(&token))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = app.server.get("/api/rooms").await;
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Free"]);
    assert_eq!(body["pagination"]["totalItems"], 1);
    assert_eq!(body["filters"]["cities"], serde_json::json!(["Delhi"]));
}

/// Test: malformed parameters are validation errors
#[tokio::test]
async fn test_invalid_parameters() {
    let app = create_test_app();

    for query in [
        "minPrice=cheap",
        "roomType=Penthouse",
        "sortBy=popularity",
        "page=two",
    ] {
        let response = app.server.get(&format!("/api/rooms?{}", query)).await;
        assert_eq!(response.status_code(), 400, "query {}", query);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }
}

/// Test: a page far past the end is an empty page, not a crash
#[tokio::test]
async fn test_huge_page_number() {
    let app = create_test_app();
    let (_owner, token) = seed_user(&app, "Owner", Role::Owner);
    create_room(&app, &token, room_body("Only", "Pune", 10000, 1)).await;

    let response = app
        .server
        .get("/api/rooms?page=9223372036854775807&limit=50")
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(titles(&body).is_empty());
    assert_eq!(body["pagination"]["totalItems"], 1);
    assert_eq!(body["pagination"]["hasNext"], false);
}
