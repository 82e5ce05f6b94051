//! Tests for the rental request state machine over HTTP

mod common;

use common::{create_room, create_test_app, room_body, seed_user, send_request, session_cookie};
use roomshare_core::{RequestStatus, Role, RoomId, RoomRequest};
use roomshare_server::store::{RequestStore, RoomStore, UserStore};
use serde_json::Value;

// =============================================================================
// Full scenario
// =============================================================================

/// Test: owner lists, tenant requests, owner accepts, later requests are refused
#[tokio::test]
async fn test_request_accept_scenario() {
    let app = create_test_app();
    let (alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);
    let (_carol, carol_token) = seed_user(&app, "Carol", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;

    let response = send_request(&app, &bob_token, &room_id, "Hi").await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["message"], "Hi");
    assert_eq!(body["data"]["owner"], alice.to_string());
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    // Alice sees exactly one pending request for R from B
    let response = app
        .server
        .get("/api/rooms/requests/received")
        .add_cookie(session_cookie(&alice_token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let received = body["data"].as_array().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["room"], room_id);
    assert_eq!(received[0]["requester"], bob.to_string());
    assert_eq!(received[0]["roomDetails"]["title"], "Loft");
    assert_eq!(received[0]["requesterDetails"]["name"], "Bob");

    let response = app
        .server
        .post(&format!("/api/rooms/requests/{}/accept", request_id))
        .add_cookie(session_cookie(&alice_token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "accepted");

    // The room is gone from the market
    let response = app.server.get(&format!("/api/rooms/{}", room_id)).await;
    let body: Value = response.json();
    assert_eq!(body["data"]["isVacant"], false);

    let response = send_request(&app, &carol_token, &room_id, "Me too").await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Room is not available");
}

/// Test: after acceptance the room, requester and request all agree
#[tokio::test]
async fn test_accept_side_effects() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;
    let response = send_request(&app, &bob_token, &room_id, "").await;
    let body: Value = response.json();
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .post(&format!("/api/rooms/requests/{}/accept", request_id))
        .add_cookie(session_cookie(&alice_token))
        .await;
    assert_eq!(response.status_code(), 200);

    let room_id: RoomId = room_id.parse().unwrap();
    let room = app.store.get_room(room_id).unwrap().unwrap();
    assert!(!room.is_vacant);
    assert!(room.current_roommates.contains(&bob));

    let user = app.store.get_user(bob).unwrap().unwrap();
    assert!(user.rented_rooms.contains(&room_id));

    let request = app
        .store
        .get_request(request_id.parse().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(request.status, RequestStatus::Accepted);

    // The accepted request no longer shows as received
    let response = app
        .server
        .get("/api/rooms/requests/received")
        .add_cookie(session_cookie(&alice_token))
        .await;
    let body: Value = response.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

// =============================================================================
// CreateRequest preconditions
// =============================================================================

/// Test: a second pending request for the same room conflicts until resolved
#[tokio::test]
async fn test_duplicate_pending_request_conflicts() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;

    let first = send_request(&app, &bob_token, &room_id, "Hi").await;
    assert_eq!(first.status_code(), 201);
    let first: Value = first.json();

    let second = send_request(&app, &bob_token, &room_id, "Hi again").await;
    assert_eq!(second.status_code(), 409);
    let body: Value = second.json();
    assert_eq!(body["success"], false);

    // Rejecting the first frees the pair
    let response = app
        .server
        .post(&format!(
            "/api/rooms/requests/{}/reject",
            first["data"]["id"].as_str().unwrap()
        ))
        .add_cookie(session_cookie(&alice_token))
        .await;
    assert_eq!(response.status_code(), 200);

    let third = send_request(&app, &bob_token, &room_id, "Please reconsider").await;
    assert_eq!(third.status_code(), 201);
}

/// Test: an accepted request no longer blocks a new pending one for the pair
#[tokio::test]
async fn test_accepted_request_frees_pending_slot() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (bob, _) = seed_user(&app, "Bob", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;
    let room = app
        .store
        .get_room(room_id.parse().unwrap())
        .unwrap()
        .unwrap();

    let first = RoomRequest::pending(&room, bob, None).unwrap();
    app.store.insert_request(&first).unwrap();
    assert!(app
        .store
        .insert_request(&RoomRequest::pending(&room, bob, None).unwrap())
        .is_err());

    assert!(app
        .store
        .update_request_status(first.id, RequestStatus::Pending, RequestStatus::Accepted)
        .unwrap());
    app.store
        .insert_request(&RoomRequest::pending(&room, bob, None).unwrap())
        .unwrap();
}

/// Test: owners cannot request their own rooms
#[tokio::test]
async fn test_request_own_room() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;

    let response = send_request(&app, &alice_token, &room_id, "Mine").await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "You cannot request your own room");
}

/// Test: unknown and malformed room ids
#[tokio::test]
async fn test_request_missing_room() {
    let app = create_test_app();
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let response = send_request(&app, &bob_token, &RoomId::new().to_string(), "Hi").await;
    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["message"], "Room not found");

    let response = send_request(&app, &bob_token, "not-an-id", "Hi").await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid id");
}

/// Test: the message is optional and the body may be left out
#[tokio::test]
async fn test_request_without_body() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;

    let response = app
        .server
        .post(&format!("/api/rooms/{}/request", room_id))
        .add_cookie(session_cookie(&bob_token))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["data"]["message"], "");
    assert_eq!(body["data"]["status"], "pending");

    // A body that is present must still be JSON
    let other = create_room(&app, &alice_token, room_body("Attic", "Pune", 9000, 1)).await;
    let response = app
        .server
        .post(&format!("/api/rooms/{}/request", other))
        .add_cookie(session_cookie(&bob_token))
        .text("{not json")
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid JSON body"));
}

/// Test: messages over 500 characters are rejected
#[tokio::test]
async fn test_request_message_too_long() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;

    let response = send_request(&app, &bob_token, &room_id, &"x".repeat(501)).await;
    assert_eq!(response.status_code(), 400);
}

/// Test: requests need a session
#[tokio::test]
async fn test_request_requires_authentication() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;

    let response = app
        .server
        .post(&format!("/api/rooms/{}/request", room_id))
        .json(&serde_json::json!({ "message": "Hi" }))
        .await;
    assert_eq!(response.status_code(), 401);

    let response = app.server.get("/api/rooms/requests/sent").await;
    assert_eq!(response.status_code(), 401);
}

// =============================================================================
// AcceptRequest / RejectRequest preconditions
// =============================================================================

/// Test: only the request's owner may accept or reject
#[tokio::test]
async fn test_accept_by_non_owner_forbidden() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);
    let (_mallory, mallory_token) = seed_user(&app, "Mallory", Role::Owner);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;
    let response = send_request(&app, &bob_token, &room_id, "Hi").await;
    let body: Value = response.json();
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    for token in [&bob_token, &mallory_token] {
        for action in ["accept", "reject"] {
            let response = app
                .server
                .post(&format!("/api/rooms/requests/{}/{}", request_id, action))
                .add_cookie(session_cookie(token))
                .await;
            assert_eq!(response.status_code(), 403);
        }
    }

    // Still pending
    let request = app
        .store
        .get_request(request_id.parse().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
}

/// Test: accepting an already processed request is an invalid state
#[tokio::test]
async fn test_accept_twice_is_invalid_state() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;
    let response = send_request(&app, &bob_token, &room_id, "Hi").await;
    let body: Value = response.json();
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    let url = format!("/api/rooms/requests/{}/accept", request_id);
    let response = app.server.post(&url).add_cookie(session_cookie(&alice_token)).await;
    assert_eq!(response.status_code(), 200);

    let response = app.server.post(&url).add_cookie(session_cookie(&alice_token)).await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Request has already been processed");

    // Rejecting after acceptance is refused too
    let response = app
        .server
        .post(&format!("/api/rooms/requests/{}/reject", request_id))
        .add_cookie(session_cookie(&alice_token))
        .await;
    assert_eq!(response.status_code(), 400);
}

/// Test: a second pending request cannot be accepted once the room is taken
#[tokio::test]
async fn test_accept_when_room_taken() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);
    let (_carol, carol_token) = seed_user(&app, "Carol", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;

    let bob_request: Value = send_request(&app, &bob_token, &room_id, "Hi").await.json();
    let carol_request: Value = send_request(&app, &carol_token, &room_id, "Hello").await.json();

    let response = app
        .server
        .post(&format!(
            "/api/rooms/requests/{}/accept",
            bob_request["data"]["id"].as_str().unwrap()
        ))
        .add_cookie(session_cookie(&alice_token))
        .await;
    assert_eq!(response.status_code(), 200);

    let carol_id = carol_request["data"]["id"].as_str().unwrap().to_string();
    let response = app
        .server
        .post(&format!("/api/rooms/requests/{}/accept", carol_id))
        .add_cookie(session_cookie(&alice_token))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Room is no longer available");

    // Carol's request is left pending rather than auto-rejected
    let request = app
        .store
        .get_request(carol_id.parse().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
}

/// Test: rejecting twice fails the second time and keeps the first outcome
#[tokio::test]
async fn test_reject_twice() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let room_id = create_room(&app, &alice_token, room_body("Loft", "Pune", 15000, 1)).await;
    let body: Value = send_request(&app, &bob_token, &room_id, "Hi").await.json();
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    let url = format!("/api/rooms/requests/{}/reject", request_id);
    let response = app.server.post(&url).add_cookie(session_cookie(&alice_token)).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "rejected");

    let response = app.server.post(&url).add_cookie(session_cookie(&alice_token)).await;
    assert_eq!(response.status_code(), 400);

    let request = app
        .store
        .get_request(request_id.parse().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(request.status, RequestStatus::Rejected);

    // Rejection has no side effects on the room
    let room = app
        .store
        .get_room(room_id.parse().unwrap())
        .unwrap()
        .unwrap();
    assert!(room.is_vacant);
    assert!(room.current_roommates.is_empty());
}

// =============================================================================
// Listing requests
// =============================================================================

/// Test: sent requests come back newest first with owner details
#[tokio::test]
async fn test_list_sent_requests() {
    let app = create_test_app();
    let (_alice, alice_token) = seed_user(&app, "Alice", Role::Owner);
    let (_bob, bob_token) = seed_user(&app, "Bob", Role::Tenant);

    let first = create_room(&app, &alice_token, room_body("First", "Pune", 10000, 1)).await;
    let second = create_room(&app, &alice_token, room_body("Second", "Pune", 11000, 1)).await;

    send_request(&app, &bob_token, &first, "one").await;
    send_request(&app, &bob_token, &second, "two").await;

    let response = app
        .server
        .get("/api/rooms/requests/sent")
        .add_cookie(session_cookie(&bob_token))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let sent = body["data"].as_array().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["room"], second);
    assert_eq!(sent[1]["room"], first);
    assert_eq!(sent[0]["ownerDetails"]["name"], "Alice");
    assert_eq!(sent[0]["roomDetails"]["title"], "Second");
}
