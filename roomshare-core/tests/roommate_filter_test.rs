//! Roommate search compiler tests

use roomshare_core::{
    compile_roommate_query, Role, RoommateProfileDraft, RoommateSearchParams, User,
};
use serde_json::{json, Value};

fn user(name: &str, verified: bool, profile: Value) -> User {
    let mut user = User::new(name, format!("{}@example.com", name), "123456789012", "hash", Role::Tenant);
    user.is_verified = verified;
    let draft: RoommateProfileDraft = serde_json::from_value(profile).unwrap();
    user.roommate_profile = Some(draft.into_profile().unwrap());
    user
}

fn names(params: &RoommateSearchParams, users: &[User]) -> Vec<String> {
    let query = compile_roommate_query(params).unwrap();
    users
        .iter()
        .filter(|u| query.filter.matches(&serde_json::to_value(u).unwrap()))
        .map(|u| u.name.clone())
        .collect()
}

fn some(v: &str) -> Option<String> {
    Some(v.to_string())
}

fn population() -> Vec<User> {
    vec![
        user(
            "asha",
            true,
            json!({
                "budget": 8000,
                "gender": "female",
                "occupationType": "student",
                "locationPreference": "Bandra",
                "currentLocation": "Andheri",
                "lifestyle": { "smoking": "never", "pets": "no-pets" },
                "interests": ["Rock climbing", "Chess"]
            }),
        ),
        user(
            "ravi",
            true,
            json!({
                "budget": 15000,
                "gender": "male",
                "occupationType": "professional",
                "locationPreference": "Powai",
                "currentLocation": "Thane",
                "lifestyle": { "smoking": "occasionally", "pets": "no-pets" },
                "interests": ["cricket"]
            }),
        ),
        user(
            "unverified",
            false,
            json!({ "budget": 9000, "locationPreference": "Bandra" }),
        ),
        user(
            "inactive",
            true,
            json!({ "isActive": false, "budget": 9000, "locationPreference": "Bandra" }),
        ),
    ]
}

/// Test: only verified users with an active profile are discoverable
#[test]
fn test_base_predicate() {
    let found = names(&RoommateSearchParams::default(), &population());
    assert_eq!(found, vec!["asha", "ravi"]);
}

/// Test: users without any profile never match
#[test]
fn test_user_without_profile_is_hidden() {
    let mut bare = User::new("bare", "bare@example.com", "123456789012", "hash", Role::Tenant);
    bare.is_verified = true;
    assert!(names(&RoommateSearchParams::default(), &[bare]).is_empty());
}

/// Test: location matches preference or current location
#[test]
fn test_location_checks_both_fields() {
    let users = population();
    let by_pref = RoommateSearchParams {
        location: some("bandra"),
        ..Default::default()
    };
    let by_current = RoommateSearchParams {
        location: some("THANE"),
        ..Default::default()
    };
    assert_eq!(names(&by_pref, &users), vec!["asha"]);
    assert_eq!(names(&by_current, &users), vec!["ravi"]);
}

/// Test: budget range is inclusive
#[test]
fn test_budget_range() {
    let params = RoommateSearchParams {
        min_budget: some("8000"),
        max_budget: some("10000"),
        ..Default::default()
    };
    assert_eq!(names(&params, &population()), vec!["asha"]);
}

/// Test: every lifestyle pair must match
#[test]
fn test_lifestyle_conjunction() {
    let users = population();
    let both = RoommateSearchParams {
        lifestyle: some("pets:no-pets"),
        ..Default::default()
    };
    let narrowed = RoommateSearchParams {
        lifestyle: some("pets:no-pets,smoking:never"),
        ..Default::default()
    };
    assert_eq!(names(&both, &users).len(), 2);
    assert_eq!(names(&narrowed, &users), vec!["asha"]);
}

/// Test: interests match if any term is a substring of any stored interest
#[test]
fn test_interests_disjunction() {
    let users = population();
    let params = RoommateSearchParams {
        interests: some("climb,CRICKET"),
        ..Default::default()
    };
    assert_eq!(names(&params, &users), vec!["asha", "ravi"]);

    let none = RoommateSearchParams {
        interests: some("golf"),
        ..Default::default()
    };
    assert!(names(&none, &users).is_empty());
}

/// Test: gender and occupation are exact matches, "Any" disables gender
#[test]
fn test_gender_and_occupation() {
    let users = population();
    let female = RoommateSearchParams {
        gender: some("Female"),
        ..Default::default()
    };
    let any = RoommateSearchParams {
        gender: some("Any"),
        occupation_type: some("professional"),
        ..Default::default()
    };
    assert_eq!(names(&female, &users), vec!["asha"]);
    assert_eq!(names(&any, &users), vec!["ravi"]);
}
